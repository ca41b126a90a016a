//! Schema-checked capability calls.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::ai::ModelProvider;
use crate::capability::{
    Capability, EcologicalAdviceInput, EcologicalAdviceOutput, FindTreesInput, FindTreesOutput,
    SubmissionAssistantInput, SubmissionAssistantOutput,
};
use crate::error::{CapabilityError, ValidationError};

/// Turns a capability and its input into exactly one provider call.
///
/// The invoker has no deadline of its own and keeps no state between calls.
#[derive(Clone)]
pub struct CapabilityInvoker {
    provider: Arc<dyn ModelProvider>,
}

impl CapabilityInvoker {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn invoke(
        &self,
        capability: Capability,
        input: Value,
    ) -> Result<Value, CapabilityError> {
        let schema = capability.schema();
        schema
            .input
            .validate(&input)
            .map_err(CapabilityError::Validation)?;

        let prompt = capability.render_prompt(&input);
        debug!(
            capability = capability.name(),
            provider = self.provider.name(),
            media = prompt.media.len(),
            "invoking capability"
        );

        let output = self.provider.generate(&prompt, &schema.output).await?;

        if let Err(err) = schema.output.validate(&output) {
            warn!(
                capability = capability.name(),
                provider = self.provider.name(),
                error = %err,
                "provider reply broke the output contract"
            );
            return Err(CapabilityError::OutputValidation(err));
        }

        Ok(output)
    }

    async fn invoke_typed<I, O>(
        &self,
        capability: Capability,
        input: &I,
    ) -> Result<O, CapabilityError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let schema = capability.schema();
        let value = serde_json::to_value(input).map_err(|err| {
            CapabilityError::Validation(ValidationError::malformed(
                schema.input.name,
                err.to_string(),
            ))
        })?;
        let output = self.invoke(capability, value).await?;
        serde_json::from_value(output).map_err(|err| {
            CapabilityError::OutputValidation(ValidationError::malformed(
                schema.output.name,
                err.to_string(),
            ))
        })
    }

    pub async fn ecological_advice(
        &self,
        input: &EcologicalAdviceInput,
    ) -> Result<EcologicalAdviceOutput, CapabilityError> {
        self.invoke_typed(Capability::EcologicalAdvice, input).await
    }

    pub async fn submission_assistant(
        &self,
        input: &SubmissionAssistantInput,
    ) -> Result<SubmissionAssistantOutput, CapabilityError> {
        self.invoke_typed(Capability::SubmissionAssistant, input).await
    }

    pub async fn find_trees_near_me(
        &self,
        input: &FindTreesInput,
    ) -> Result<FindTreesOutput, CapabilityError> {
        self.invoke_typed(Capability::NearbyTreeFinder, input).await
    }
}
