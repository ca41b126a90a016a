use std::sync::Arc;

use tracing::debug;

use crate::error::CapabilityError;
use crate::invoker::CapabilityInvoker;
use crate::router::{IntentRouter, RouteContext};
use crate::timeout::TimeoutGuard;

pub const TIMEOUT_NOTICE: &str =
    "Przepraszam, odpowiedź trwa zbyt długo. Spróbuj zadać inne pytanie.";
pub const CONNECTION_NOTICE: &str =
    "Przepraszam, wystąpił problem z połączeniem. Spróbuj ponownie.";

/// Text shown in the transcript in place of a failed reply.
pub fn failure_notice(err: &CapabilityError) -> &'static str {
    if err.is_timeout() {
        TIMEOUT_NOTICE
    } else {
        CONNECTION_NOTICE
    }
}

/// Router, invoker and deadline bundled for the chat widget.
///
/// Cheap to clone; a clone is moved into each spawned send.
#[derive(Clone)]
pub struct ChatAssistant {
    router: Arc<IntentRouter>,
    invoker: CapabilityInvoker,
    guard: TimeoutGuard,
}

impl ChatAssistant {
    pub fn new(router: IntentRouter, invoker: CapabilityInvoker, guard: TimeoutGuard) -> Self {
        Self {
            router: Arc::new(router),
            invoker,
            guard,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.invoker.provider_name()
    }

    pub fn guard(&self) -> &TimeoutGuard {
        &self.guard
    }

    pub async fn respond(
        &self,
        text: &str,
        context: &RouteContext,
    ) -> Result<String, CapabilityError> {
        let request = self.router.route(text, context);
        debug!(
            capability = request.intent().capability().name(),
            provider = self.provider_name(),
            deadline_ms = self.guard.deadline().as_millis() as u64,
            "dispatching chat message"
        );
        let invoker = self.invoker.clone();
        self.guard
            .run(move || async move { request.execute(&invoker).await })
            .await
    }
}
