#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ecospotter_core::schema::Shape;
use ecospotter_core::{CapabilityInvoker, ModelProvider, Prompt, ProviderError};
use serde_json::Value;

/// Provider double that records every call and answers with a canned reply
/// after an optional delay.
pub struct StubProvider {
    reply: Result<Value, String>,
    delay: Duration,
    calls: AtomicUsize,
    completed: AtomicUsize,
    prompts: Mutex<Vec<Prompt>>,
}

impl StubProvider {
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Ok(reply),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            ..Self::replying(Value::Null)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate(&self, prompt: &Prompt, _output: &Shape) -> Result<Value, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(ProviderError::Unavailable)
    }
}

pub fn invoker_for(stub: &Arc<StubProvider>) -> CapabilityInvoker {
    CapabilityInvoker::new(stub.clone())
}

pub const PHOTO: &str = "data:image/jpeg;base64,aGVsbG8=";
