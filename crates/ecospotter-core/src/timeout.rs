//! Deadline race for capability calls.
//!
//! The call runs on its own task and is raced against a timer. Whichever side
//! settles first decides the outcome. When the timer wins, the default
//! [`TimeoutPolicy::Abandon`] lets the call keep running detached: it still
//! holds its connection until the provider answers, and that answer is dropped
//! with the task.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{CapabilityError, ProviderError};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeoutPolicy {
    /// Detach the call and discard whatever it eventually returns.
    #[default]
    Abandon,
    /// Abort the call's task, dropping the in-flight request.
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutGuard {
    deadline: Duration,
    policy: TimeoutPolicy,
}

impl Default for TimeoutGuard {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl TimeoutGuard {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            policy: TimeoutPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Run `call` against the deadline. Resolves exactly once.
    pub async fn run<F, Fut, T>(&self, call: F) -> Result<T, CapabilityError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CapabilityError>> + Send + 'static,
        T: Send + 'static,
    {
        let mut task = tokio::spawn(call());
        let timer = tokio::time::sleep(self.deadline);
        tokio::pin!(timer);

        tokio::select! {
            biased;

            joined = &mut task => match joined {
                Ok(outcome) => outcome,
                Err(err) => Err(CapabilityError::Provider(ProviderError::Unavailable(format!(
                    "capability task failed: {}",
                    err
                )))),
            },
            () = &mut timer => {
                warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    policy = ?self.policy,
                    "capability call timed out"
                );
                if self.policy == TimeoutPolicy::Abort {
                    task.abort();
                }
                Err(CapabilityError::Timeout(self.deadline))
            }
        }
    }
}

/// Shorthand for a [`TimeoutGuard`] with the default policy.
pub async fn with_timeout<F, Fut, T>(call: F, deadline: Duration) -> Result<T, CapabilityError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, CapabilityError>> + Send + 'static,
    T: Send + 'static,
{
    TimeoutGuard::new(deadline).run(call).await
}
