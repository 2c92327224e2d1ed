use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::collaborators::CollaboratorError;

/// Timeout and backoff applied uniformly at the collaborator-call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Same timeout, no retries.
    pub fn single_attempt(self) -> Self {
        Self {
            max_attempts: 1,
            ..self
        }
    }

    /// Runs `call` until it succeeds, fails with a non-retryable error, or the
    /// attempts are used up. A call exceeding `call_timeout` counts as a
    /// retryable [`CollaboratorError::Timeout`].
    pub async fn run<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, CollaboratorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CollaboratorError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut backoff = self.initial_backoff;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let started = Instant::now();

            let error = match tokio::time::timeout(self.call_timeout, call()).await {
                Ok(Ok(value)) => {
                    if attempt > 1 {
                        tracing::debug!(operation, attempt, "collaborator call succeeded after retry");
                    }
                    return Ok(value);
                }
                Ok(Err(error)) => error,
                Err(_) => CollaboratorError::Timeout {
                    operation: operation.to_string(),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                },
            };

            if !error.is_retryable() || attempt >= max_attempts {
                return Err(error);
            }

            tracing::warn!(
                operation,
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                %error,
                "collaborator call failed, retrying"
            );
            tokio::time::sleep(backoff).await;
            backoff = (backoff * 2).min(self.max_backoff);
        }
    }
}
