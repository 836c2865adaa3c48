// Retry logic with exponential backoff

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::errors::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first; 1 disables retry
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before the attempt following `attempt` (0-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Run `f` until it succeeds, fails permanently, or attempts run out.
///
/// Only transient failures (see [`RemoteError::is_transient`]) are retried.
pub async fn with_retry<F, Fut, T>(policy: &RetryPolicy, f: F) -> Result<T, RemoteError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempt += 1;
                if attempt >= max_attempts || !e.is_transient() {
                    return Err(e);
                }

                let delay = policy.delay_after(attempt - 1);
                tracing::warn!(
                    "Request failed (attempt {}/{}): {}, retrying in {:?}",
                    attempt,
                    max_attempts,
                    e,
                    delay
                );
                sleep(delay).await;
            }
        }
    }
}
