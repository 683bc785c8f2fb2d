//! Bounded exponential backoff for flaky network operations.
//!
//! Only errors that report themselves as [`Retriable`] are retried; everything
//! else propagates on first occurrence without sleeping.
//!
//! ```rust,ignore
//! let policy = RetryPolicy::new(3, 1.0);
//! // waits 1s after the first failure, 2s after the second
//! let html = with_retry(&policy, "fetch_html", || fetcher.fetch_once(url)).await?;
//! ```

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

/// Errors that know whether another attempt could succeed.
pub trait Retriable {
    fn is_retriable(&self) -> bool;
}

/// Attempt budget and backoff base for [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,

    /// Seconds to wait after the first failure; doubles after each further failure.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_factor: 1.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            backoff_factor,
        }
    }

    /// No retries at all.
    pub fn none() -> Self {
        Self::new(1, 0.0)
    }

    /// Delay after failed attempt number `attempt` (1-based):
    /// `backoff_factor * 2^(attempt - 1)` seconds, saturating at [`Duration::MAX`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let secs = self.backoff_factor.max(0.0) * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Run `op` under `policy`, sleeping with tokio between attempts.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, op_name: &str, op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retriable + Display,
{
    retry_with_sleep(policy, op_name, op, tokio::time::sleep).await
}

/// [`with_retry`] with an injectable sleep, so backoff can be observed in tests.
pub async fn retry_with_sleep<T, E, F, Fut, S, SFut>(
    policy: &RetryPolicy,
    op_name: &str,
    mut op: F,
    mut sleep: S,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retriable + Display,
    S: FnMut(Duration) -> SFut,
    SFut: Future<Output = ()>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retriable() => {
                error!(op = op_name, error = %e, "Failed with non-retriable error");
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                error!(op = op_name, attempts = max_attempts, error = %e, "Failed after all attempts");
                return Err(e);
            }
            Err(e) => {
                let wait = policy.delay_for(attempt);
                warn!(
                    op = op_name,
                    attempt,
                    max_attempts,
                    error = %e,
                    wait_secs = wait.as_secs_f64(),
                    "Attempt failed, retrying"
                );
                sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
