//! Timeouts and backoff for root-chain calls.

use std::{future::Future, time::Duration};

use plasma_config::SyncConfig;
use tokio::time::{sleep, timeout};
use tracing::*;

use crate::client::ClientError;

/// Upper bound for a single backoff delay.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Deadline of a single attempt.
    pub timeout: Duration,

    /// Attempts made after the first one fails.
    pub retries: u16,

    /// Delay before the first retry.  Doubles on every further retry.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, retries: u16, backoff: Duration) -> Self {
        Self {
            timeout,
            retries,
            backoff,
        }
    }

    pub fn from_config(config: &SyncConfig) -> Self {
        Self::new(
            Duration::from_millis(config.rpc_timeout_ms),
            config.rpc_retry_count,
            Duration::from_millis(config.rpc_retry_backoff_ms),
        )
    }

    /// Delay before retry number `attempt`, counting from 0.
    pub fn delay(&self, attempt: u16) -> Duration {
        let factor = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }
}

/// Runs a single attempt of `fut` under the policy's deadline.
pub async fn with_timeout<T>(
    policy: &RetryPolicy,
    fut: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    match timeout(policy.timeout, fut).await {
        Ok(res) => res,
        Err(_) => Err(ClientError::Timeout(policy.timeout.as_millis() as u64)),
    }
}

/// Calls `f` until it succeeds, fails with a non-transient error or runs out
/// of retries.
pub async fn call_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    what: &str,
    mut f: F,
) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0;
    loop {
        match with_timeout(policy, f()).await {
            Ok(v) => return Ok(v),
            Err(err) if err.is_transient() && attempt < policy.retries => {
                let delay = policy.delay(attempt);
                debug!(%what, %err, %attempt, ?delay, "root chain call failed, retrying");
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                warn!(%what, %err, %attempt, "root chain call failed");
                return Err(err);
            }
        }
    }
}
