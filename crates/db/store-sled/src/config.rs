use std::{thread, time::Duration};

use plasma_db_types::{DbError, DbResult};
use sled::transaction::{TransactionError, TransactionResult};
use tracing::*;

// Configuration constants
pub(crate) const DEFAULT_RETRY_COUNT: u16 = 3;
pub(crate) const DEFAULT_RETRY_DELAY_MS: u64 = 150;
pub(crate) const TEST_RETRY_DELAY_MS: u64 = 50; // Faster for tests

/// database operations configuration
#[derive(Debug, Clone)]
pub struct SledDbConfig {
    pub retry_count: u16,
    pub retry_delay: Duration,
}

impl SledDbConfig {
    pub fn new(retry_count: u16, retry_delay: Duration) -> Self {
        Self {
            retry_count,
            retry_delay,
        }
    }

    pub fn new_with_constant_backoff(retry_count: u16, delay_ms: u64) -> Self {
        Self::new(retry_count, Duration::from_millis(delay_ms))
    }

    /// Create production configuration with default values
    pub fn production() -> Self {
        Self::new_with_constant_backoff(DEFAULT_RETRY_COUNT, DEFAULT_RETRY_DELAY_MS)
    }

    /// Create test configuration with faster retry delays
    pub fn test() -> Self {
        Self::new_with_constant_backoff(DEFAULT_RETRY_COUNT, TEST_RETRY_DELAY_MS)
    }

    /// Execute a transaction with retry logic using this config's settings.
    ///
    /// Sled already reruns transactions on conflicts.  Storage errors are
    /// retried here after a constant delay, aborts are returned as is.
    pub fn with_retry<F, R>(&self, f: F) -> DbResult<R>
    where
        F: Fn() -> TransactionResult<R, DbError>,
    {
        let mut attempt = 0;
        loop {
            match f() {
                Ok(res) => return Ok(res),
                Err(TransactionError::Abort(err)) => return Err(err),
                Err(TransactionError::Storage(err)) if attempt < self.retry_count => {
                    attempt += 1;
                    warn!(%err, %attempt, "sled transaction failed, retrying");
                    thread::sleep(self.retry_delay);
                }
                Err(TransactionError::Storage(err)) => {
                    return Err(DbError::TransactionError(err.to_string()));
                }
            }
        }
    }
}
