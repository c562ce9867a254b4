//! Bounded retry with linear backoff for store calls.
//!
//! Only transient failures ([`QueueLockError::is_transient`]) are retried.
//! Between attempts the caller sleeps `backoff(attempt)`; for
//! [`RetryPolicy`] that is `backoff_unit * attempt` (1s, 2s, 3s, ... with the
//! default unit). When the last attempt fails, its error is returned as-is.

use crate::error::{QueueLockError, Result};
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Default number of attempts, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default linear backoff unit.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Retry settings for store calls on the acquire and release paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,

    /// Delay after the first failed attempt; the n-th failure waits n units.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_unit: Duration) -> Self {
        Self {
            max_attempts,
            backoff_unit,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay after the given failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff_unit.saturating_mul(attempt)
    }

    /// Run `op` under this policy.
    pub fn run<T, F>(&self, op_name: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        retry(op_name, self.max_attempts, |attempt| self.delay_for(attempt), op)
    }
}

/// Run `op` up to `max_attempts` times, sleeping `backoff(attempt)` after
/// each transient failure.
pub fn retry<T, F, B>(op_name: &str, max_attempts: u32, backoff: B, mut op: F) -> Result<T>
where
    F: FnMut() -> Result<T>,
    B: Fn(u32) -> Duration,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < max_attempts => {
                let delay = backoff(attempt);
                warn!(
                    op = op_name,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient store failure, retrying"
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(err) => return Err(give_up(op_name, attempt, err)),
        }
    }
}

fn give_up(op_name: &str, attempt: u32, err: QueueLockError) -> QueueLockError {
    if err.is_transient() {
        warn!(op = op_name, attempts = attempt, error = %err, "store unreachable, giving up");
    }
    err
}
