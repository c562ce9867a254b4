//! Structured logging with tracing.
//!
//! The library only emits `tracing` events; installing a subscriber is up to
//! the host process. The `queuelock` binary calls [`init_logging`].

use crate::error::{QueueLockError, Result};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
pub const LOG_ENV_VAR: &str = "QUEUELOCK_LOG";

/// Install a stderr fmt subscriber.
///
/// The filter comes from `QUEUELOCK_LOG` when set, otherwise from `level`.
/// Calling this twice is harmless; the second subscriber is not installed.
pub fn init_logging(level: &str) -> Result<()> {
    parse_log_level(level)?;
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();

    Ok(())
}

/// Parse log level string to tracing Level.
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" | "warning" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(QueueLockError::Config(format!(
            "invalid log level '{}': use trace, debug, info, warn, or error",
            level
        ))),
    }
}
