//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Configuration for queue locks.
///
/// This struct represents the contents of `queuelock.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Store settings
    // =========================================================================
    /// Directory of the file-backed lock store (default: ".queuelock").
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Lock lifetime in seconds for jobs without an override.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,

    /// Per-job overrides, keyed by job name.
    #[serde(default)]
    pub jobs: BTreeMap<String, JobLockConfig>,

    // =========================================================================
    // Retry settings
    // =========================================================================
    /// Attempts per store call on the acquire and release paths.
    #[serde(default = "default_retry_max_attempts")]
    pub retry_max_attempts: u32,

    /// Linear backoff unit in milliseconds (attempt n waits n units).
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // =========================================================================
    // Logging settings
    // =========================================================================
    /// Log level when `QUEUELOCK_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            lock_timeout_secs: default_lock_timeout_secs(),
            jobs: BTreeMap::new(),
            retry_max_attempts: default_retry_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            log_level: default_log_level(),
        }
    }
}
