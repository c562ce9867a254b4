//! Configuration types and defaults for queuelock.

use serde::{Deserialize, Serialize};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "queuelock.yaml";

/// Longest lock timeout accepted from config (ten years).
pub const MAX_LOCK_TIMEOUT_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Per-job lock overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobLockConfig {
    /// Fixed lock key used for every invocation of the job, ignoring its
    /// arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lock_key: Option<String>,

    /// Lock lifetime in seconds for this job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

pub fn default_store_dir() -> String {
    ".queuelock".to_string()
}

pub fn default_lock_timeout_secs() -> u64 {
    3600
}

pub fn default_retry_max_attempts() -> u32 {
    3
}

pub fn default_retry_backoff_ms() -> u64 {
    1000
}

pub fn default_log_level() -> String {
    "warn".to_string()
}
