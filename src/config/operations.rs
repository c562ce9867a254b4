//! Config loading, validation, and conversion into lock types.

use super::model::Config;
use super::types::{DEFAULT_CONFIG_FILE, MAX_LOCK_TIMEOUT_SECS};
use crate::error::{QueueLockError, Result};
use crate::locks::JobLockPolicy;
use crate::logging::parse_log_level;
use crate::retry::RetryPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            QueueLockError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load an explicitly given config file, or `queuelock.yaml` from the
    /// working directory if it exists, or fall back to defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document parses as null rather than an empty mapping
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| QueueLockError::Config(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| QueueLockError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `lock_timeout_secs` must be positive
    /// - `retry_max_attempts` must be positive
    /// - `log_level` must be a known level
    /// - per-job `timeout_secs` must be positive and `lock_key` non-empty
    pub fn validate(&self) -> Result<()> {
        if self.lock_timeout_secs == 0 {
            return Err(QueueLockError::Config(
                "lock_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.lock_timeout_secs > MAX_LOCK_TIMEOUT_SECS {
            return Err(QueueLockError::Config(format!(
                "lock_timeout_secs must be at most {}",
                MAX_LOCK_TIMEOUT_SECS
            )));
        }

        if self.retry_max_attempts == 0 {
            return Err(QueueLockError::Config(
                "retry_max_attempts must be greater than 0".to_string(),
            ));
        }

        parse_log_level(&self.log_level)?;

        for (name, job) in &self.jobs {
            if job.timeout_secs == Some(0) {
                return Err(QueueLockError::Config(format!(
                    "jobs.{}.timeout_secs must be greater than 0",
                    name
                )));
            }
            if job.timeout_secs.is_some_and(|secs| secs > MAX_LOCK_TIMEOUT_SECS) {
                return Err(QueueLockError::Config(format!(
                    "jobs.{}.timeout_secs must be at most {}",
                    name, MAX_LOCK_TIMEOUT_SECS
                )));
            }
            if job.lock_key.as_deref().is_some_and(|key| key.trim().is_empty()) {
                return Err(QueueLockError::Config(format!(
                    "jobs.{}.lock_key must not be empty",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Retry policy for store calls on the acquire and release paths.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_backoff_ms),
        )
    }

    /// Lock policy for a job, applying any per-job overrides.
    pub fn policy_for(&self, job_name: &str) -> JobLockPolicy {
        let job = self.jobs.get(job_name);
        let timeout = job
            .and_then(|j| j.timeout_secs)
            .unwrap_or(self.lock_timeout_secs);

        let policy = JobLockPolicy::new(job_name).with_timeout(Duration::from_secs(timeout));
        match job.and_then(|j| j.lock_key.as_ref()) {
            Some(key) => policy.with_fixed_key(key.clone()),
            None => policy,
        }
    }
}
