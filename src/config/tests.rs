//! Tests for config functionality.

use crate::config::{Config, JobLockConfig, MAX_LOCK_TIMEOUT_SECS};
use crate::error::QueueLockError;
use crate::locks::LockPolicy;
use serde_json::json;
use std::time::Duration;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.store_dir, ".queuelock");
    assert_eq!(config.lock_timeout_secs, 3600);
    assert_eq!(config.retry_max_attempts, 3);
    assert_eq!(config.retry_backoff_ms, 1000);
    assert_eq!(config.log_level, "warn");
    assert!(config.jobs.is_empty());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();

    // Should use all defaults
    assert_eq!(config.lock_timeout_secs, 3600);
    assert_eq!(config.store_dir, ".queuelock");
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
lock_timeout_secs: 60
store_dir: /var/run/queuelock
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.lock_timeout_secs, 60);
    assert_eq!(config.store_dir, "/var/run/queuelock");

    // Unspecified values should use defaults
    assert_eq!(config.retry_max_attempts, 3);
    assert_eq!(config.log_level, "warn");
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
store_dir: locks
lock_timeout_secs: 120
retry_max_attempts: 5
retry_backoff_ms: 250
log_level: debug
jobs:
  UpdateNetworkGraph:
    lock_key: network-graph
    timeout_secs: 600
  SendDigest:
    timeout_secs: 30
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.store_dir, "locks");
    assert_eq!(config.retry_max_attempts, 5);
    assert_eq!(config.retry_backoff_ms, 250);
    assert_eq!(config.log_level, "debug");
    assert_eq!(
        config.jobs.get("UpdateNetworkGraph"),
        Some(&JobLockConfig {
            lock_key: Some("network-graph".to_string()),
            timeout_secs: Some(600),
        })
    );
    assert_eq!(config.jobs["SendDigest"].lock_key, None);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
lock_timeout_secs: 10
some_future_setting: true
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.lock_timeout_secs, 10);
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let err = Config::from_yaml("lock_timeout_secs: [").unwrap_err();
    assert!(matches!(err, QueueLockError::Config(_)));
}

#[test]
fn test_validation_rejects_zero_timeout() {
    let err = Config::from_yaml("lock_timeout_secs: 0").unwrap_err();
    assert!(err.to_string().contains("lock_timeout_secs"));
}

#[test]
fn test_validation_rejects_huge_timeouts() {
    let err = Config::from_yaml("lock_timeout_secs: 18446744073709551615").unwrap_err();
    assert!(matches!(err, QueueLockError::Config(_)));
    assert!(err.to_string().contains("lock_timeout_secs"));

    let yaml = r#"
jobs:
  Job:
    timeout_secs: 10000000000000
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("jobs.Job.timeout_secs"));

    let at_limit = format!("lock_timeout_secs: {}", MAX_LOCK_TIMEOUT_SECS);
    assert_eq!(
        Config::from_yaml(&at_limit).unwrap().lock_timeout_secs,
        MAX_LOCK_TIMEOUT_SECS
    );
}

#[test]
fn test_validation_rejects_zero_attempts() {
    let err = Config::from_yaml("retry_max_attempts: 0").unwrap_err();
    assert!(err.to_string().contains("retry_max_attempts"));
}

#[test]
fn test_validation_rejects_unknown_log_level() {
    let err = Config::from_yaml("log_level: loud").unwrap_err();
    assert!(matches!(err, QueueLockError::Config(_)));
}

#[test]
fn test_validation_rejects_bad_job_overrides() {
    let yaml = r#"
jobs:
  Job:
    timeout_secs: 0
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("jobs.Job.timeout_secs"));

    let yaml = r#"
jobs:
  Job:
    lock_key: "  "
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("jobs.Job.lock_key"));
}

#[test]
fn test_yaml_round_trip_keeps_overrides() {
    let mut config = Config::default();
    config.jobs.insert(
        "Job".to_string(),
        JobLockConfig {
            lock_key: Some("only-one".to_string()),
            timeout_secs: None,
        },
    );

    let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed.jobs, config.jobs);
}

#[test]
fn test_retry_policy_from_config() {
    let config = Config::from_yaml("retry_max_attempts: 4\nretry_backoff_ms: 10").unwrap();
    let retry = config.retry_policy();

    assert_eq!(retry.max_attempts, 4);
    assert_eq!(retry.delay_for(2), Duration::from_millis(20));
}

#[test]
fn test_policy_for_uses_global_defaults() {
    let config = Config::from_yaml("lock_timeout_secs: 90").unwrap();
    let policy = config.policy_for("Job");

    assert_eq!(policy.name(), "Job");
    assert_eq!(policy.lock_key(&[json!(1)]), "Job-[1]");
    assert_eq!(policy.lock_timeout(&[]), Duration::from_secs(90));
}

#[test]
fn test_policy_for_applies_job_overrides() {
    let yaml = r#"
jobs:
  UpdateNetworkGraph:
    lock_key: network-graph
    timeout_secs: 5
"#;
    let config = Config::from_yaml(yaml).unwrap();
    let policy = config.policy_for("UpdateNetworkGraph");

    assert_eq!(policy.lock_key(&[json!(42)]), "network-graph");
    assert_eq!(policy.lock_timeout(&[]), Duration::from_secs(5));
}
