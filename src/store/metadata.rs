//! Lock file metadata.

use crate::error::{QueueLockError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Metadata written into each lock file.
///
/// The lock protocol only cares whether the file exists. The metadata is for
/// operators inspecting the lock directory, plus the expiration the store
/// enforces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockMetadata {
    /// The full lock key (file names are an encoded form of it).
    pub key: String,

    /// Owner of the lock (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lock holder (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Timestamp when the lock was created (RFC3339).
    pub created_at: DateTime<Utc>,

    /// When the lock stops counting as held. `None` means no expiration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl LockMetadata {
    /// Create new lock metadata with the current timestamp and no expiration.
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            owner: get_owner_string(),
            pid: Some(std::process::id()),
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Parse lock metadata from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            QueueLockError::Store(format!(
                "failed to read lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            QueueLockError::Store(format!(
                "failed to parse lock file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Serialize lock metadata to JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| QueueLockError::Store(format!("failed to serialize lock metadata: {}", e)))
    }

    /// Calculate the age of the lock.
    pub fn age(&self) -> Duration {
        Utc::now().signed_duration_since(self.created_at)
    }

    /// Human-readable age for listings. Young locks show seconds, since most
    /// queue locks live for seconds or minutes.
    pub fn age_string(&self) -> String {
        let age = self.age();
        match (age.num_days(), age.num_hours(), age.num_minutes()) {
            (days, hours, _) if days > 0 => format!("{}d {}h", days, hours % 24),
            (_, hours, minutes) if hours > 0 => format!("{}h {}m", hours, minutes % 60),
            (_, _, minutes) if minutes > 0 => format!("{}m {}s", minutes, age.num_seconds() % 60),
            _ => format!("{}s", age.num_seconds().max(0)),
        }
    }

    /// Whether the expiration has passed.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Utc::now())
    }
}

/// Get the owner string for lock metadata.
fn get_owner_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metadata_has_no_expiration() {
        let meta = LockMetadata::new("queuelock:Job-[]");

        assert_eq!(meta.key, "queuelock:Job-[]");
        assert!(meta.owner.contains('@'));
        assert!(meta.pid.is_some());
        assert!(meta.expires_at.is_none());
        assert!(!meta.is_expired());
        assert!(meta.age().num_minutes() < 1);
    }

    #[test]
    fn age_string_scales_with_age() {
        let mut meta = LockMetadata::new("k");
        assert!(meta.age_string().ends_with('s'));

        meta.created_at = Utc::now() - Duration::seconds(150);
        assert_eq!(meta.age_string(), "2m 30s");

        meta.created_at = Utc::now() - Duration::minutes(185);
        assert_eq!(meta.age_string(), "3h 5m");

        meta.created_at = Utc::now() - Duration::hours(50);
        assert_eq!(meta.age_string(), "2d 2h");
    }

    #[test]
    fn past_expiration_is_expired() {
        let mut meta = LockMetadata::new("k");
        meta.expires_at = Some(Utc::now() - Duration::seconds(1));
        assert!(meta.is_expired());

        meta.expires_at = Some(Utc::now() + Duration::hours(1));
        assert!(!meta.is_expired());
    }

    #[test]
    fn metadata_survives_json() {
        let mut meta = LockMetadata::new("queuelock:Job-[1]");
        meta.expires_at = Some(Utc::now() + Duration::hours(1));
        let json = meta.to_json().unwrap();

        assert!(json.contains("expires_at"));
        let parsed: LockMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.key, meta.key);
        assert_eq!(parsed.expires_at, meta.expires_at);
    }
}
