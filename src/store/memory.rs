//! In-process lock store.

use super::LockStore;
use crate::error::{QueueLockError, Result};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// A lock store backed by a mutex-guarded map.
///
/// Expired entries are treated as absent and purged lazily on access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, Entry>>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining time-to-live for `key`, or `None` if the key is absent or
    /// has no expiration.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.live_entries(now)
            .get(key)
            .and_then(|entry| entry.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Number of live keys.
    pub fn len(&self) -> usize {
        self.live_entries(Instant::now()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live_entries(&self, now: Instant) -> MutexGuard<'_, BTreeMap<String, Entry>> {
        // A panic while holding the lock cannot leave the map half-updated.
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        entries.retain(|_, entry| entry.is_live(now));
        entries
    }
}

impl LockStore for MemoryStore {
    fn set_if_absent(&self, key: &str) -> Result<bool> {
        let mut entries = self.live_entries(Instant::now());
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), Entry { expires_at: None });
        Ok(true)
    }

    fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.live_entries(now);
        if let Some(entry) = entries.get_mut(key) {
            let expires_at = now.checked_add(ttl).ok_or_else(|| {
                QueueLockError::Store(format!("expiration out of range for '{}'", key))
            })?;
            entry.expires_at = Some(expires_at);
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.live_entries(Instant::now()).remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .live_entries(Instant::now())
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.live_entries(Instant::now()).contains_key(key))
    }
}
