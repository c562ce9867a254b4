//! Store adapters for queue locks.
//!
//! The lock protocol needs only a handful of single-key primitives from its
//! backing store. The linearization point is [`LockStore::set_if_absent`]:
//! when several callers race on the same key, exactly one of them observes
//! `true`.
//!
//! # Implementations
//!
//! - [`MemoryStore`]: in-process map with TTLs, for tests and for embedding
//!   the lock in a single process.
//! - [`FileStore`]: one lock file per key in a shared directory, created with
//!   **create_new** semantics (exclusive create).
//!
//! # Errors
//!
//! Adapters report a lost or refused connection as
//! [`QueueLockError::Connection`](crate::error::QueueLockError::Connection) so
//! the retry policy can tell it apart from a permanent failure. Adapters do
//! not retry internally.

mod file;
mod memory;
mod metadata;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use metadata::LockMetadata;

use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Key-value store contract used by the lock protocol.
pub trait LockStore: Send + Sync {
    /// Create `key` only if it does not exist. Returns true iff this call
    /// created it. An expired key counts as absent.
    fn set_if_absent(&self, key: &str) -> Result<bool>;

    /// Attach a time-to-live to an existing key. No-op if the key is absent.
    fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Remove `key`. Deleting an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;

    /// List every live key starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;

    /// Whether `key` currently exists.
    fn exists(&self, key: &str) -> Result<bool>;
}

impl<S: LockStore + ?Sized> LockStore for &S {
    fn set_if_absent(&self, key: &str) -> Result<bool> {
        (**self).set_if_absent(key)
    }

    fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()> {
        (**self).set_expiration(key, ttl)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }
}

impl<S: LockStore + ?Sized> LockStore for Arc<S> {
    fn set_if_absent(&self, key: &str) -> Result<bool> {
        (**self).set_if_absent(key)
    }

    fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()> {
        (**self).set_expiration(key, ttl)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }
}
