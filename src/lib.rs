//! Queuelock: store-backed locks that keep duplicate jobs out of a queue.
//!
//! A job queue calls three hooks on [`locks::QueueLock`]:
//!
//! - `before_enqueue` before admitting a job (skip the enqueue on `false`)
//! - `before_dequeue` when a queued job is withdrawn
//! - `before_perform` right before a worker runs the job
//!
//! ```
//! use queuelock::locks::{JobLockPolicy, QueueLock};
//! use queuelock::store::MemoryStore;
//!
//! let lock = QueueLock::new(MemoryStore::new());
//! let job = JobLockPolicy::new("UpdateNetworkGraph");
//!
//! assert!(lock.before_enqueue(&job, &(42,))?);
//! assert!(!lock.before_enqueue(&job, &(42,))?); // duplicate
//!
//! lock.before_perform(&job, &(42,))?;
//! assert!(lock.before_enqueue(&job, &(42,))?);
//! # Ok::<(), queuelock::error::QueueLockError>(())
//! ```

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod keys;
pub mod locks;
pub mod logging;
pub mod retry;
pub mod store;

#[cfg(test)]
pub(crate) mod test_support;
