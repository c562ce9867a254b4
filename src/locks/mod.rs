//! Queue lock protocol.
//!
//! Keeps duplicate jobs out of a queue. Before a job is enqueued its lock is
//! taken; if the lock is already held the job is a duplicate and is not
//! enqueued. The lock is released when the job is dequeued or when a worker
//! starts performing it, so an identical job can be queued again while the
//! first one runs.
//!
//! # Lock Keys
//!
//! Keys live under the `queuelock:` namespace and default to the job name
//! plus its JSON-rendered arguments (`queuelock:UpdateNetworkGraph-[42]`).
//! A [`LockPolicy`] can replace the key or the timeout per job type.
//!
//! # Expiration
//!
//! Every acquired lock gets a time-to-live (one hour by default) so a lock
//! whose job is lost still goes away on its own. Acquisition is two store
//! calls; if the second one fails the lock has no expiration until released.
//!
//! # Consistency
//!
//! Exclusion is best-effort. Release is unconditional, so a release racing a
//! new acquisition of the same key can remove the newer lock.

mod operations;
mod policy;


// Re-export public API
pub use operations::QueueLock;
pub use policy::{DEFAULT_LOCK_TIMEOUT, JobLockPolicy, KeyFn, LockPolicy};
