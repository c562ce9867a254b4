//! Lock acquisition, release, listing, and clearing operations.

use super::policy::LockPolicy;
use crate::error::Result;
use crate::keys::{LOCK_NAMESPACE, canonicalize_args, namespaced};
use crate::retry::RetryPolicy;
use crate::store::LockStore;
use serde::Serialize;
use tracing::{debug, info, warn};

/// The queue lock protocol over a [`LockStore`].
///
/// Holds no state between calls: the store record is the lock. Share one
/// instance across threads by reference or `Arc`.
#[derive(Debug, Clone)]
pub struct QueueLock<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S: LockStore> QueueLock<S> {
    /// Protocol over `store` with the default retry policy.
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: RetryPolicy::default(),
        }
    }

    /// Replace the retry policy used on the acquire and release paths.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The namespaced store key a job with these arguments locks.
    pub fn lock_key<P, A>(&self, policy: &P, args: &A) -> Result<String>
    where
        P: LockPolicy + ?Sized,
        A: Serialize + ?Sized,
    {
        let args = canonicalize_args(args)?;
        Ok(namespaced(&policy.lock_key(&args)))
    }

    /// Try to take the lock for a job.
    ///
    /// Returns `Ok(false)` when the lock is already held, meaning the job must
    /// not be enqueued. On success the lock expires after the policy's
    /// timeout.
    ///
    /// If setting the expiration fails after the lock was created, the error
    /// is returned and the lock stays in the store with no expiration until
    /// it is released.
    pub fn try_acquire<P, A>(&self, policy: &P, args: &A) -> Result<bool>
    where
        P: LockPolicy + ?Sized,
        A: Serialize + ?Sized,
    {
        let args = canonicalize_args(args)?;
        let key = namespaced(&policy.lock_key(&args));

        let acquired = self
            .retry
            .run("set_if_absent", || self.store.set_if_absent(&key))?;
        if !acquired {
            debug!(job = policy.name(), key = %key, "lock already held");
            return Ok(false);
        }

        let timeout = policy.lock_timeout(&args);
        if let Err(e) = self
            .retry
            .run("set_expiration", || self.store.set_expiration(&key, timeout))
        {
            warn!(job = policy.name(), key = %key, error = %e, "lock acquired without expiration");
            return Err(e);
        }

        debug!(
            job = policy.name(),
            key = %key,
            timeout_secs = timeout.as_secs(),
            "lock acquired"
        );
        Ok(true)
    }

    /// Remove the lock for a job. Releasing a lock that is not held is a
    /// no-op.
    pub fn release<P, A>(&self, policy: &P, args: &A) -> Result<()>
    where
        P: LockPolicy + ?Sized,
        A: Serialize + ?Sized,
    {
        let key = self.lock_key(policy, args)?;
        self.retry.run("delete", || self.store.delete(&key))?;
        debug!(job = policy.name(), key = %key, "lock released");
        Ok(())
    }

    /// Whether the lock for a job is currently held.
    pub fn is_locked<P, A>(&self, policy: &P, args: &A) -> Result<bool>
    where
        P: LockPolicy + ?Sized,
        A: Serialize + ?Sized,
    {
        let key = self.lock_key(policy, args)?;
        self.store.exists(&key)
    }

    // ========================================================================
    // Queue lifecycle hooks
    // ========================================================================

    /// Call before admitting a job to the queue. Skip the enqueue when this
    /// returns `false`.
    pub fn before_enqueue<P, A>(&self, policy: &P, args: &A) -> Result<bool>
    where
        P: LockPolicy + ?Sized,
        A: Serialize + ?Sized,
    {
        self.try_acquire(policy, args)
    }

    /// Call when a queued job is withdrawn before it runs.
    pub fn before_dequeue<P, A>(&self, policy: &P, args: &A) -> Result<()>
    where
        P: LockPolicy + ?Sized,
        A: Serialize + ?Sized,
    {
        self.release(policy, args)
    }

    /// Call immediately before a job's work starts.
    ///
    /// From this point an identical job may be enqueued again, even while
    /// this one is still running. Whatever the job's work does afterwards has
    /// no effect on the lock.
    pub fn before_perform<P, A>(&self, policy: &P, args: &A) -> Result<()>
    where
        P: LockPolicy + ?Sized,
        A: Serialize + ?Sized,
    {
        self.release(policy, args)
    }

    // ========================================================================
    // Administration
    // ========================================================================

    /// Every lock key currently held in the store.
    pub fn all_locks(&self) -> Result<Vec<String>> {
        self.store.keys_with_prefix(LOCK_NAMESPACE)
    }

    /// Delete every held lock and return how many were listed.
    ///
    /// Meant for operator recovery, e.g. after a crash orphaned locks whose
    /// jobs will never run.
    pub fn clear_all_locks(&self) -> Result<usize> {
        let keys = self.all_locks()?;
        for key in &keys {
            self.store.delete(key)?;
        }
        info!(count = keys.len(), "cleared all queue locks");
        Ok(keys.len())
    }
}
