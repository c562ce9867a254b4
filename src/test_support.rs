use crate::error::{QueueLockError, Result};
use crate::locks::{JobLockPolicy, QueueLock};
use crate::store::LockStore;
use serde::Serialize;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

/// Store wrapper that loses its connection for the next N calls.
pub(crate) struct FlakyStore<S> {
    inner: S,
    failures_left: AtomicU32,
    calls: AtomicU32,
}

impl<S: LockStore> FlakyStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            failures_left: AtomicU32::new(0),
            calls: AtomicU32::new(0),
        }
    }

    /// Fail the next `n` calls with a connection error.
    pub(crate) fn fail_next(&self, n: u32) {
        self.failures_left.store(n, Ordering::SeqCst);
        self.calls.store(0, Ordering::SeqCst);
    }

    /// Calls seen since the last `fail_next`.
    pub(crate) fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inner(&self) -> &S {
        &self.inner
    }

    fn check(&self) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let dropped = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if dropped {
            return Err(QueueLockError::Connection(format!(
                "cannot connect to store (call {})",
                call
            )));
        }
        Ok(())
    }
}

impl<S: LockStore> LockStore for FlakyStore<S> {
    fn set_if_absent(&self, key: &str) -> Result<bool> {
        self.check()?;
        self.inner.set_if_absent(key)
    }

    fn set_expiration(&self, key: &str, ttl: Duration) -> Result<()> {
        self.check()?;
        self.inner.set_expiration(key, ttl)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.check()?;
        self.inner.delete(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        self.check()?;
        self.inner.keys_with_prefix(prefix)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        self.check()?;
        self.inner.exists(key)
    }
}

/// Minimal queue collaborator: stores JSON payloads and drives the lock
/// hooks at the points a real job queue would.
pub(crate) struct TestQueue<'a, S> {
    lock: &'a QueueLock<S>,
    policy: JobLockPolicy,
    payloads: RefCell<VecDeque<String>>,
}

impl<'a, S: LockStore> TestQueue<'a, S> {
    pub(crate) fn new(lock: &'a QueueLock<S>, policy: JobLockPolicy) -> Self {
        Self {
            lock,
            policy,
            payloads: RefCell::new(VecDeque::new()),
        }
    }

    /// Enqueue a job unless its lock is held. Returns whether it was admitted.
    pub(crate) fn enqueue<A: Serialize + ?Sized>(&self, args: &A) -> Result<bool> {
        if !self.lock.before_enqueue(&self.policy, args)? {
            return Ok(false);
        }
        let payload = serde_json::to_string(args)?;
        self.payloads.borrow_mut().push_back(payload);
        Ok(true)
    }

    /// Withdraw every queued job with these arguments.
    pub(crate) fn dequeue<A: Serialize + ?Sized>(&self, args: &A) -> Result<usize> {
        let payload = serde_json::to_string(args)?;
        self.lock.before_dequeue(&self.policy, args)?;

        let mut payloads = self.payloads.borrow_mut();
        let before = payloads.len();
        payloads.retain(|queued| *queued != payload);
        Ok(before - payloads.len())
    }

    /// Pop the next job, fire the perform hook with its decoded payload, then
    /// run `work`. The work's outcome is handed back untouched.
    pub(crate) fn perform_next<T, E>(
        &self,
        work: impl FnOnce(&Value) -> std::result::Result<T, E>,
    ) -> Result<Option<std::result::Result<T, E>>> {
        let next = self.payloads.borrow_mut().pop_front();
        let Some(payload) = next else {
            return Ok(None);
        };
        let args: Value = serde_json::from_str(&payload)?;
        self.lock.before_perform(&self.policy, &args)?;
        Ok(Some(work(&args)))
    }

    pub(crate) fn len(&self) -> usize {
        self.payloads.borrow().len()
    }
}
