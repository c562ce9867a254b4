//! Per-job lock policies.

use crate::keys::default_lock_key;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Default lock lifetime: one hour.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(3600);

/// How a job type names and times out its queue lock.
///
/// Both methods receive the canonicalized job arguments (see
/// [`canonicalize_args`](crate::keys::canonicalize_args)).
pub trait LockPolicy {
    /// The job type's name.
    fn name(&self) -> &str;

    /// Lock identifier for these arguments, before namespacing.
    fn lock_key(&self, args: &[Value]) -> String {
        default_lock_key(self.name(), args)
    }

    /// How long an acquired lock lives if nobody releases it.
    fn lock_timeout(&self, _args: &[Value]) -> Duration {
        DEFAULT_LOCK_TIMEOUT
    }
}

/// Function deriving a lock identifier from canonical arguments.
pub type KeyFn = Arc<dyn Fn(&[Value]) -> String + Send + Sync>;

#[derive(Clone)]
enum KeyOverride {
    Default,
    Fixed(String),
    Custom(KeyFn),
}

/// A configurable [`LockPolicy`].
///
/// ```
/// use queuelock::locks::{JobLockPolicy, LockPolicy};
/// use std::time::Duration;
///
/// // Only one network graph update queued at a time, whatever the repo.
/// let policy = JobLockPolicy::new("UpdateNetworkGraph")
///     .with_fixed_key("network-graph")
///     .with_timeout(Duration::from_secs(600));
///
/// assert_eq!(policy.lock_key(&[serde_json::json!(42)]), "network-graph");
/// ```
#[derive(Clone)]
pub struct JobLockPolicy {
    name: String,
    key: KeyOverride,
    timeout: Duration,
}

impl JobLockPolicy {
    /// Policy with the default key derivation and timeout.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: KeyOverride::Default,
            timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Use one key for every invocation, ignoring arguments.
    pub fn with_fixed_key(mut self, key: impl Into<String>) -> Self {
        self.key = KeyOverride::Fixed(key.into());
        self
    }

    /// Derive the key with a custom function.
    pub fn with_key_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value]) -> String + Send + Sync + 'static,
    {
        self.key = KeyOverride::Custom(Arc::new(f));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl LockPolicy for JobLockPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn lock_key(&self, args: &[Value]) -> String {
        match &self.key {
            KeyOverride::Default => default_lock_key(&self.name, args),
            KeyOverride::Fixed(key) => key.clone(),
            KeyOverride::Custom(f) => f(args),
        }
    }

    fn lock_timeout(&self, _args: &[Value]) -> Duration {
        self.timeout
    }
}

impl fmt::Debug for JobLockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match &self.key {
            KeyOverride::Default => "default".to_string(),
            KeyOverride::Fixed(key) => format!("fixed({})", key),
            KeyOverride::Custom(_) => "custom".to_string(),
        };
        f.debug_struct("JobLockPolicy")
            .field("name", &self.name)
            .field("key", &key)
            .field("timeout", &self.timeout)
            .finish()
    }
}
