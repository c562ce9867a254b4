//! Lock key derivation.
//!
//! A lock key is `"{job_name}-{args}"` where `args` is the compact JSON
//! rendering of the job's argument vector, namespaced under `queuelock:`.
//!
//! Arguments are canonicalized by pushing them through the same JSON
//! encode/decode round-trip the queue uses for job payloads. A value with no
//! native JSON form (a `chrono::DateTime`, say) therefore renders identically
//! whether the key is computed from the original value at enqueue time or
//! from the decoded payload at perform time.

use crate::error::Result;
use serde::Serialize;
use serde_json::Value;

/// Prefix shared by every lock key in the store.
pub const LOCK_NAMESPACE: &str = "queuelock:";

/// Separator between the job name and its rendered arguments.
pub const KEY_DELIMITER: char = '-';

/// Canonicalize job arguments through the queue payload encoding.
///
/// - `()` (encoded as `null`) is the empty argument vector
/// - a sequence or tuple is the vector of its elements
/// - any other value is a single argument
///
/// Fails only when the arguments cannot be encoded as a job payload at all.
pub fn canonicalize_args<A: Serialize + ?Sized>(args: &A) -> Result<Vec<Value>> {
    let encoded = serde_json::to_string(args)?;
    let decoded: Value = serde_json::from_str(&encoded)?;

    Ok(match decoded {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    })
}

/// Default lock identifier for a job: its name plus its rendered arguments.
pub fn default_lock_key(job_name: &str, args: &[Value]) -> String {
    format!("{}{}{}", job_name, KEY_DELIMITER, render_args(args))
}

/// Prefix a lock identifier with the lock namespace.
pub fn namespaced(lock_key: &str) -> String {
    format!("{}{}", LOCK_NAMESPACE, lock_key)
}

/// Compact JSON rendering of an argument vector, e.g. `[1,"a"]`.
fn render_args(args: &[Value]) -> String {
    // Value's Display is its compact JSON form and cannot fail.
    Value::Array(args.to_vec()).to_string()
}
