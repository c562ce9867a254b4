//! Error types for queuelock.
//!
//! Uses thiserror for derive macros. The protocol distinguishes transient
//! store-connectivity failures (retried) from everything else (surfaced
//! immediately).

use crate::exit_codes;
use thiserror::Error;

/// Main error type for queuelock operations.
#[derive(Error, Debug)]
pub enum QueueLockError {
    /// The store could not be reached. Retried by the retry policy.
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed the request. Never retried.
    #[error("Store operation failed: {0}")]
    Store(String),

    /// Job arguments could not go through the queue payload encoding.
    #[error("Argument serialization failed: {0}")]
    Serialization(String),

    /// Invalid configuration file or values.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// User provided invalid arguments.
    #[error("{0}")]
    UserError(String),

    /// A lock is held. The protocol itself reports this as `false`; callers
    /// that must fail on a held lock use this variant.
    #[error("Lock is already held: {0}")]
    LockHeld(String),
}

impl QueueLockError {
    /// Whether this failure is a lost or refused connection to the store.
    pub fn is_transient(&self) -> bool {
        matches!(self, QueueLockError::Connection(_))
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            QueueLockError::Connection(_) => exit_codes::CONNECTION_FAILURE,
            QueueLockError::Store(_) => exit_codes::STORE_FAILURE,
            QueueLockError::Serialization(_) => exit_codes::USER_ERROR,
            QueueLockError::Config(_) => exit_codes::USER_ERROR,
            QueueLockError::UserError(_) => exit_codes::USER_ERROR,
            QueueLockError::LockHeld(_) => exit_codes::LOCK_HELD,
        }
    }
}

impl From<serde_json::Error> for QueueLockError {
    fn from(e: serde_json::Error) -> Self {
        QueueLockError::Serialization(e.to_string())
    }
}

/// Result type alias for queuelock operations.
pub type Result<T> = std::result::Result<T, QueueLockError>;
