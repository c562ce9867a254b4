//! Exit code constants for the queuelock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid config)
//! - 2: Store failure (permanent)
//! - 3: Store connection failure (after retries)
//! - 4: Lock already held

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid configuration, unserializable job arguments.
pub const USER_ERROR: i32 = 1;

/// Store failure: the store rejected the request.
pub const STORE_FAILURE: i32 = 2;

/// Connection failure: the store stayed unreachable through every retry.
pub const CONNECTION_FAILURE: i32 = 3;

/// Lock already held by another job.
pub const LOCK_HELD: i32 = 4;
