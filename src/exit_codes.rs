//! Exit code constants for the cronlock CLI.
//!
//! Cron and other schedulers key their behavior off these codes:
//! - below 200: the lock was acquired, the command ran, and this is its exit code
//! - 200: nothing ran, but nothing went wrong (lock held elsewhere, or reset)
//! - 201: cronlock itself failed
//! - 202: the command ran past its timeout and was killed

/// Normal non-execution: the lock is held by another process, or a reset
/// deleted the lock.
pub const NOT_RUN: i32 = 200;

/// Failure: connection error, store error, bad configuration, or anything
/// else cronlock could not handle.
pub const FAILURE: i32 = 201;

/// The guarded command exceeded its timeout and was killed.
pub const TIMEOUT: i32 = 202;

/// Whether `code` is one cronlock uses for its own outcomes.
pub fn is_reserved(code: i32) -> bool {
    matches!(code, NOT_RUN | FAILURE | TIMEOUT)
}
