//! Error types for the cronlock CLI.
//!
//! Uses thiserror for derive macros. Every error is fatal to the current
//! invocation and maps to the same exit code; lock contention and a failing
//! guarded command are not errors and never show up here.

use crate::exit_codes;
use thiserror::Error;

/// Main error type for cronlock operations.
#[derive(Error, Debug)]
pub enum CronlockError {
    /// The store is unreachable or did not answer PING with PONG.
    #[error("could not connect to Redis: {0}")]
    Connection(String),

    /// A store operation failed after the connection was established.
    #[error("Redis {op} failed: {message}")]
    Store { op: &'static str, message: String },

    /// The resolved configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The guarded command could not be started.
    #[error("failed to execute '{program}': {message}")]
    Spawn { program: String, message: String },

    /// Waiting on or killing the guarded command failed.
    #[error("process error: {0}")]
    Process(String),
}

impl CronlockError {
    /// Build a `Store` error from a Redis error.
    pub fn store(op: &'static str, err: impl std::fmt::Display) -> Self {
        CronlockError::Store {
            op,
            message: err.to_string(),
        }
    }

    /// Returns the exit code for this error.
    ///
    /// All coordinator-level failures share one code so that cron can tell
    /// them apart from the guarded command's own exit codes.
    pub fn exit_code(&self) -> i32 {
        match self {
            CronlockError::Connection(_)
            | CronlockError::Store { .. }
            | CronlockError::Config(_)
            | CronlockError::Spawn { .. }
            | CronlockError::Process(_) => exit_codes::FAILURE,
        }
    }
}

/// Result type alias for cronlock operations.
pub type Result<T> = std::result::Result<T, CronlockError>;
