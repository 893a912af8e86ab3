//! Results of the lock protocol.

use crate::exit_codes;
use std::fmt;

/// How an acquisition attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    /// The key was free and is now ours.
    Acquired { expires_at: i64 },

    /// The key held an expired value and our takeover won.
    TookOver { expired_for: i64 },

    /// Another process holds a live lock (`expires_in == 0` means it is
    /// expiring this very second).
    Held { expires_in: i64 },

    /// The key was expired, but another process took it over between our
    /// read and our write.
    LostRace { expires_in: i64 },
}

impl Acquisition {
    /// Whether this process now owns the lock and may run the command.
    pub fn is_acquired(&self) -> bool {
        matches!(
            self,
            Acquisition::Acquired { .. } | Acquisition::TookOver { .. }
        )
    }
}

impl fmt::Display for Acquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Acquisition::Acquired { expires_at } => {
                write!(f, "acquired (expires at {})", expires_at)
            }
            Acquisition::TookOver { expired_for } => {
                write!(f, "taken over (previous lock expired {}s ago)", expired_for)
            }
            Acquisition::Held { expires_in: 0 } => {
                write!(f, "held by another process but expiring now")
            }
            Acquisition::Held { expires_in } => {
                write!(f, "held by another process (expires in {}s)", expires_in)
            }
            Acquisition::LostRace { expires_in } => write!(
                f,
                "just now acquired by a different process (expires in {}s)",
                expires_in
            ),
        }
    }
}

/// Final result of one cronlock invocation, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Reset mode deleted the lock.
    Reset,

    /// The lock was not acquired; the command did not run.
    NotRun(Acquisition),

    /// The command ran and exited with this code.
    Ran(i32),

    /// The command ran past its timeout and was killed.
    TimedOut,
}

impl Outcome {
    /// Exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Reset | Outcome::NotRun(_) => exit_codes::NOT_RUN,
            Outcome::Ran(code) => *code,
            Outcome::TimedOut => exit_codes::TIMEOUT,
        }
    }
}
