//! Running the guarded command.
//!
//! The coordinator only sees the [`CommandRunner`] trait; the real
//! implementation lives in [`executor`] and knows how to kill a whole process
//! tree when a timeout fires.

mod executor;

pub use executor::ProcessRunner;

use crate::error::Result;
use std::time::Duration;

/// How the guarded command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The command exited on its own with this code. A command killed by a
    /// signal reports `128 + signal`, as shells do.
    Exited(i32),

    /// The timeout fired and the command's process tree was killed.
    TimedOut,
}

/// Runs a command line as a child process.
pub trait CommandRunner {
    /// Run `command` (program followed by arguments) to completion, killing
    /// it and everything it spawned if `timeout` elapses first.
    fn run(&mut self, command: &[String], timeout: Option<Duration>) -> Result<RunStatus>;
}
