//! Child process executor.
//!
//! Executes the guarded command with inherited stdio, an optional timeout,
//! and process-group cleanup on Unix.

use super::{CommandRunner, RunStatus};
use crate::error::{CronlockError, Result};
use std::process::{Child, Command, ExitStatus};
use std::time::{Duration, Instant};
use tracing::debug;

/// Interval between checks on a child running under a timeout.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Exit code used when a child has neither an exit code nor a signal.
const UNKNOWN_EXIT: i32 = 1;

/// [`CommandRunner`] that spawns real processes.
///
/// On Unix the child is placed in its own process group so that a timeout
/// kills grandchildren too.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&mut self, command: &[String], timeout: Option<Duration>) -> Result<RunStatus> {
        let Some((program, args)) = command.split_first() else {
            return Err(CronlockError::Spawn {
                program: String::new(),
                message: "empty command".to_string(),
            });
        };

        let mut cmd = Command::new(program);
        cmd.args(args);
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|e| CronlockError::Spawn {
            program: program.clone(),
            message: e.to_string(),
        })?;
        debug!("Started [{}] as pid {}", command.join(" "), child.id());

        match timeout {
            None => {
                let status = child
                    .wait()
                    .map_err(|e| CronlockError::Process(format!("failed to wait for child: {}", e)))?;
                Ok(RunStatus::Exited(exit_code(status)))
            }
            Some(timeout) => wait_with_timeout(&mut child, timeout),
        }
    }
}

/// Wait for a child process with timeout, killing its process tree if the
/// deadline passes.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<RunStatus> {
    let start = Instant::now();

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(RunStatus::Exited(exit_code(status))),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    kill_tree(child)?;
                    return Ok(RunStatus::TimedOut);
                }
                std::thread::sleep(POLL_INTERVAL.min(timeout.saturating_sub(start.elapsed())));
            }
            Err(e) => {
                return Err(CronlockError::Process(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}

/// Kill the child's whole process group, then reap the child.
#[cfg(unix)]
fn kill_tree(child: &mut Child) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(child.id() as i32);
    match killpg(pgid, Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => {
            return Err(CronlockError::Process(format!(
                "failed to kill process group {}: {}",
                pgid, e
            )));
        }
    }

    let _ = child.wait();
    Ok(())
}

/// Kill the child process, then reap it.
#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> Result<()> {
    let _ = child.kill();
    let _ = child.wait();
    Ok(())
}

/// Map an exit status to a shell-style exit code.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    UNKNOWN_EXIT
}
