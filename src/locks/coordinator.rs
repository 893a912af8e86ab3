//! The lock coordinator: reset, acquire, run, release.

use super::clock::Clock;
use super::key::{command_line, compute_key};
use super::store::{LockStore, parse_expiry};
use super::types::{Acquisition, Outcome};
use crate::config::LockConfig;
use crate::error::{CronlockError, Result};
use crate::exit_codes;
use crate::process::{CommandRunner, RunStatus};
use std::time::Duration;
use tracing::{debug, error, warn};

/// Guards one command line with one lock key.
#[derive(Debug)]
pub struct Coordinator<S, C> {
    store: S,
    clock: C,
    key: String,
    command: Vec<String>,
    grace: i64,
    release: i64,
    release_secs: u64,
    timeout: Option<Duration>,
    reset_only: bool,
}

impl<S: LockStore, C: Clock> Coordinator<S, C> {
    /// Create a coordinator for `command` using an already connected store.
    ///
    /// `config` must have passed [`LockConfig::validate`].
    pub fn new(store: S, clock: C, config: &LockConfig, command: &[String]) -> Self {
        Self {
            store,
            clock,
            key: compute_key(&config.prefix, config.key.as_deref(), command),
            command: command.to_vec(),
            grace: config.grace(),
            release: config.release(),
            release_secs: config.release_secs,
            timeout: config.command_timeout(),
            reset_only: config.reset,
        }
    }

    /// The Redis key guarding this command.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Run the whole protocol: reset if asked, otherwise acquire, run the
    /// command if the lock is ours, and release.
    ///
    /// # Returns
    ///
    /// * `Ok(Outcome)` - Reset done, lock held elsewhere, or the command ran
    /// * `Err(CronlockError)` - A store operation failed or the command could
    ///   not be started (exit 201)
    pub fn run<R: CommandRunner>(&mut self, runner: &mut R) -> Result<Outcome> {
        if self.reset_only {
            self.reset()?;
            return Ok(Outcome::Reset);
        }

        let acquisition = self.acquire()?;
        if !acquisition.is_acquired() {
            return Ok(Outcome::NotRun(acquisition));
        }

        let result = runner.run(&self.command, self.timeout);
        let released = self.release();

        let status = match result {
            Ok(status) => status,
            Err(err) => {
                if let Err(release_err) = released {
                    error!("{}", release_err);
                }
                return Err(err);
            }
        };
        released?;

        Ok(match status {
            RunStatus::Exited(code) => {
                if exit_codes::is_reserved(code) {
                    warn!(
                        "[{}] exited with {}, which cronlock also uses for its own outcomes",
                        command_line(&self.command),
                        code
                    );
                }
                Outcome::Ran(code)
            }
            RunStatus::TimedOut => {
                warn!(
                    "emergency: had to kill [{}] after {}s timeout",
                    command_line(&self.command),
                    self.timeout.map(|t| t.as_secs()).unwrap_or_default()
                );
                Outcome::TimedOut
            }
        })
    }

    /// Delete the lock. Succeeds whether or not the key existed.
    ///
    /// Returns the number of keys removed.
    pub fn reset(&mut self) -> Result<u64> {
        debug!("Removing {} key", self.key);
        let removed = self.store.delete(&self.key)?;
        debug!("Removed {} key(s)", removed);
        Ok(removed)
    }

    /// Try to take the lock without blocking.
    ///
    /// A free key is claimed with set-if-absent. A key whose stored expiry
    /// has passed is claimed with get-and-set; the value it replaced says
    /// whether another process claimed it in between. That check is not a
    /// fencing token: two processes racing through the takeover can both
    /// overwrite, and the loser's write still lands.
    pub fn acquire(&mut self) -> Result<Acquisition> {
        let max_expiry = self.expiry_after(self.release)?;

        debug!("Acquiring lock on {} key", self.key);
        if self
            .store
            .set_if_absent(&self.key, max_expiry, self.release_secs)?
        {
            debug!("Lock {} acquired", self.key);
            return Ok(Acquisition::Acquired {
                expires_at: max_expiry,
            });
        }

        // The key exists. A nil read means it expired since the SET and is
        // handled like any other stale record.
        let stored = parse_expiry(self.store.get(&self.key)?.as_deref());
        let expires_in = stored - self.clock.now();
        if expires_in >= 0 {
            let held = Acquisition::Held { expires_in };
            debug!("Lock {} {}", self.key, held);
            return Ok(held);
        }
        debug!(
            "Lock {} acquired by another process but expired {}s ago",
            self.key, -expires_in
        );

        let previous = parse_expiry(self.store.get_set(&self.key, max_expiry)?.as_deref());
        let previous_in = previous - self.clock.now();
        if previous_in > 0 {
            let lost = Acquisition::LostRace {
                expires_in: previous_in,
            };
            debug!("Lock {} was {}", self.key, lost);
            return Ok(lost);
        }

        let took_over = Acquisition::TookOver {
            expired_for: -expires_in,
        };
        debug!("Lock {} {}", self.key, took_over);
        Ok(took_over)
    }

    /// Finalize the lock after the command completes.
    ///
    /// Rewrites the value to `now + grace` so competing processes see the
    /// real expiry straight away, then sets the key to expire at that same
    /// instant. Both writes are attempted even if the first fails.
    ///
    /// Returns the new expiry timestamp.
    pub fn release(&mut self) -> Result<i64> {
        let min_expiry = self.expiry_after(self.grace)?;

        debug!("Lock {} set minimum grace period to: {}", self.key, min_expiry);
        let rewritten = self.store.get_set(&self.key, min_expiry);

        debug!("Lock {} set to expire at: {}", self.key, min_expiry);
        let expiry = self.store.expire_at(&self.key, min_expiry);

        rewritten?;
        expiry?;
        Ok(min_expiry)
    }

    fn expiry_after(&self, secs: i64) -> Result<i64> {
        self.clock.now().checked_add(secs).ok_or_else(|| {
            CronlockError::Config(format!("expiry {}s from now is out of range", secs))
        })
    }
}
