//! cronlock: run a command only when a Redis-backed distributed lock can be
//! acquired.
//!
//! Schedule the same job on several hosts for redundancy and wrap it in
//! `cronlock`; only one host runs it per slot. Overlapping runs of a
//! long-running job on a single host are prevented the same way.
//!
//! This is the main entry point. It parses arguments, connects to Redis,
//! runs the lock protocol, and turns the result into an exit code.

mod cli;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod locks;
mod logging;
pub mod process;

#[cfg(test)]
mod test_support;

use cli::Cli;
use config::LockConfig;
use error::Result;
use locks::{Coordinator, Outcome, RedisStore, SystemClock};
use process::ProcessRunner;
use std::process::ExitCode;
use tracing::{debug, error};

fn main() -> ExitCode {
    let cli = match Cli::try_parse_args() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are not failures.
            let code = if err.use_stderr() {
                exit_codes::FAILURE
            } else {
                0
            };
            let _ = err.print();
            return exit(code);
        }
    };

    let (config, command) = cli.into_parts();
    logging::init(config.verbose);

    match run(&config, &command) {
        Ok(outcome) => exit(outcome.exit_code()),
        Err(err) => {
            error!("{}", err);
            exit(err.exit_code())
        }
    }
}

/// Connect, then reset or acquire/run/release.
fn run(config: &LockConfig, command: &[String]) -> Result<Outcome> {
    config.validate()?;
    debug!("Configuration: {}", config.to_json()?);

    let store = RedisStore::connect(config)?;
    let mut coordinator = Coordinator::new(store, SystemClock, config, command);
    debug!("Using lock key {}", coordinator.key());
    coordinator.run(&mut ProcessRunner::new())
}

/// Convert an exit code to `ExitCode`. Codes outside 0..=255 can't come from
/// a real process; treat them as a cronlock failure.
fn exit(code: i32) -> ExitCode {
    u8::try_from(code)
        .map(ExitCode::from)
        .unwrap_or(ExitCode::from(exit_codes::FAILURE as u8))
}
