//! CLI argument parsing for cronlock.
//!
//! Uses clap derive macros. Every setting can come from a long flag or from
//! its `CRONLOCK_*` environment variable; the flag wins. Everything from the
//! first positional argument onward is the guarded command, passed through
//! untouched.

use crate::config::LockConfig;
use crate::config::types::{defaults, env};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser};

/// cronlock: run a command only if a Redis-backed lock can be acquired.
///
/// Exit codes below 200 are the command's own. 200 means the command did not
/// run because another host holds the lock (or the lock was reset), 201 means
/// cronlock failed, and 202 means the command timed out and was killed.
#[derive(Parser, Debug)]
#[command(name = "cronlock")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Redis host.
    #[arg(long, env = env::HOST, default_value = defaults::HOST)]
    pub host: String,

    /// Redis port.
    #[arg(long, env = env::PORT, default_value_t = defaults::PORT)]
    pub port: u16,

    /// Redis database index.
    #[arg(long, env = env::DB, default_value_t = defaults::DB)]
    pub db: i64,

    /// Redis password.
    #[arg(long, env = env::AUTH, hide_env_values = true)]
    pub auth: Option<String>,

    /// Connect to Redis over TLS.
    #[arg(long, env = env::TLS, action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub tls: bool,

    /// Skip TLS certificate verification.
    #[arg(long, env = env::TLS_SKIP_VERIFY, action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub tls_skip_verify: bool,

    /// Seconds to wait when connecting to Redis.
    #[arg(long, env = env::REDIS_TIMEOUT, default_value_t = defaults::REDIS_TIMEOUT)]
    pub redis_timeout: u64,

    /// Retries for a failed Redis connection or command.
    #[arg(long, env = env::RECONNECT_ATTEMPTS, default_value_t = defaults::RECONNECT_ATTEMPTS)]
    pub reconnect_attempts: u32,

    /// Seconds between Redis retries.
    #[arg(long, env = env::RECONNECT_BACKOFF, default_value_t = defaults::RECONNECT_BACKOFF)]
    pub reconnect_backoff: u64,

    /// Minimum seconds to keep the lock after the command finishes.
    #[arg(long, env = env::GRACE, default_value_t = defaults::GRACE)]
    pub grace: u64,

    /// Maximum seconds the lock may be held.
    #[arg(long, env = env::RELEASE, default_value_t = defaults::RELEASE)]
    pub release: u64,

    /// Prefix for the lock key.
    #[arg(long, env = env::PREFIX, default_value = defaults::PREFIX)]
    pub prefix: String,

    /// Use this key instead of a hash of the command line.
    #[arg(long, env = env::KEY)]
    pub key: Option<String>,

    /// Delete the lock for this command and exit without running it.
    #[arg(long, env = env::RESET, action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub reset: bool,

    /// Kill the command after this many seconds (0 disables).
    #[arg(long, env = env::TIMEOUT, default_value_t = defaults::TIMEOUT)]
    pub timeout: u64,

    /// Log every step of the lock protocol.
    #[arg(short, long, env = env::VERBOSE, action = ArgAction::SetTrue, value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// The command to run, followed by its arguments.
    #[arg(required = true, trailing_var_arg = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn try_parse_args() -> Result<Self, clap::Error> {
        Self::try_parse()
    }

    /// Split into the resolved configuration and the guarded command line.
    pub fn into_parts(self) -> (LockConfig, Vec<String>) {
        let config = LockConfig {
            host: self.host,
            port: self.port,
            db: self.db,
            auth: self.auth.filter(|a| !a.is_empty()),
            tls: self.tls,
            tls_skip_verify: self.tls_skip_verify,
            redis_timeout_secs: self.redis_timeout,
            reconnect_attempts: self.reconnect_attempts,
            reconnect_backoff_secs: self.reconnect_backoff,
            grace_secs: self.grace,
            release_secs: self.release,
            prefix: self.prefix,
            key: self.key,
            reset: self.reset,
            timeout_secs: self.timeout,
            verbose: self.verbose,
        };
        (config, self.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    /// Clear every CRONLOCK_* variable so the ambient environment can't leak
    /// into parsing.
    fn clear_env() {
        for name in env::ALL {
            // SAFETY: env-touching tests are #[serial].
            unsafe { std::env::remove_var(name) };
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_flags() {
        clear_env();
        let cli = Cli::try_parse_from(["cronlock", "backup.sh"]).unwrap();
        let (config, command) = cli.into_parts();

        assert_eq!(config, LockConfig::default());
        assert_eq!(command, vec!["backup.sh"]);
    }

    #[test]
    #[serial]
    fn test_command_arguments_pass_through() {
        clear_env();
        let cli = Cli::try_parse_from(["cronlock", "ls", "-la", "--color", "/tmp"]).unwrap();
        let (_, command) = cli.into_parts();

        assert_eq!(command, vec!["ls", "-la", "--color", "/tmp"]);
    }

    #[test]
    #[serial]
    fn test_flags_before_command() {
        clear_env();
        let cli = Cli::try_parse_from([
            "cronlock",
            "--grace",
            "5",
            "--release",
            "100",
            "--key",
            "nightly",
            "--timeout",
            "30",
            "--verbose",
            "sleep",
            "1",
        ])
        .unwrap();
        let (config, command) = cli.into_parts();

        assert_eq!(config.grace_secs, 5);
        assert_eq!(config.release_secs, 100);
        assert_eq!(config.key.as_deref(), Some("nightly"));
        assert_eq!(config.timeout_secs, 30);
        assert!(config.verbose);
        assert_eq!(command, vec!["sleep", "1"]);
    }

    #[test]
    #[serial]
    fn test_double_dash_allows_hyphen_command() {
        clear_env();
        let cli = Cli::try_parse_from(["cronlock", "--", "-weird", "arg"]).unwrap();
        let (_, command) = cli.into_parts();

        assert_eq!(command, vec!["-weird", "arg"]);
    }

    #[test]
    #[serial]
    fn test_missing_command_is_an_error() {
        clear_env();
        let err = Cli::try_parse_from(["cronlock"]).unwrap_err();
        assert_eq!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument
        );
    }

    #[test]
    #[serial]
    fn test_environment_variables() {
        clear_env();
        // SAFETY: env-touching tests are #[serial].
        unsafe {
            std::env::set_var(env::HOST, "redis.internal");
            std::env::set_var(env::PORT, "6380");
            std::env::set_var(env::DB, "3");
            std::env::set_var(env::AUTH, "s3cret");
            std::env::set_var(env::TLS, "yes");
            std::env::set_var(env::RESET, "yes");
            std::env::set_var(env::VERBOSE, "no");
            std::env::set_var(env::PREFIX, "jobs.");
        }

        let cli = Cli::try_parse_from(["cronlock", "true"]).unwrap();
        clear_env();
        let (config, _) = cli.into_parts();

        assert_eq!(config.host, "redis.internal");
        assert_eq!(config.port, 6380);
        assert_eq!(config.db, 3);
        assert_eq!(config.auth.as_deref(), Some("s3cret"));
        assert!(config.tls);
        assert!(!config.tls_skip_verify);
        assert!(config.reset);
        assert!(!config.verbose);
        assert_eq!(config.prefix, "jobs.");
    }

    #[test]
    #[serial]
    fn test_flag_overrides_environment() {
        clear_env();
        // SAFETY: env-touching tests are #[serial].
        unsafe { std::env::set_var(env::GRACE, "60") };

        let cli = Cli::try_parse_from(["cronlock", "--grace", "7", "true"]).unwrap();
        clear_env();
        let (config, _) = cli.into_parts();

        assert_eq!(config.grace_secs, 7);
    }

    #[test]
    #[serial]
    fn test_empty_auth_is_ignored() {
        clear_env();
        let cli = Cli::try_parse_from(["cronlock", "--auth", "", "true"]).unwrap();
        let (config, _) = cli.into_parts();

        assert_eq!(config.auth, None);
    }

    #[test]
    #[serial]
    fn test_invalid_number_is_an_error() {
        clear_env();
        let err = Cli::try_parse_from(["cronlock", "--grace", "soon", "true"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
