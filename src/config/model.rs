//! LockConfig struct definition and default implementation.

use super::types::defaults;
use serde::Serialize;

/// Resolved configuration for one cronlock invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockConfig {
    // =========================================================================
    // Redis connection
    // =========================================================================
    /// Redis host name or address.
    pub host: String,

    /// Redis port.
    pub port: u16,

    /// Redis database index.
    pub db: i64,

    /// Redis password. Never serialized or logged.
    #[serde(skip_serializing)]
    pub auth: Option<String>,

    /// Connect with TLS (`rediss://`).
    pub tls: bool,

    /// Skip TLS certificate verification.
    pub tls_skip_verify: bool,

    /// Connection timeout in seconds.
    pub redis_timeout_secs: u64,

    /// How many times a failed connection or command is retried.
    pub reconnect_attempts: u32,

    /// Seconds to wait between retries.
    pub reconnect_backoff_secs: u64,

    // =========================================================================
    // Lock behavior
    // =========================================================================
    /// Minimum hold time after the command completes, in seconds.
    pub grace_secs: u64,

    /// Maximum hold time, in seconds. Also the TTL set on acquisition.
    pub release_secs: u64,

    /// Prefix for every lock key.
    pub prefix: String,

    /// Explicit key, used instead of hashing the command line.
    pub key: Option<String>,

    /// Delete the lock and exit without running anything.
    pub reset: bool,

    // =========================================================================
    // Command execution
    // =========================================================================
    /// Seconds before the command is killed; 0 disables the timeout.
    pub timeout_secs: u64,

    /// Log protocol steps at debug level.
    pub verbose: bool,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            host: defaults::HOST.to_string(),
            port: defaults::PORT,
            db: defaults::DB,
            auth: None,
            tls: false,
            tls_skip_verify: false,
            redis_timeout_secs: defaults::REDIS_TIMEOUT,
            reconnect_attempts: defaults::RECONNECT_ATTEMPTS,
            reconnect_backoff_secs: defaults::RECONNECT_BACKOFF,
            grace_secs: defaults::GRACE,
            release_secs: defaults::RELEASE,
            prefix: defaults::PREFIX.to_string(),
            key: None,
            reset: false,
            timeout_secs: defaults::TIMEOUT,
            verbose: false,
        }
    }
}
