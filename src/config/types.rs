//! Environment variable names and default values for cronlock settings.

/// Environment variable names.
///
/// These match the shell `cronlock` tool so existing crontabs keep working.
pub mod env {
    pub const HOST: &str = "CRONLOCK_HOST";
    pub const PORT: &str = "CRONLOCK_PORT";
    pub const DB: &str = "CRONLOCK_DB";
    pub const AUTH: &str = "CRONLOCK_AUTH";
    pub const TLS: &str = "CRONLOCK_TLS";
    pub const TLS_SKIP_VERIFY: &str = "CRONLOCK_TLS_SKIP_VERIFY";
    pub const REDIS_TIMEOUT: &str = "CRONLOCK_REDIS_TIMEOUT";
    pub const RECONNECT_ATTEMPTS: &str = "CRONLOCK_RECONNECT_ATTEMPTS";
    pub const RECONNECT_BACKOFF: &str = "CRONLOCK_RECONNECT_BACKOFF";
    pub const GRACE: &str = "CRONLOCK_GRACE";
    pub const RELEASE: &str = "CRONLOCK_RELEASE";
    pub const PREFIX: &str = "CRONLOCK_PREFIX";
    pub const KEY: &str = "CRONLOCK_KEY";
    pub const RESET: &str = "CRONLOCK_RESET";
    pub const TIMEOUT: &str = "CRONLOCK_TIMEOUT";
    pub const VERBOSE: &str = "CRONLOCK_VERBOSE";

    /// Every variable cronlock reads.
    pub const ALL: [&str; 16] = [
        HOST,
        PORT,
        DB,
        AUTH,
        TLS,
        TLS_SKIP_VERIFY,
        REDIS_TIMEOUT,
        RECONNECT_ATTEMPTS,
        RECONNECT_BACKOFF,
        GRACE,
        RELEASE,
        PREFIX,
        KEY,
        RESET,
        TIMEOUT,
        VERBOSE,
    ];
}

/// Default values.
pub mod defaults {
    pub const HOST: &str = "localhost";
    pub const PORT: u16 = 6379;
    pub const DB: i64 = 0;
    /// Seconds to wait for the TCP connection to Redis.
    pub const REDIS_TIMEOUT: u64 = 30;
    pub const RECONNECT_ATTEMPTS: u32 = 5;
    /// Seconds between reconnect attempts.
    pub const RECONNECT_BACKOFF: u64 = 5;
    /// Minimum seconds a lock is kept after the command finishes.
    pub const GRACE: u64 = 40;
    /// Maximum seconds a lock may be held.
    pub const RELEASE: u64 = 86400;
    pub const PREFIX: &str = "cronlock.";
    /// Seconds before the command is killed; 0 disables the timeout.
    pub const TIMEOUT: u64 = 0;
}

/// Bounds on configured values.
pub mod limits {
    /// Longest grace or release period: one hundred years. Keeps
    /// `now + period` well inside a Redis `EXPIREAT` timestamp.
    pub const MAX_SECS: u64 = 100 * 365 * 24 * 60 * 60;
}
