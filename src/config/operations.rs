//! LockConfig validation and derived values.

use super::model::LockConfig;
use super::types::limits;
use crate::error::{CronlockError, Result};
use std::time::Duration;

impl LockConfig {
    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `release_secs` must be positive (Redis rejects a zero TTL)
    /// - `grace_secs` and `release_secs` must not exceed [`limits::MAX_SECS`]
    /// - `redis_timeout_secs` must be positive
    /// - `host` and an explicit `key` must not be empty
    pub fn validate(&self) -> Result<()> {
        if self.release_secs == 0 {
            return Err(CronlockError::Config(
                "release must be greater than 0".to_string(),
            ));
        }

        if self.release_secs > limits::MAX_SECS || self.grace_secs > limits::MAX_SECS {
            return Err(CronlockError::Config(format!(
                "grace and release must be at most {} seconds",
                limits::MAX_SECS
            )));
        }

        if self.redis_timeout_secs == 0 {
            return Err(CronlockError::Config(
                "redis timeout must be greater than 0".to_string(),
            ));
        }

        if self.host.trim().is_empty() {
            return Err(CronlockError::Config("host must not be empty".to_string()));
        }

        if self.key.as_deref() == Some("") {
            return Err(CronlockError::Config(
                "explicit key must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Grace period in whole seconds, as a timestamp offset.
    pub fn grace(&self) -> i64 {
        self.grace_secs as i64
    }

    /// Release timeout in whole seconds, as a timestamp offset.
    pub fn release(&self) -> i64 {
        self.release_secs as i64
    }

    /// Per-command timeout, or `None` when disabled.
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Connection timeout for Redis.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.redis_timeout_secs)
    }

    /// Wait between reconnect attempts.
    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_secs(self.reconnect_backoff_secs)
    }

    /// Serialize the config to JSON for debug logging. The auth credential is
    /// left out.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| CronlockError::Config(format!("failed to serialize config: {}", e)))
    }
}
