//! The key/value operations the lock protocol needs.
//!
//! Correctness rests on two of these being atomic in the store:
//! `set_if_absent` and `get_set`. Nothing is locked locally.

use crate::error::{CronlockError, Result};

/// Key/value store holding lock records.
///
/// Values are UNIX timestamps written as decimal strings.
pub trait LockStore {
    /// Liveness check. Returns the raw reply (`PONG` for Redis).
    fn ping(&mut self) -> Result<String>;

    /// Set `key` to `value` with a TTL of `ttl_secs`, only if `key` is absent.
    ///
    /// Returns `true` if the key was set.
    fn set_if_absent(&mut self, key: &str, value: i64, ttl_secs: u64) -> Result<bool>;

    /// Read the current value of `key`.
    fn get(&mut self, key: &str) -> Result<Option<String>>;

    /// Replace the value of `key` and return the previous one.
    ///
    /// Like Redis `GETSET`, this clears any TTL on the key.
    fn get_set(&mut self, key: &str, value: i64) -> Result<Option<String>>;

    /// Delete `key`. Returns the number of keys removed (0 or 1).
    fn delete(&mut self, key: &str) -> Result<u64>;

    /// Expire `key` at the given UNIX timestamp.
    ///
    /// Returns `false` if the key does not exist.
    fn expire_at(&mut self, key: &str, timestamp: i64) -> Result<bool>;
}

impl<T: LockStore + ?Sized> LockStore for &mut T {
    fn ping(&mut self) -> Result<String> {
        (**self).ping()
    }

    fn set_if_absent(&mut self, key: &str, value: i64, ttl_secs: u64) -> Result<bool> {
        (**self).set_if_absent(key, value, ttl_secs)
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn get_set(&mut self, key: &str, value: i64) -> Result<Option<String>> {
        (**self).get_set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<u64> {
        (**self).delete(key)
    }

    fn expire_at(&mut self, key: &str, timestamp: i64) -> Result<bool> {
        (**self).expire_at(key, timestamp)
    }
}

/// Ping the store and insist on a `PONG` reply.
pub fn check_liveness<S: LockStore + ?Sized>(store: &mut S) -> Result<()> {
    let reply = store
        .ping()
        .map_err(|e| CronlockError::Connection(e.to_string()))?;

    if reply != "PONG" {
        return Err(CronlockError::Connection(format!(
            "unexpected ping reply: {}",
            reply
        )));
    }

    Ok(())
}

/// Parse a stored lock value.
///
/// Missing or malformed values read as `0`, i.e. long expired, so a damaged
/// record can be taken over instead of blocking the job forever.
pub fn parse_expiry(value: Option<&str>) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(0)
}
