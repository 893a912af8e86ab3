//! Redis-backed [`LockStore`].
//!
//! Uses the synchronous `redis` client. Transport failures (refused, dropped,
//! timed out) are retried up to `reconnect_attempts` times with
//! `reconnect_backoff` between attempts, reconnecting before each retry. Any
//! other Redis error is returned immediately.

use super::store::{LockStore, check_liveness};
use crate::config::LockConfig;
use crate::error::{CronlockError, Result};
use redis::{Client, Connection, RedisError, RedisResult};
use std::time::Duration;
use tracing::{debug, warn};

/// Build the connection URL for the configured Redis server.
///
/// The password is percent-encoded. `#insecure` turns off certificate
/// verification for `rediss://` URLs.
pub fn connection_url(config: &LockConfig) -> String {
    let scheme = if config.tls { "rediss" } else { "redis" };

    let auth = match &config.auth {
        Some(password) => format!(":{}@", urlencoding::encode(password)),
        None => String::new(),
    };

    let host = if config.host.contains(':') && !config.host.starts_with('[') {
        format!("[{}]", config.host)
    } else {
        config.host.clone()
    };

    let mut url = format!(
        "{}://{}{}:{}/{}",
        scheme, auth, host, config.port, config.db
    );
    if config.tls && config.tls_skip_verify {
        url.push_str("#insecure");
    }
    url
}

/// Whether an error is worth reconnecting for.
fn is_transient(err: &RedisError) -> bool {
    err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout()
}

/// A connected Redis server.
pub struct RedisStore {
    client: Client,
    conn: Connection,
    address: String,
    timeout: Duration,
    attempts: u32,
    backoff: Duration,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("address", &self.address)
            .field("attempts", &self.attempts)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    /// Connect to Redis and verify the server answers PING with PONG.
    ///
    /// # Returns
    ///
    /// * `Ok(RedisStore)` - Connected and alive
    /// * `Err(CronlockError::Connection)` - Unreachable, or a bad ping reply (exit 201)
    pub fn connect(config: &LockConfig) -> Result<Self> {
        let address = format!("{}:{}", config.host, config.port);
        debug!("Connecting to redis at {}", address);

        let client = Client::open(connection_url(config))
            .map_err(|e| CronlockError::Connection(e.to_string()))?;

        let timeout = config.connect_timeout();
        let attempts = config.reconnect_attempts;
        let backoff = config.reconnect_backoff();

        let mut attempt = 0;
        let conn = loop {
            match open(&client, timeout) {
                Ok(conn) => break conn,
                Err(err) if is_transient(&err) && attempt < attempts => {
                    attempt += 1;
                    warn!(
                        "Connection to {} failed (attempt {}/{}): {}",
                        address, attempt, attempts, err
                    );
                    std::thread::sleep(backoff);
                }
                Err(err) => return Err(CronlockError::Connection(err.to_string())),
            }
        };

        let mut store = Self {
            client,
            conn,
            address,
            timeout,
            attempts,
            backoff,
        };
        check_liveness(&mut store)?;

        Ok(store)
    }

    /// Run `f` against the connection, retrying transport failures.
    fn with_retry<T>(
        &mut self,
        op: &'static str,
        f: impl Fn(&mut Connection) -> RedisResult<T>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            match f(&mut self.conn) {
                Ok(value) => return Ok(value),
                Err(err) if is_transient(&err) && attempt < self.attempts => {
                    attempt += 1;
                    warn!(
                        "Redis {} failed (attempt {}/{}), reconnecting: {}",
                        op, attempt, self.attempts, err
                    );
                    std::thread::sleep(self.backoff);
                    match open(&self.client, self.timeout) {
                        Ok(conn) => self.conn = conn,
                        Err(e) => debug!("Reconnect to {} failed: {}", self.address, e),
                    }
                }
                Err(err) => return Err(CronlockError::store(op, err)),
            }
        }
    }
}

/// Open a connection with read/write timeouts matching the dial timeout.
fn open(client: &Client, timeout: Duration) -> RedisResult<Connection> {
    let conn = client.get_connection_with_timeout(timeout)?;
    conn.set_read_timeout(Some(timeout))?;
    conn.set_write_timeout(Some(timeout))?;
    Ok(conn)
}

impl LockStore for RedisStore {
    fn ping(&mut self) -> Result<String> {
        self.with_retry("PING", |con| redis::cmd("PING").query::<String>(con))
    }

    fn set_if_absent(&mut self, key: &str, value: i64, ttl_secs: u64) -> Result<bool> {
        let reply = self.with_retry("SET NX", |con| {
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("EX")
                .arg(ttl_secs)
                .query::<Option<String>>(con)
        })?;
        Ok(reply.is_some())
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.with_retry("GET", |con| {
            redis::cmd("GET").arg(key).query::<Option<String>>(con)
        })
    }

    fn get_set(&mut self, key: &str, value: i64) -> Result<Option<String>> {
        self.with_retry("GETSET", |con| {
            redis::cmd("GETSET")
                .arg(key)
                .arg(value)
                .query::<Option<String>>(con)
        })
    }

    fn delete(&mut self, key: &str) -> Result<u64> {
        self.with_retry("DEL", |con| redis::cmd("DEL").arg(key).query::<u64>(con))
    }

    fn expire_at(&mut self, key: &str, timestamp: i64) -> Result<bool> {
        let set = self.with_retry("EXPIREAT", |con| {
            redis::cmd("EXPIREAT")
                .arg(key)
                .arg(timestamp)
                .query::<i64>(con)
        })?;
        Ok(set == 1)
    }
}
