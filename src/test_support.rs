//! Test doubles for the lock protocol: a controllable clock, an in-memory
//! store with Redis semantics, and a runner that doesn't spawn anything.

use crate::error::{CronlockError, Result};
use crate::locks::{Clock, LockStore};
use crate::process::{CommandRunner, RunStatus};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub(crate) struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub(crate) fn new(now: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(now)),
        }
    }

    pub(crate) fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub(crate) fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<i64>,
}

/// In-memory [`LockStore`] with Redis TTL semantics, driven by a
/// [`ManualClock`].
#[derive(Debug)]
pub(crate) struct MemoryStore {
    clock: ManualClock,
    entries: HashMap<String, Entry>,
    ping_reply: String,
    fail_on: Option<&'static str>,
    ops: Vec<&'static str>,
}

impl MemoryStore {
    pub(crate) fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            entries: HashMap::new(),
            ping_reply: "PONG".to_string(),
            fail_on: None,
            ops: Vec::new(),
        }
    }

    /// Reply with something other than PONG.
    pub(crate) fn with_ping_reply(mut self, reply: &str) -> Self {
        self.ping_reply = reply.to_string();
        self
    }

    /// Make the named operation (`PING`, `SET NX`, `GET`, `GETSET`, `DEL`,
    /// `EXPIREAT`) fail.
    pub(crate) fn fail_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Seed a record directly, optionally with a TTL in seconds.
    pub(crate) fn insert(&mut self, key: &str, value: &str, ttl_secs: Option<i64>) {
        let expires_at = ttl_secs.map(|ttl| self.clock.now() + ttl);
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
    }

    /// Current value of `key`, honoring expiry.
    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.live(key).map(|e| e.value.clone())
    }

    /// Expiry instant of `key`, if it has a TTL.
    pub(crate) fn expires_at(&self, key: &str) -> Option<i64> {
        self.live(key).and_then(|e| e.expires_at)
    }

    /// Operations performed so far, in order.
    pub(crate) fn ops(&self) -> &[&'static str] {
        &self.ops
    }

    fn live(&self, key: &str) -> Option<&Entry> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|e| e.expires_at.is_none_or(|at| at > now))
    }

    fn record(&mut self, op: &'static str) -> Result<()> {
        self.ops.push(op);
        if self.fail_on == Some(op) {
            return Err(CronlockError::store(op, "injected failure"));
        }
        let now = self.clock.now();
        self.entries
            .retain(|_, e| e.expires_at.is_none_or(|at| at > now));
        Ok(())
    }
}

impl LockStore for MemoryStore {
    fn ping(&mut self) -> Result<String> {
        self.record("PING")?;
        Ok(self.ping_reply.clone())
    }

    fn set_if_absent(&mut self, key: &str, value: i64, ttl_secs: u64) -> Result<bool> {
        self.record("SET NX")?;
        if self.entries.contains_key(key) {
            return Ok(false);
        }
        self.insert(key, &value.to_string(), Some(ttl_secs as i64));
        Ok(true)
    }

    fn get(&mut self, key: &str) -> Result<Option<String>> {
        self.record("GET")?;
        Ok(self.entries.get(key).map(|e| e.value.clone()))
    }

    fn get_set(&mut self, key: &str, value: i64) -> Result<Option<String>> {
        self.record("GETSET")?;
        let previous = self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: None,
            },
        );
        Ok(previous.map(|e| e.value))
    }

    fn delete(&mut self, key: &str) -> Result<u64> {
        self.record("DEL")?;
        Ok(u64::from(self.entries.remove(key).is_some()))
    }

    fn expire_at(&mut self, key: &str, timestamp: i64) -> Result<bool> {
        self.record("EXPIREAT")?;
        if timestamp <= self.clock.now() {
            return Ok(self.entries.remove(key).is_some());
        }
        match self.entries.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(timestamp);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// [`CommandRunner`] that returns a canned status and records what it was
/// asked to run. It can advance a clock to simulate the command's duration.
#[derive(Debug)]
pub(crate) struct ScriptedRunner {
    status: Option<RunStatus>,
    clock: Option<(ManualClock, i64)>,
    pub(crate) calls: Vec<(Vec<String>, Option<Duration>)>,
}

impl ScriptedRunner {
    pub(crate) fn exiting(code: i32) -> Self {
        Self {
            status: Some(RunStatus::Exited(code)),
            clock: None,
            calls: Vec::new(),
        }
    }

    pub(crate) fn timing_out() -> Self {
        Self {
            status: Some(RunStatus::TimedOut),
            clock: None,
            calls: Vec::new(),
        }
    }

    /// A runner whose command cannot be spawned.
    pub(crate) fn unspawnable() -> Self {
        Self {
            status: None,
            clock: None,
            calls: Vec::new(),
        }
    }

    /// Advance `clock` by `secs` during each run.
    pub(crate) fn taking(mut self, clock: &ManualClock, secs: i64) -> Self {
        self.clock = Some((clock.clone(), secs));
        self
    }

    pub(crate) fn ran(&self) -> bool {
        !self.calls.is_empty()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, command: &[String], timeout: Option<Duration>) -> Result<RunStatus> {
        self.calls.push((command.to_vec(), timeout));
        if let Some((clock, secs)) = &self.clock {
            clock.advance(*secs);
        }
        self.status.ok_or_else(|| CronlockError::Spawn {
            program: command.first().cloned().unwrap_or_default(),
            message: "No such file or directory".to_string(),
        })
    }
}

/// Build an owned command line from string slices.
pub(crate) fn command(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
