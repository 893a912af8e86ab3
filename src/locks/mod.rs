//! Distributed lock subsystem for cronlock.
//!
//! A lock is a single Redis key whose value is a UNIX timestamp: the instant
//! after which the lock counts as abandoned. There is no owner identity. The
//! key is created with `SET NX EX`, so exactly one process wins a race for a
//! free key; an expired value that Redis has not yet removed is taken over
//! with `GETSET`, and the previous value tells the caller whether somebody
//! else got there first.
//!
//! # Expiry
//!
//! - On acquisition the value is `now + release`, and Redis is told to drop
//!   the key after `release` seconds. This bounds how long a crashed holder
//!   can block everyone else.
//! - When the command finishes the value becomes `now + grace` and the key is
//!   set to expire at that instant. This keeps a fast command from being
//!   re-run by another host whose cron fired a moment later.

mod clock;
mod coordinator;
mod key;
mod redis_store;
mod store;
mod types;


// Re-export public API
pub use clock::{Clock, SystemClock};
pub use coordinator::Coordinator;
pub use key::{command_hash, command_line, compute_key};
pub use redis_store::{RedisStore, connection_url};
pub use store::{LockStore, check_liveness, parse_expiry};
pub use types::{Acquisition, Outcome};
