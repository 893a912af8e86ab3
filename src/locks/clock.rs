//! Wall-clock source for lock timestamps.

use chrono::Utc;

/// Source of the current UNIX time in seconds.
pub trait Clock {
    fn now(&self) -> i64;
}

/// The system clock, in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}
