//! Time sources for cache expiry
//!
//! Expiry decisions never read the system time directly; they ask a `Clock`.
//! Production code uses `SystemClock`, tests advance a `ManualClock`.

use chrono::{DateTime, Utc};

/// A source of the current time
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the operating system's wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
pub(crate) use manual::ManualClock;
