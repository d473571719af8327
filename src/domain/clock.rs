use chrono::{DateTime, Utc};

/// Source of the current time. Services that bound queries by "now" take a clock so tests
/// can pin the instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the system wall clock on every call
#[derive(Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
