//! System clock adapter

use chrono::Utc;
use tempora_application::ports::Clock;
use tempora_domain::Timestamp;

/// Wall clock backed by the operating system time.
///
/// Readings follow whatever the host clock does, including backward steps
/// from NTP or manual correction. Wrap it in a
/// [`MonotonicClock`](tempora_application::MonotonicClock) to get
/// timestamps that never repeat.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}
