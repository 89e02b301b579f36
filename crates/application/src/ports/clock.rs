//! Clock port for wall-clock readings

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tempora_domain::Timestamp;

/// Port for reading the wall clock.
///
/// Readings carry no ordering guarantee: they may repeat, or jump backward
/// when the clock is corrected. This abstraction allows testing
/// time-dependent code by providing a mock implementation.
pub trait Clock: Send + Sync {
    /// Returns the current wall-clock time in milliseconds since the epoch.
    fn now_millis(&self) -> Timestamp;

    /// Returns the current wall-clock time as a UTC date-time, if representable.
    fn now(&self) -> Option<DateTime<Utc>> {
        self.now_millis().to_datetime()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_millis(&self) -> Timestamp {
        (**self).now_millis()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> Timestamp {
        (**self).now_millis()
    }
}
