//! Application use cases

mod monotonic_clock;
mod validate_ordering;

pub use monotonic_clock::{DEFAULT_REGRESSION_WARN_MS, MonotonicClock};
pub use validate_ordering::OrderingValidator;
