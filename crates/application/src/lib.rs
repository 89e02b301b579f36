//! Tempora Application - Use cases and ports
//!
//! This crate hands out monotonic timestamps and checks cross-service
//! ordering on top of the domain types. Wall-clock access goes through the
//! [`ports::Clock`] port so it can be replaced in tests.

pub mod error;
pub mod ports;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
pub use use_cases::{DEFAULT_REGRESSION_WARN_MS, MonotonicClock, OrderingValidator};
