//! Tempora Domain - Core timestamp types
//!
//! This crate defines timestamps, service identities, skew tolerances and
//! the pure happens-before check between two services' timestamps.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod id;
pub mod skew;
pub mod timestamp;

pub use error::{ClockSkewViolation, DomainError, DomainResult};
pub use id::ServiceId;
pub use skew::assert_before;
pub use timestamp::{SkewTolerance, Timestamp};
