//! Domain error types

use thiserror::Error;

use crate::id::ServiceId;
use crate::timestamp::SkewTolerance;

/// Domain-level errors that can occur during validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A skew tolerance was given as a negative number of milliseconds.
    #[error("invalid skew tolerance: {0}ms is negative")]
    NegativeTolerance(i64),

    /// A service identifier could not be parsed.
    #[error("invalid service identifier: {0}")]
    InvalidServiceId(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Raised when two services' timestamps contradict a required ordering.
///
/// The first timestamp was expected to precede the second. It did not, and
/// the inversion exceeds the allowed skew, so the clocks on the two
/// services cannot both be right.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error(
    "clocks not synchronized: service1={service_id1}, service2={service_id2}, \
     skew={delta}ms exceeds maximum skew={max_skew}"
)]
pub struct ClockSkewViolation {
    /// The service that reported the earlier-expected timestamp.
    pub service_id1: ServiceId,
    /// The service that reported the later-expected timestamp.
    pub service_id2: ServiceId,
    /// Absolute difference between the two timestamps, in milliseconds.
    pub delta: u64,
    /// The tolerance that `delta` exceeded.
    pub max_skew: SkewTolerance,
}
