//! Application error types

use tempora_domain::{ClockSkewViolation, DomainError};
use thiserror::Error;

/// Application-level errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// Two services' timestamps contradict a required ordering.
    #[error(transparent)]
    ClockSkew(#[from] ClockSkewViolation),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
