//! Millisecond timestamps and skew tolerances.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Milliseconds since the Unix epoch.
///
/// Values issued by one monotonic clock are strictly increasing. Nothing
/// makes them unique across nodes.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The Unix epoch.
    pub const EPOCH: Self = Self(0);

    /// Creates a timestamp from milliseconds since the epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the milliseconds since the epoch.
    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// The timestamp one millisecond later.
    ///
    /// Saturates at `i64::MAX`.
    #[must_use]
    pub const fn successor(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Absolute distance to `other` in milliseconds.
    ///
    /// Defined for every pair of values, including the extremes of `i64`.
    #[must_use]
    pub const fn abs_diff(self, other: Self) -> u64 {
        self.0.abs_diff(other.0)
    }

    /// Converts a UTC date-time, truncating to millisecond precision.
    #[must_use]
    pub fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime.timestamp_millis())
    }

    /// Converts to a UTC date-time.
    ///
    /// Returns `None` when the value lies outside the range chrono can
    /// represent.
    #[must_use]
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::from_datetime(datetime)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(
                f,
                "{} ({})",
                dt.to_rfc3339_opts(SecondsFormat::Millis, true),
                self.0
            ),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Maximum acceptable inversion between two timestamps, in milliseconds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SkewTolerance(u64);

impl SkewTolerance {
    /// No inversion tolerated; only equal timestamps pass.
    pub const ZERO: Self = Self(0);

    /// Creates a tolerance from a millisecond count.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Creates a tolerance from a signed millisecond count.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NegativeTolerance`] if `millis` is below zero.
    #[allow(clippy::cast_sign_loss)]
    pub const fn try_from_millis(millis: i64) -> DomainResult<Self> {
        if millis < 0 {
            return Err(DomainError::NegativeTolerance(millis));
        }
        Ok(Self(millis as u64))
    }

    /// Returns the tolerance in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }
}

impl TryFrom<i64> for SkewTolerance {
    type Error = DomainError;

    fn try_from(millis: i64) -> Result<Self, Self::Error> {
        Self::try_from_millis(millis)
    }
}

impl fmt::Display for SkewTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
