//! Validate ordering use case.

use tempora_domain::{ServiceId, SkewTolerance, Timestamp, assert_before};
use tracing::warn;

use crate::error::ApplicationResult;

/// Checks happens-before relations between services against a configured
/// maximum clock skew.
///
/// This is the entry point a commit coordinator uses; it binds the
/// tolerance once and logs every violation before returning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderingValidator {
    max_skew: SkewTolerance,
}

impl OrderingValidator {
    /// Creates a validator with the given tolerance.
    #[must_use]
    pub const fn new(max_skew: SkewTolerance) -> Self {
        Self { max_skew }
    }

    /// Creates a validator from a signed millisecond tolerance.
    ///
    /// # Errors
    /// Returns a domain error if `max_skew_ms` is negative.
    pub fn try_from_millis(max_skew_ms: i64) -> ApplicationResult<Self> {
        Ok(Self::new(SkewTolerance::try_from_millis(max_skew_ms)?))
    }

    /// Returns the configured tolerance.
    #[must_use]
    pub const fn max_skew(&self) -> SkewTolerance {
        self.max_skew
    }

    /// Asserts that `t1` from `service_id1` happened before `t2` from
    /// `service_id2`.
    ///
    /// # Errors
    /// Returns [`ApplicationError::ClockSkew`](crate::ApplicationError::ClockSkew)
    /// if `t1` is not before `t2` and the two are further apart than the
    /// configured tolerance. The caller should abort whatever depended on
    /// the ordering.
    pub fn assert_before(
        &self,
        service_id1: ServiceId,
        service_id2: ServiceId,
        t1: Timestamp,
        t2: Timestamp,
    ) -> ApplicationResult<()> {
        assert_before(service_id1, service_id2, t1, t2, self.max_skew).map_err(|violation| {
            warn!(
                %service_id1,
                %service_id2,
                t1 = t1.as_millis(),
                t2 = t2.as_millis(),
                skew_ms = violation.delta,
                max_skew_ms = self.max_skew.as_millis(),
                "clock skew violation"
            );
            violation.into()
        })
    }
}
