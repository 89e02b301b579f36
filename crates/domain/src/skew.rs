//! Cross-service clock-skew validation.
//!
//! Two services cannot compare clocks directly, but a protocol often knows
//! that one event causally preceded another. If the first service stamped
//! its event *after* the second one did, by more than the skew both sides
//! agreed to tolerate, their clocks disagree.

use crate::error::ClockSkewViolation;
use crate::id::ServiceId;
use crate::timestamp::{SkewTolerance, Timestamp};

/// Asserts that `t1`, reported by `service_id1`, precedes `t2`, reported by
/// `service_id2`, within `max_skew`.
///
/// Any forward gap is accepted, however large: a long pause between cause
/// and observed effect is latency, not skew. An inversion (`t1 >= t2`) is
/// accepted while `|t1 - t2| <= max_skew`; the bound is inclusive.
///
/// This function is pure. The service identifiers only label the error.
///
/// # Errors
///
/// Returns [`ClockSkewViolation`] if `t1 >= t2` and the two timestamps are
/// more than `max_skew` apart.
///
/// # Example
///
/// ```
/// use tempora_domain::{ServiceId, SkewTolerance, Timestamp, assert_before};
///
/// let leader = ServiceId::generate();
/// let follower = ServiceId::generate();
/// let tolerance = SkewTolerance::from_millis(10);
///
/// let ok = assert_before(
///     leader,
///     follower,
///     Timestamp::from_millis(205),
///     Timestamp::from_millis(200),
///     tolerance,
/// );
/// assert!(ok.is_ok());
///
/// let err = assert_before(
///     leader,
///     follower,
///     Timestamp::from_millis(300),
///     Timestamp::from_millis(200),
///     tolerance,
/// )
/// .unwrap_err();
/// assert_eq!(err.delta, 100);
/// ```
pub const fn assert_before(
    service_id1: ServiceId,
    service_id2: ServiceId,
    t1: Timestamp,
    t2: Timestamp,
    max_skew: SkewTolerance,
) -> Result<(), ClockSkewViolation> {
    if t1.as_millis() < t2.as_millis() {
        return Ok(());
    }

    let delta = t1.abs_diff(t2);
    if delta <= max_skew.as_millis() {
        return Ok(());
    }

    Err(ClockSkewViolation {
        service_id1,
        service_id2,
        delta,
        max_skew,
    })
}
