//! Monotonic timestamp allocation.

use parking_lot::Mutex;
use tempora_domain::Timestamp;
use tracing::{debug, trace, warn};

use crate::ports::Clock;

/// Regressions larger than this many milliseconds are logged at `warn`.
pub const DEFAULT_REGRESSION_WARN_MS: u64 = 1_000;

#[derive(Debug, Default)]
struct ClockState {
    /// The last value handed out, or the floor a resumed clock must exceed.
    last_issued: Option<Timestamp>,
    /// Set while the wall clock has not caught up with `last_issued`.
    auto_increment: bool,
}

/// Issues strictly increasing millisecond timestamps from a wall clock.
///
/// While the wall clock advances its readings are used directly. When a
/// reading repeats or goes backward the clock switches to auto-increment
/// mode and issues `last + 1` until the wall clock moves past the issued
/// sequence again. It never sleeps and never waits for the wall clock, so a
/// large backward step (a manual correction, a timezone change on a badly
/// configured host) is bridged immediately, at the cost of running ahead of
/// wall time until the wall clock catches up.
///
/// One instance is meant to be shared by every caller on a node that needs
/// commit timestamps. Callers serialize on an internal lock; each receives
/// a distinct value, ordered by lock acquisition.
///
/// # Example
///
/// ```
/// use tempora_application::MonotonicClock;
/// use tempora_application::ports::Clock;
/// use tempora_domain::Timestamp;
///
/// struct Frozen;
///
/// impl Clock for Frozen {
///     fn now_millis(&self) -> Timestamp {
///         Timestamp::from_millis(1_000)
///     }
/// }
///
/// let clock = MonotonicClock::new(Frozen);
/// assert_eq!(clock.next_timestamp(), Timestamp::from_millis(1_000));
/// assert_eq!(clock.next_timestamp(), Timestamp::from_millis(1_001));
/// ```
#[derive(Debug)]
pub struct MonotonicClock<C> {
    source: C,
    state: Mutex<ClockState>,
    regression_warn_ms: u64,
}

impl<C: Clock> MonotonicClock<C> {
    /// Creates a clock that has not issued anything yet.
    #[must_use]
    pub fn new(source: C) -> Self {
        Self {
            source,
            state: Mutex::new(ClockState::default()),
            regression_warn_ms: DEFAULT_REGRESSION_WARN_MS,
        }
    }

    /// Creates a clock whose first timestamp is strictly greater than `floor`.
    ///
    /// Use this on restart with the last durable commit timestamp, so a wall
    /// clock that was set back while the process was down cannot reissue it.
    #[must_use]
    pub fn resume_after(source: C, floor: Timestamp) -> Self {
        Self {
            source,
            state: Mutex::new(ClockState {
                last_issued: Some(floor),
                auto_increment: false,
            }),
            regression_warn_ms: DEFAULT_REGRESSION_WARN_MS,
        }
    }

    /// Sets the regression size, in milliseconds, above which entering
    /// auto-increment mode is logged at `warn` instead of `debug`.
    #[must_use]
    pub fn with_regression_warning(mut self, millis: u64) -> Self {
        self.regression_warn_ms = millis;
        self
    }

    /// Returns the next timestamp.
    ///
    /// The result is strictly greater than every value this instance has
    /// returned before, whatever the wall clock does. Saturates at
    /// `i64::MAX` milliseconds.
    pub fn next_timestamp(&self) -> Timestamp {
        let mut state = self.state.lock();
        let reading = self.source.now_millis();

        let next = match state.last_issued {
            Some(last) if reading <= last => {
                if !state.auto_increment {
                    state.auto_increment = true;
                    self.report_fallback(reading, last);
                }
                last.successor()
            }
            _ => {
                if state.auto_increment {
                    state.auto_increment = false;
                    debug!(%reading, "wall clock caught up, leaving auto-increment mode");
                }
                reading
            }
        };

        state.last_issued = Some(next);
        next
    }

    fn report_fallback(&self, reading: Timestamp, last: Timestamp) {
        let behind_ms = last.abs_diff(reading);
        if behind_ms == 0 {
            trace!(%last, "wall clock stalled, entering auto-increment mode");
        } else if behind_ms > self.regression_warn_ms {
            warn!(
                %reading,
                last_issued = %last,
                behind_ms,
                "wall clock moved backward, entering auto-increment mode"
            );
        } else {
            debug!(
                %reading,
                last_issued = %last,
                behind_ms,
                "wall clock moved backward, entering auto-increment mode"
            );
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::thread;
    use std::time::{Duration, Instant};

    /// Replays scripted readings, then repeats the last one forever.
    struct ScriptedClock {
        readings: parking_lot::Mutex<VecDeque<i64>>,
        last: parking_lot::Mutex<i64>,
    }

    impl ScriptedClock {
        fn new(readings: impl IntoIterator<Item = i64>) -> Self {
            Self {
                readings: parking_lot::Mutex::new(readings.into_iter().collect()),
                last: parking_lot::Mutex::new(0),
            }
        }
    }

    impl Clock for ScriptedClock {
        fn now_millis(&self) -> Timestamp {
            let mut last = self.last.lock();
            if let Some(next) = self.readings.lock().pop_front() {
                *last = next;
            }
            Timestamp::from_millis(*last)
        }
    }

    struct ConstantClock(i64);

    impl Clock for ConstantClock {
        fn now_millis(&self) -> Timestamp {
            Timestamp::from_millis(self.0)
        }
    }

    fn millis(clock: &MonotonicClock<impl Clock>, n: usize) -> Vec<i64> {
        (0..n).map(|_| clock.next_timestamp().as_millis()).collect()
    }

    #[test]
    fn test_advancing_wall_clock_is_used_directly() {
        let clock = MonotonicClock::new(ScriptedClock::new([100, 150, 400]));
        assert_eq!(millis(&clock, 3), vec![100, 150, 400]);
    }

    #[test]
    fn test_stalled_wall_clock_auto_increments() {
        let clock = MonotonicClock::new(ScriptedClock::new([100, 100, 100, 100]));
        assert_eq!(millis(&clock, 4), vec![100, 101, 102, 103]);
    }

    #[test]
    fn test_regression_auto_increments_until_wall_clock_catches_up() {
        // Wall clock jumps back 2s, then creeps forward past the sequence.
        let clock = MonotonicClock::new(ScriptedClock::new([
            5_000, 3_000, 3_001, 4_000, 5_002, 5_003, 5_010,
        ]));
        assert_eq!(
            millis(&clock, 7),
            vec![5_000, 5_001, 5_002, 5_003, 5_004, 5_005, 5_010]
        );
    }

    #[test]
    fn test_large_regression_does_not_resynchronize() {
        let hour = 3_600_000;
        let clock = MonotonicClock::new(ScriptedClock::new([10 * hour, 9 * hour, 9 * hour + 1]));
        assert_eq!(
            millis(&clock, 3),
            vec![10 * hour, 10 * hour + 1, 10 * hour + 2]
        );
    }

    #[test]
    fn test_decreasing_wall_clock_stays_strictly_increasing() {
        let clock = MonotonicClock::new(ScriptedClock::new((0..1_000).rev()));
        let out = millis(&clock, 1_000);
        assert!(out.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(out[0], 999);
        assert_eq!(out[999], 1_998);
    }

    #[test]
    fn test_frozen_clock_does_not_block() {
        let clock = MonotonicClock::new(ConstantClock(42));
        let start = Instant::now();
        let out = millis(&clock, 10_000);
        let elapsed = start.elapsed();

        assert_eq!(out.len(), 10_000);
        assert!(out.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(out[0], 42);
        assert_eq!(out[9_999], 42 + 9_999);
        assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_negative_wall_clock_readings_are_accepted() {
        let clock = MonotonicClock::new(ScriptedClock::new([-50, -60, -10]));
        assert_eq!(millis(&clock, 3), vec![-50, -49, -10]);
    }

    #[test]
    fn test_resume_after_exceeds_floor() {
        let clock = MonotonicClock::resume_after(ConstantClock(1_000), Timestamp::from_millis(2_000));
        assert_eq!(millis(&clock, 2), vec![2_001, 2_002]);
    }

    #[test]
    fn test_resume_after_uses_wall_clock_when_ahead() {
        let clock = MonotonicClock::resume_after(ConstantClock(9_000), Timestamp::from_millis(2_000));
        assert_eq!(millis(&clock, 2), vec![9_000, 9_001]);
    }

    #[test]
    fn test_saturates_at_max() {
        let clock = MonotonicClock::new(ConstantClock(i64::MAX));
        assert_eq!(clock.next_timestamp().as_millis(), i64::MAX);
        assert_eq!(clock.next_timestamp().as_millis(), i64::MAX);
    }

    #[test]
    fn test_independent_instances_do_not_share_state() {
        let a = MonotonicClock::new(ConstantClock(7));
        let b = MonotonicClock::new(ConstantClock(7));
        assert_eq!(millis(&a, 3), vec![7, 8, 9]);
        assert_eq!(millis(&b, 1), vec![7]);
    }

    #[test]
    fn test_shared_source_through_arc() {
        let source = Arc::new(ConstantClock(500));
        let clock = MonotonicClock::new(Arc::clone(&source));
        assert_eq!(millis(&clock, 2), vec![500, 501]);
        assert_eq!(source.now_millis().as_millis(), 500);
    }

    #[test]
    fn test_concurrent_callers_receive_distinct_increasing_values() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 2_000;

        let clock = Arc::new(MonotonicClock::new(ConstantClock(1_000)));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let clock = Arc::clone(&clock);
                thread::spawn(move || millis(&*clock, PER_THREAD))
            })
            .collect();

        let mut all = Vec::with_capacity(THREADS * PER_THREAD);
        for handle in handles {
            let out = handle.join().expect("worker panicked");
            // Each thread sees its own calls in increasing order.
            assert!(out.windows(2).all(|w| w[0] < w[1]));
            all.extend(out);
        }

        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), THREADS * PER_THREAD);
        assert_eq!(all[0], 1_000);
        assert_eq!(*all.last().unwrap(), 1_000 + (THREADS * PER_THREAD) as i64 - 1);
    }

    #[test]
    fn test_real_wall_clock_sequence_is_strictly_increasing() {
        struct Wall;
        impl Clock for Wall {
            fn now_millis(&self) -> Timestamp {
                Timestamp::from_datetime(chrono::Utc::now())
            }
        }

        let clock = MonotonicClock::new(Wall);
        let out = millis(&clock, 1_000);
        assert!(out.windows(2).all(|w| w[0] < w[1]));
    }
}
