//! Monotonic nanosecond clock used by the code timer.
//!
//! Timings are taken from `std::time::Instant`, which is immune to wall-clock
//! adjustments. Readings are expressed as nanoseconds since a process-wide
//! anchor captured on first use, so they fit in a `u64` and can be subtracted
//! directly.

use std::time::Instant;

use lazy_static::lazy_static;

lazy_static! {
    /// The instant all readings of [`MonotonicClock`] are measured from.
    static ref CLOCK_ANCHOR: Instant = Instant::now();
}

/// A source of monotonic nanosecond readings.
///
/// [`CodeTimer`](crate::CodeTimer) is generic over this trait so that tests
/// can drive it with scripted readings instead of real time.
pub trait Clock {
    /// Returns the current reading in nanoseconds.
    ///
    /// Successive readings must never decrease.
    fn now_ns(&self) -> u64;
}

/// The default clock, backed by [`monotonic_ns`].
///
/// # Examples
///
/// ```
/// # use jacktrade::efficient_clock::{Clock, MonotonicClock};
/// let clock = MonotonicClock;
/// let a = clock.now_ns();
/// let b = clock.now_ns();
/// assert!(b >= a);
/// ```
#[derive(Debug, Default, Copy, Clone)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_ns(&self) -> u64 {
        monotonic_ns()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }
}

/// Returns nanoseconds elapsed since the process-wide clock anchor.
///
/// Saturates at `u64::MAX`, which is roughly 584 years of uptime.
#[inline(always)]
pub fn monotonic_ns() -> u64 {
    u64::try_from(CLOCK_ANCHOR.elapsed().as_nanos()).unwrap_or(u64::MAX)
}
