//! Monotonic time source used to time individual trials.

use std::time::Instant;

/// A monotonic, high-resolution source of timestamps in seconds.
///
/// Readings must never decrease and must not follow wall-clock adjustments.
/// Resolution is platform dependent; for callables that finish within a
/// few clock ticks, compare implementations by speedup rather than by
/// absolute durations.
pub trait Clock {
    /// Current timestamp in seconds, relative to an arbitrary origin.
    fn now(&self) -> f64;

    /// Seconds elapsed between two readings of this clock.
    fn elapsed(&self, start: f64, end: f64) -> f64 {
        (end - start).max(0.0)
    }
}

/// Clock backed by [`std::time::Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }

    fn elapsed(&self, start: f64, end: f64) -> f64 {
        (**self).elapsed(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let mut last = clock.now();
        for _ in 0..1000 {
            let next = clock.now();
            assert!(next >= last);
            last = next;
        }
    }

    #[test]
    fn test_monotonic_clock_measures_sleep() {
        let clock = MonotonicClock::new();
        let start = clock.now();
        std::thread::sleep(Duration::from_millis(10));
        let end = clock.now();

        let elapsed = clock.elapsed(start, end);
        assert!(elapsed >= 0.005);
        assert!(elapsed < 1.0);
    }

    #[test]
    fn test_elapsed_is_never_negative() {
        let clock = MonotonicClock::new();
        assert_eq!(clock.elapsed(2.0, 1.0), 0.0);
        assert_eq!(clock.elapsed(1.0, 3.5), 2.5);
    }
}
