//! Monotonic time sources.
//!
//! Every timestamp a [`ProgressBar`](crate::ProgressBar) records comes from a [`Clock`].
//! Production code uses [`SystemClock`]; tests drive a [`ManualClock`] forward explicitly
//! so that rendered output is deterministic.

use std::{sync::Arc, time::Duration};

use parking_lot::RwLock;
use web_time::Instant;

/// A source of monotonic timestamps.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// The process's monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same offset, so a test can keep one handle while the bar owns
/// another:
///
/// ```
/// use std::time::Duration;
/// use line_progress::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// let before = clock.now();
/// handle.advance(Duration::from_secs(2));
/// assert_eq!(clock.now() - before, Duration::from_secs(2));
/// ```
#[derive(Clone, Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Arc<RwLock<Duration>>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(RwLock::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        *self.offset.write() += by;
    }

    /// Sets the total time elapsed since the clock was created.
    ///
    /// Moving backwards is ignored; the clock stays monotonic.
    pub fn set_elapsed(&self, elapsed: Duration) {
        let mut offset = self.offset.write();
        if elapsed > *offset {
            *offset = elapsed;
        }
    }

    /// Returns the total time the clock has been advanced.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.offset.read()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.read()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{Clock, ManualClock, SystemClock};

    /// Manual Clock Sharing
    /// Clones observe advances made through any handle.
    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new();
        let other = clock.clone();
        let start = clock.now();

        other.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(250));

        assert_eq!(clock.now() - start, Duration::from_millis(500));
        assert_eq!(other.elapsed(), Duration::from_millis(500));
    }

    /// Monotonic Guard
    #[test]
    fn test_manual_clock_never_rewinds() {
        let clock = ManualClock::new();
        clock.set_elapsed(Duration::from_secs(5));
        clock.set_elapsed(Duration::from_secs(1));

        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
