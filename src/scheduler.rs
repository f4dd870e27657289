//! Redraw throttling.
//!
//! Tight loops can advance a bar far faster than a terminal (or a pseudo-terminal behind
//! a CI log) can absorb redraws. [`UpdateScheduler`] lets an ordinary update through only
//! when the minimum interval has passed since the previous render. Forced renders (start
//! and finish) bypass it but still count as the latest render.

use std::time::Duration;

use web_time::Instant;

/// Default minimum time between two unforced renders.
pub const DEFAULT_MIN_UPDATE_INTERVAL: Duration = Duration::from_millis(50);

/// Decides whether an update should be rendered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct UpdateScheduler {
    min_interval: Duration,
    last_render: Option<Instant>,
}

impl UpdateScheduler {
    /// Creates a scheduler with the given minimum interval.
    ///
    /// A zero interval renders every update.
    #[must_use]
    pub const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_render: None,
        }
    }

    /// Returns the configured minimum interval.
    #[must_use]
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Returns when the last render happened.
    #[must_use]
    pub const fn last_render(&self) -> Option<Instant> {
        self.last_render
    }

    /// Returns `true` if an unforced render is due at `now`.
    ///
    /// The boundary is inclusive: exactly `min_interval` after the last render is due.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_render
            .is_none_or(|last| now.saturating_duration_since(last) >= self.min_interval)
    }

    /// Records that a render happened at `now`.
    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_UPDATE_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use web_time::Instant;

    use super::UpdateScheduler;

    /// Throttle Window
    /// First render is always due; later ones wait for the interval.
    #[test]
    fn test_throttle_window() {
        let t0 = Instant::now();
        let mut scheduler = UpdateScheduler::new(Duration::from_millis(100));
        assert!(scheduler.is_due(t0));

        scheduler.mark_rendered(t0);
        assert!(!scheduler.is_due(t0 + Duration::from_millis(99)));
        assert!(scheduler.is_due(t0 + Duration::from_millis(100)));
        assert_eq!(scheduler.last_render(), Some(t0));
    }

    #[test]
    fn test_zero_interval_always_due() {
        let t0 = Instant::now();
        let mut scheduler = UpdateScheduler::new(Duration::ZERO);
        scheduler.mark_rendered(t0);
        assert!(scheduler.is_due(t0));
    }
}
