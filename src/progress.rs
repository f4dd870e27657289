//! Core progress state and the snapshots handed to widgets.
//!
//! [`ProgressState`] is a small state machine:
//!
//! ```text
//! Created --start/advance--> Started --advance--> Started --finish--> Finished
//! ```
//!
//! Nothing leaves `Finished`. The state never reads a clock itself; every operation that
//! needs the time takes `now` explicitly, which keeps it trivially testable.
//!
//! # Snapshots
//!
//! Rendering never touches the state directly. [`ProgressState::context`] produces a
//! [`RenderContext`], an owned, immutable view from which every derived metric
//! (percentage, ETA, spinner phase) can be computed.

use std::time::Duration;

use web_time::Instant;

use crate::error::AdvanceError;

/// Number of frames in the spinner glyph cycle.
pub(crate) const SPINNER_FRAMES: u64 = 4;

/// Lifecycle phase of a [`ProgressState`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Phase {
    /// Constructed, timing not yet started.
    #[default]
    Created,
    /// Timing started; the value may still advance.
    Started,
    /// Terminal; the value is frozen.
    Finished,
}

/// Count and timing state of one progress indicator.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProgressState {
    value: u64,
    max_value: Option<u64>,
    start: Option<Instant>,
    last_update: Option<Instant>,
    stopped: Option<Instant>,
    finished: bool,
}

impl ProgressState {
    /// Creates a state with the given maximum (`None` for indeterminate progress).
    #[must_use]
    pub const fn new(max_value: Option<u64>) -> Self {
        Self {
            value: 0,
            max_value,
            start: None,
            last_update: None,
            stopped: None,
            finished: false,
        }
    }

    /// Records `now` as the start time.
    ///
    /// Calling it again resets the timing (start and last update) but keeps the value.
    /// Has no effect once finished.
    pub fn start(&mut self, now: Instant) {
        if self.finished {
            return;
        }
        self.start = Some(now);
        self.last_update = Some(now);
    }

    /// Increments the value by `by`, starting the timer if needed.
    ///
    /// # Errors
    ///
    /// Fails if the state is finished, if the result overflows, or if it would exceed a
    /// known maximum. The value is left untouched on failure.
    pub fn advance(&mut self, by: u64, now: Instant) -> Result<(), AdvanceError> {
        if self.finished {
            return Err(AdvanceError::Finished);
        }
        let requested = self
            .value
            .checked_add(by)
            .ok_or(AdvanceError::Overflow {
                current: self.value,
                by,
            })?;
        self.store(requested, now)
    }

    /// Sets the value to an absolute position, which may not move backwards.
    ///
    /// # Errors
    ///
    /// Same as [`advance`](Self::advance), plus [`AdvanceError::Backwards`].
    pub fn set_value(&mut self, value: u64, now: Instant) -> Result<(), AdvanceError> {
        if self.finished {
            return Err(AdvanceError::Finished);
        }
        if value < self.value {
            return Err(AdvanceError::Backwards {
                requested: value,
                current: self.value,
            });
        }
        self.store(value, now)
    }

    fn store(&mut self, requested: u64, now: Instant) -> Result<(), AdvanceError> {
        if let Some(max_value) = self.max_value
            && requested > max_value
        {
            return Err(AdvanceError::ExceedsMaximum {
                requested,
                max_value,
            });
        }
        if self.start.is_none() {
            self.start = Some(now);
        }
        self.value = requested;
        self.last_update = Some(now);
        Ok(())
    }

    /// Marks the state finished and freezes the elapsed time at `now`.
    ///
    /// Returns `true` on the transition, `false` if it was already finished.
    pub fn finish(&mut self, now: Instant) -> bool {
        if self.finished {
            return false;
        }
        if self.start.is_none() {
            self.start = Some(now);
        }
        self.stopped = Some(now);
        self.finished = true;
        true
    }

    /// Replaces the maximum. Only valid before the value has moved.
    pub(crate) fn set_max_value(&mut self, max_value: Option<u64>) {
        debug_assert!(self.value == 0 && !self.finished);
        self.max_value = max_value;
    }

    /// Returns the current value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Returns the maximum, or `None` in indeterminate mode.
    #[must_use]
    pub const fn max_value(&self) -> Option<u64> {
        self.max_value
    }

    /// Returns the recorded start time.
    #[must_use]
    pub const fn start_time(&self) -> Option<Instant> {
        self.start
    }

    /// Returns the time of the last value change (or start).
    #[must_use]
    pub const fn last_update(&self) -> Option<Instant> {
        self.last_update
    }

    /// Returns `true` once [`finish`](Self::finish) has been called.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if self.finished {
            Phase::Finished
        } else if self.start.is_some() {
            Phase::Started
        } else {
            Phase::Created
        }
    }

    /// Time since start, frozen at the finish time once finished.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.start, self.stopped) {
            (Some(start), Some(stopped)) => stopped.saturating_duration_since(start),
            (Some(start), None) => now.saturating_duration_since(start),
            (None, _) => Duration::ZERO,
        }
    }

    /// Completion in percent, `None` when the maximum is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        percentage_of(self.value, self.max_value)
    }

    /// Estimated time remaining, `None` when it cannot be estimated or once finished.
    #[must_use]
    pub fn eta(&self, now: Instant) -> Option<Duration> {
        if self.finished {
            return None;
        }
        estimate_remaining(self.elapsed(now), self.value, self.max_value)
    }

    /// Average throughput in items per second.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate(&self, now: Instant) -> Option<f64> {
        let secs = self.elapsed(now).as_secs_f64();
        (secs > 0.0).then(|| self.value as f64 / secs)
    }

    /// Takes a snapshot for rendering.
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn context(&self, now: Instant, terminal_width: usize) -> RenderContext {
        RenderContext {
            value: self.value,
            max_value: self.max_value,
            elapsed: self.elapsed(now),
            now,
            spinner_phase: (self.value % SPINNER_FRAMES) as usize,
            terminal_width,
            finished: self.finished,
        }
    }
}

/// A plain-data view of a [`ProgressState`] at one instant.
///
/// Widgets are pure functions of this snapshot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderContext {
    value: u64,
    max_value: Option<u64>,
    elapsed: Duration,
    now: Instant,
    spinner_phase: usize,
    terminal_width: usize,
    finished: bool,
}

impl RenderContext {
    /// Returns the current value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.value
    }

    /// Returns the maximum, or `None` in indeterminate mode.
    #[must_use]
    pub const fn max_value(&self) -> Option<u64> {
        self.max_value
    }

    /// Returns the elapsed time (total time once finished).
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Returns the instant the snapshot was taken.
    #[must_use]
    pub const fn now(&self) -> Instant {
        self.now
    }

    /// Returns the spinner frame index, `value mod 4`.
    #[must_use]
    pub const fn spinner_phase(&self) -> usize {
        self.spinner_phase
    }

    /// Returns the width the line is laid out for.
    #[must_use]
    pub const fn terminal_width(&self) -> usize {
        self.terminal_width
    }

    /// Returns whether the progress has finished.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.finished
    }

    /// Completion in percent, `None` when the maximum is unknown.
    #[must_use]
    pub fn percentage(&self) -> Option<f64> {
        percentage_of(self.value, self.max_value)
    }

    /// Estimated time remaining, `None` when unknown or finished.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        if self.finished {
            return None;
        }
        estimate_remaining(self.elapsed, self.value, self.max_value)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage_of(value: u64, max_value: Option<u64>) -> Option<f64> {
    match max_value? {
        0 => Some(100.0),
        max_value => Some(value as f64 / max_value as f64 * 100.0),
    }
}

/// `elapsed * (max - value) / value`, in integer nanoseconds.
fn estimate_remaining(elapsed: Duration, value: u64, max_value: Option<u64>) -> Option<Duration> {
    let max_value = max_value?;
    if value == 0 {
        return None;
    }
    let remaining = u128::from(max_value.saturating_sub(value));
    let nanos = elapsed.as_nanos() * remaining / u128::from(value);
    Some(Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX)))
}
