//! The progress bar driver.
//!
//! A [`ProgressBar`] owns the [`ProgressState`], the widget layout, the output sink and the
//! clock. Every mutation goes through it so it can decide, inline and on the calling
//! thread, whether the line needs to be redrawn.
//!
//! # Wire Format
//!
//! Each render writes `"\r"`, enough spaces to blank the terminal width (or the longest
//! line drawn so far, if that is wider), another `"\r"`, and finally the new line. The
//! sink is flushed after every render.

use std::io::{Stderr, Write};

use tracing::{debug, trace};
use web_time::Instant;

use crate::{
    builder::{ProgressBarBuilder, Settings},
    clock::{Clock, SystemClock},
    error::Result,
    format::{default_widgets, display_width, render_line},
    progress::{Phase, ProgressState},
    scheduler::UpdateScheduler,
    widget::Widget,
};

/// A single-line progress indicator.
///
/// ```
/// use line_progress::{ManualClock, ProgressBar};
///
/// let mut bar = ProgressBar::builder()
///     .max_value(3)
///     .terminal_width(40)
///     .sink(Vec::new())
///     .clock(ManualClock::new())
///     .build();
///
/// for _ in bar.wrap(["a", "b", "c"]) {}
///
/// let output = String::from_utf8(bar.into_sink()).unwrap();
/// assert!(output.ends_with("100% (3 of 3) || Elapsed Time: 0:00:00 Time: 0:00:00"));
/// ```
#[derive(Debug)]
pub struct ProgressBar<W = Stderr, C = SystemClock> {
    pub(crate) state: ProgressState,
    /// Whether the maximum may still be taken from a wrapped iterator.
    pub(crate) infer_max: bool,
    pub(crate) widgets: Option<Vec<Widget>>,
    pub(crate) settings: Settings,
    pub(crate) scheduler: UpdateScheduler,
    /// Longest line rendered so far, in cells.
    pub(crate) longest_line: usize,
    /// Started, but the zero line waits until the maximum is settled.
    pub(crate) initial_draw_pending: bool,
    pub(crate) sink: W,
    pub(crate) clock: C,
}

impl ProgressBar {
    /// Creates a bar with a known maximum, writing to standard error.
    #[must_use]
    pub fn new_bar(max_value: u64) -> Self {
        ProgressBarBuilder::new().max_value(max_value).build()
    }

    /// Creates an indeterminate bar (spinner layout), writing to standard error.
    #[must_use]
    pub fn new_spinner() -> Self {
        ProgressBarBuilder::new().unknown_max().build()
    }

    /// Starts a [`ProgressBarBuilder`].
    #[must_use]
    pub fn builder() -> ProgressBarBuilder {
        ProgressBarBuilder::new()
    }
}

impl<W: Write, C: Clock> ProgressBar<W, C> {
    /// Starts timing and renders the initial line.
    ///
    /// A second call resets the timing and renders again. Once finished this does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`](crate::Error::Render) if the sink fails.
    pub fn start(&mut self) -> Result<()> {
        if self.state.is_finished() {
            return Ok(());
        }
        let now = self.clock.now();
        self.state.start(now);
        debug!(
            max_value = ?self.state.max_value(),
            value = self.state.value(),
            "progress started"
        );
        self.draw(now)
    }

    /// Starts timing, but holds the zero line back while a wrapped iterator may still
    /// supply the maximum. The line is drawn by the next update, pull or finish.
    pub(crate) fn start_deferred(&mut self) -> Result<()> {
        if !self.infer_max {
            return self.start();
        }
        if self.state.is_finished() {
            return Ok(());
        }
        self.state.start(self.clock.now());
        self.initial_draw_pending = true;
        Ok(())
    }

    /// Advances the value by `by` and renders if the update interval has passed.
    ///
    /// Starts the bar first if it was never started.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAdvance`](crate::Error::InvalidAdvance) if the bar is
    /// finished or the maximum would be exceeded, and
    /// [`Error::Render`](crate::Error::Render) if the sink fails.
    pub fn advance(&mut self, by: u64) -> Result<()> {
        self.ensure_started()?;
        let now = self.clock.now();
        self.state.advance(by, now)?;
        self.draw_if_due(now)
    }

    /// Moves the value to an absolute position and renders if due.
    ///
    /// # Errors
    ///
    /// As [`advance`](Self::advance); additionally the value may not move backwards.
    pub fn update(&mut self, value: u64) -> Result<()> {
        self.ensure_started()?;
        let now = self.clock.now();
        self.state.set_value(value, now)?;
        self.draw_if_due(now)
    }

    /// Finishes the bar and renders the final line.
    ///
    /// Only the first call has any effect; the final line is written exactly once,
    /// regardless of the update interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`](crate::Error::Render) if the sink fails. The bar is
    /// finished either way.
    pub fn finish(&mut self) -> Result<()> {
        if self.initial_draw_pending && !self.state.is_finished() {
            self.draw(self.clock.now())?;
        }
        let now = self.clock.now();
        if !self.state.finish(now) {
            return Ok(());
        }
        debug!(
            value = self.state.value(),
            elapsed = ?self.state.elapsed(now),
            rate = ?self.state.rate(now),
            "progress finished"
        );
        self.draw(now)?;
        if self.settings.newline_on_finish {
            self.sink.write_all(b"\n")?;
            self.sink.flush()?;
        }
        Ok(())
    }

    /// Redraws the current line now, ignoring the update interval.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`](crate::Error::Render) if the sink fails.
    pub fn render(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.draw(now)
    }

    /// Returns the line that would be rendered now, without writing it.
    #[must_use]
    pub fn current_line(&self) -> String {
        self.format(self.clock.now())
    }

    /// Starts the bar if needed and draws a zero line that is still owed.
    pub(crate) fn ensure_started(&mut self) -> Result<()> {
        if self.state.phase() == Phase::Created {
            self.start()
        } else if self.initial_draw_pending {
            self.draw(self.clock.now())
        } else {
            Ok(())
        }
    }

    /// Counts one more item without rendering. The caller renders right after.
    pub(crate) fn complete_item(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.state.advance(1, now)?;
        Ok(())
    }

    /// Adopts `len` as the maximum if none was configured and nothing has happened yet.
    pub(crate) fn infer_max_value(&mut self, len: Option<u64>) {
        if !self.infer_max || self.state.value() > 0 || self.state.is_finished() {
            return;
        }
        self.infer_max = false;
        if let Some(len) = len {
            debug!(max_value = len, "inferred maximum from iterator length");
            self.state.set_max_value(Some(len));
        }
    }

    fn draw_if_due(&mut self, now: Instant) -> Result<()> {
        if self.scheduler.is_due(now) {
            self.draw(now)
        } else {
            trace!(
                value = self.state.value(),
                interval = ?self.scheduler.min_interval(),
                "render throttled"
            );
            Ok(())
        }
    }

    fn format(&self, now: Instant) -> String {
        let ctx = self.state.context(now, self.settings.terminal_width);
        match &self.widgets {
            Some(widgets) => render_line(widgets, &ctx),
            None => render_line(&default_widgets(self.state.max_value()), &ctx),
        }
    }

    fn draw(&mut self, now: Instant) -> Result<()> {
        let line = self.format(now);
        let erase = self.settings.terminal_width.max(self.longest_line);
        write!(self.sink, "\r{:erase$}\r{line}", "")?;
        self.sink.flush()?;

        self.longest_line = self.longest_line.max(display_width(&line));
        self.initial_draw_pending = false;
        self.scheduler.mark_rendered(now);
        Ok(())
    }
}

impl<W, C> ProgressBar<W, C> {
    /// Returns the current value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.state.value()
    }

    /// Returns the maximum, or `None` in indeterminate mode.
    #[must_use]
    pub const fn max_value(&self) -> Option<u64> {
        self.state.max_value()
    }

    /// Returns `true` once the bar has finished.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Returns the underlying state.
    #[must_use]
    pub const fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Returns the scalar settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the output sink.
    #[must_use]
    pub const fn sink(&self) -> &W {
        &self.sink
    }

    /// Returns the clock.
    #[must_use]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Consumes the bar and returns the output sink.
    #[must_use]
    pub fn into_sink(self) -> W {
        self.sink
    }
}
