//! Fluent interface for constructing [`ProgressBar`] instances.
//!
//! Simple bars can be created with [`ProgressBar::new_bar`] or
//! [`ProgressBar::new_spinner`], which write to standard error and read the system clock.
//! The [`ProgressBarBuilder`] exposes everything else.
//!
//! # Key Features
//!
//! * **Injected I/O:** any [`Write`] implementation can be the sink, so tests capture
//!   output in a `Vec<u8>`.
//! * **Injected Time:** any [`Clock`] can drive timing; [`ManualClock`](crate::ManualClock)
//!   makes rendered timers and throttling deterministic.
//! * **Plain Settings:** the scalar options live in [`Settings`], which can be loaded from
//!   configuration files when the `serde` feature is enabled.

use std::{
    io::{self, Stderr, Write},
    time::Duration,
};

use crate::{
    bar::ProgressBar,
    clock::{Clock, SystemClock},
    progress::ProgressState,
    scheduler::{DEFAULT_MIN_UPDATE_INTERVAL, UpdateScheduler},
    widget::Widget,
};

/// Default layout width when none is configured.
pub const DEFAULT_TERMINAL_WIDTH: usize = 80;

/// Scalar options of a [`ProgressBar`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Settings {
    /// Width the line is laid out for. Not detected; the caller supplies it.
    pub terminal_width: usize,
    /// Minimum time between two unforced renders.
    pub min_update_interval: Duration,
    /// Write a newline after the final render so later output starts on a fresh line.
    pub newline_on_finish: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            terminal_width: DEFAULT_TERMINAL_WIDTH,
            min_update_interval: DEFAULT_MIN_UPDATE_INTERVAL,
            newline_on_finish: false,
        }
    }
}

/// How the maximum of the bar is determined.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum MaxValue {
    /// Taken from the first wrapped iterator if it reports an exact length.
    #[default]
    Inferred,
    Known(u64),
    Unknown,
}

/// A builder pattern for constructing [`ProgressBar`] instances.
#[derive(Debug)]
pub struct ProgressBarBuilder<W = Stderr, C = SystemClock> {
    max_value: MaxValue,
    settings: Settings,
    widgets: Option<Vec<Widget>>,
    sink: W,
    clock: C,
}

impl ProgressBarBuilder {
    /// Starts a builder writing to standard error with the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_value: MaxValue::default(),
            settings: Settings::default(),
            widgets: None,
            sink: io::stderr(),
            clock: SystemClock,
        }
    }
}

impl Default for ProgressBarBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<W, C> ProgressBarBuilder<W, C> {
    /// Sets a known maximum value.
    #[must_use]
    pub const fn max_value(mut self, max_value: u64) -> Self {
        self.max_value = MaxValue::Known(max_value);
        self
    }

    /// Forces indeterminate mode, even for iterators that report their length.
    #[must_use]
    pub const fn unknown_max(mut self) -> Self {
        self.max_value = MaxValue::Unknown;
        self
    }

    /// Sets the layout width.
    #[must_use]
    pub const fn terminal_width(mut self, terminal_width: usize) -> Self {
        self.settings.terminal_width = terminal_width;
        self
    }

    /// Sets the minimum time between two unforced renders.
    #[must_use]
    pub const fn min_update_interval(mut self, interval: Duration) -> Self {
        self.settings.min_update_interval = interval;
        self
    }

    /// Writes a newline after the final render.
    #[must_use]
    pub const fn newline_on_finish(mut self, newline: bool) -> Self {
        self.settings.newline_on_finish = newline;
        self
    }

    /// Replaces all scalar settings at once.
    #[must_use]
    pub const fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets an explicit widget list instead of the default layouts.
    #[must_use]
    pub fn widgets(mut self, widgets: impl IntoIterator<Item = Widget>) -> Self {
        self.widgets = Some(widgets.into_iter().collect());
        self
    }

    /// Sets the output sink.
    #[must_use]
    pub fn sink<S: Write>(self, sink: S) -> ProgressBarBuilder<S, C> {
        ProgressBarBuilder {
            max_value: self.max_value,
            settings: self.settings,
            widgets: self.widgets,
            sink,
            clock: self.clock,
        }
    }

    /// Sets the time source.
    #[must_use]
    pub fn clock<T: Clock>(self, clock: T) -> ProgressBarBuilder<W, T> {
        ProgressBarBuilder {
            max_value: self.max_value,
            settings: self.settings,
            widgets: self.widgets,
            sink: self.sink,
            clock,
        }
    }
}

impl<W: Write, C: Clock> ProgressBarBuilder<W, C> {
    /// Consumes the builder and returns the constructed [`ProgressBar`].
    #[must_use]
    pub fn build(self) -> ProgressBar<W, C> {
        let (max_value, infer_max) = match self.max_value {
            MaxValue::Inferred => (None, true),
            MaxValue::Known(max_value) => (Some(max_value), false),
            MaxValue::Unknown => (None, false),
        };

        ProgressBar {
            state: ProgressState::new(max_value),
            infer_max,
            widgets: self.widgets,
            settings: self.settings,
            scheduler: UpdateScheduler::new(self.settings.min_update_interval),
            longest_line: 0,
            initial_draw_pending: false,
            sink: self.sink,
            clock: self.clock,
        }
    }
}
