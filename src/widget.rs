//! The formatting units a progress line is built from.
//!
//! A [`Widget`] renders one fragment of the line from a [`RenderContext`]. Most widgets
//! have a fixed width determined by their own text; the [`Widget::Bar`] is
//! [`Sizing::Expanding`] and fills whatever width the layout gives it.
//!
//! New behaviours are plugged in with [`Widget::Custom`] rather than by extending the
//! enum.

use std::{fmt, sync::Arc, time::Duration};

use compact_str::{CompactString, format_compact};

use crate::progress::RenderContext;

/// Glyphs cycled by [`Widget::Spinner`], indexed by `value mod 4`.
pub const SPINNER_GLYPHS: [char; 4] = ['/', '-', '\\', '|'];

/// Placeholder for an estimate that cannot be computed yet.
const UNKNOWN_TIME: &str = "--:--:--";

/// How a widget claims horizontal space.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Sizing {
    /// Width is the length of the rendered text.
    Fixed,
    /// Consumes the space left over by fixed widgets.
    Expanding,
}

/// Signature of a [`Widget::Custom`] renderer.
pub type RenderFn = dyn Fn(&RenderContext) -> CompactString + Send + Sync;

/// One element of a progress line.
#[derive(Clone)]
pub enum Widget {
    /// Static text, e.g. separators.
    Text(CompactString),
    /// Completion as a right-justified `NNN%`, or `N/A%` when unknown or zero.
    Percentage,
    /// `value of max`, or `value of ?` when the maximum is unknown.
    Fraction,
    /// The plain value.
    Counter,
    /// A rotating `/ - \ |` glyph keyed by the value.
    Spinner,
    /// A proportional fill, or a sliding marker in indeterminate mode. Expanding.
    Bar(BarStyle),
    /// `Elapsed Time: H:MM:SS`.
    ElapsedTime,
    /// `ETA:  H:MM:SS` while running, `Time: H:MM:SS` once finished.
    Eta,
    /// A caller-supplied fixed-width renderer.
    Custom(Arc<RenderFn>),
}

impl Widget {
    /// Wraps a closure as a [`Widget::Custom`].
    pub fn custom<F>(render: F) -> Self
    where
        F: Fn(&RenderContext) -> CompactString + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(render))
    }

    /// A bar with the default `|`, `|` and `#` glyphs.
    #[must_use]
    pub fn bar() -> Self {
        Self::Bar(BarStyle::default())
    }

    /// Returns how the widget claims space.
    #[must_use]
    pub const fn sizing(&self) -> Sizing {
        match self {
            Self::Bar(_) => Sizing::Expanding,
            _ => Sizing::Fixed,
        }
    }

    /// Renders the widget.
    ///
    /// `width` is the space allotted to an expanding widget; fixed widgets ignore it.
    #[must_use]
    pub fn render(&self, ctx: &RenderContext, width: usize) -> CompactString {
        match self {
            Self::Text(text) => text.clone(),
            Self::Percentage => render_percentage(ctx),
            Self::Fraction => match ctx.max_value() {
                Some(max_value) => format_compact!("{} of {max_value}", ctx.value()),
                None => format_compact!("{} of ?", ctx.value()),
            },
            Self::Counter => format_compact!("{}", ctx.value()),
            Self::Spinner => {
                let glyph = SPINNER_GLYPHS[ctx.spinner_phase() % SPINNER_GLYPHS.len()];
                format_compact!("{glyph}")
            }
            Self::Bar(style) => style.render(ctx, width),
            Self::ElapsedTime => format_compact!("Elapsed Time: {}", format_hms(ctx.elapsed())),
            Self::Eta => render_eta(ctx),
            Self::Custom(render) => render(ctx),
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Percentage => f.write_str("Percentage"),
            Self::Fraction => f.write_str("Fraction"),
            Self::Counter => f.write_str("Counter"),
            Self::Spinner => f.write_str("Spinner"),
            Self::Bar(style) => f.debug_tuple("Bar").field(style).finish(),
            Self::ElapsedTime => f.write_str("ElapsedTime"),
            Self::Eta => f.write_str("Eta"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<&str> for Widget {
    fn from(text: &str) -> Self {
        Self::Text(text.into())
    }
}

impl From<CompactString> for Widget {
    fn from(text: CompactString) -> Self {
        Self::Text(text)
    }
}

/// Glyphs used by [`Widget::Bar`].
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarStyle {
    /// Opening marker.
    pub left: CompactString,
    /// Closing marker.
    pub right: CompactString,
    /// Fill glyph, also used for the indeterminate marker.
    pub fill: char,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            left: CompactString::const_new("|"),
            right: CompactString::const_new("|"),
            fill: '#',
        }
    }
}

impl BarStyle {
    /// Renders the bar into exactly `width` cells, or just the markers if they do not fit.
    #[must_use]
    pub fn render(&self, ctx: &RenderContext, width: usize) -> CompactString {
        let markers = self.left.chars().count() + self.right.chars().count();
        let inner = width.saturating_sub(markers);

        let mut out = CompactString::with_capacity(width);
        out.push_str(&self.left);
        match ctx.max_value() {
            Some(max_value) => {
                let filled = fill_width(inner, ctx.value(), max_value);
                out.extend(std::iter::repeat_n(self.fill, filled));
                out.extend(std::iter::repeat_n(' ', inner - filled));
            }
            None if inner > 0 => {
                let marker = marker_position(inner, ctx.value());
                for cell in 0..inner {
                    out.push(if cell == marker { self.fill } else { ' ' });
                }
            }
            None => {}
        }
        out.push_str(&self.right);
        out
    }
}

/// `floor(inner * value / max)`, clamped to `inner`; a zero maximum is full.
#[allow(clippy::cast_possible_truncation)]
fn fill_width(inner: usize, value: u64, max_value: u64) -> usize {
    if max_value == 0 {
        return inner;
    }
    let filled = inner as u128 * u128::from(value) / u128::from(max_value);
    (filled as usize).min(inner)
}

/// The marker slides one cell per item and wraps at the right edge.
#[allow(clippy::cast_possible_truncation)]
fn marker_position(inner: usize, value: u64) -> usize {
    (value % inner as u64) as usize
}

/// Truncated integer percent; zero progress reads as `N/A%`.
#[allow(clippy::cast_possible_truncation)]
fn render_percentage(ctx: &RenderContext) -> CompactString {
    let percent = match ctx.max_value() {
        Some(0) => 100,
        Some(max_value) if ctx.value() > 0 => {
            (u128::from(ctx.value()) * 100 / u128::from(max_value)) as u64
        }
        _ => return CompactString::const_new("N/A%"),
    };
    format_compact!("{percent:>3}%")
}

fn render_eta(ctx: &RenderContext) -> CompactString {
    if ctx.finished() {
        return format_compact!("Time: {}", format_hms(ctx.elapsed()));
    }
    match ctx.eta() {
        Some(eta) => format_compact!("ETA:  {}", format_hms(eta)),
        None => format_compact!("ETA:  {UNKNOWN_TIME}"),
    }
}

/// Formats a duration as `H:MM:SS`, truncating to whole seconds. Hours are unbounded.
#[must_use]
pub fn format_hms(duration: Duration) -> CompactString {
    let secs = duration.as_secs();
    format_compact!("{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}
