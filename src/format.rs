//! Lays an ordered list of widgets out into one line.
//!
//! Fixed widgets are rendered first and their widths summed. Whatever remains of the
//! terminal width is split between the expanding widgets (in practice, the bar), with any
//! remainder going to the first one. When the fixed widgets alone are wider than the
//! terminal, they are still rendered in full and expanding widgets get zero width.

use crate::{progress::RenderContext, widget::Sizing, widget::Widget};

/// The default layout for a bar with a known maximum:
///
/// ```text
///  11% (1 of 9) |#        | Elapsed Time: 0:00:00 ETA:  0:00:01
/// ```
#[must_use]
pub fn bounded_widgets() -> Vec<Widget> {
    vec![
        Widget::Percentage,
        " (".into(),
        Widget::Fraction,
        ") ".into(),
        Widget::bar(),
        " ".into(),
        Widget::ElapsedTime,
        " ".into(),
        Widget::Eta,
    ]
}

/// The default layout for indeterminate progress:
///
/// ```text
/// - | #                              | 1 Elapsed Time: 0:00:00
/// ```
#[must_use]
pub fn indeterminate_widgets() -> Vec<Widget> {
    vec![
        Widget::Spinner,
        " ".into(),
        Widget::bar(),
        " ".into(),
        Widget::Counter,
        " ".into(),
        Widget::ElapsedTime,
    ]
}

/// Picks the default layout for the given maximum.
#[must_use]
pub fn default_widgets(max_value: Option<u64>) -> Vec<Widget> {
    match max_value {
        Some(_) => bounded_widgets(),
        None => indeterminate_widgets(),
    }
}

/// Width of a rendered fragment in terminal cells.
pub(crate) fn display_width(text: &str) -> usize {
    text.chars().count()
}

/// Renders `widgets` against `ctx` into a single line sized for `ctx.terminal_width()`.
#[must_use]
pub fn render_line(widgets: &[Widget], ctx: &RenderContext) -> String {
    let mut fragments = Vec::with_capacity(widgets.len());
    let mut fixed_width = 0;
    let mut expanding = 0;

    for widget in widgets {
        match widget.sizing() {
            Sizing::Fixed => {
                let fragment = widget.render(ctx, 0);
                fixed_width += display_width(&fragment);
                fragments.push(Some(fragment));
            }
            Sizing::Expanding => {
                expanding += 1;
                fragments.push(None);
            }
        }
    }

    let remaining = ctx.terminal_width().saturating_sub(fixed_width);
    let (share, mut extra) = if expanding == 0 {
        (0, 0)
    } else {
        (remaining / expanding, remaining % expanding)
    };

    let mut line = String::with_capacity(ctx.terminal_width().max(fixed_width));
    for (widget, fragment) in widgets.iter().zip(fragments) {
        match fragment {
            Some(fragment) => line.push_str(&fragment),
            None => {
                let width = share + extra;
                extra = 0;
                line.push_str(&widget.render(ctx, width));
            }
        }
    }
    line
}
