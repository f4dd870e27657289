//! # `line_progress`
//!
//! A single-line, widget-based terminal progress bar.
//!
//! `line_progress` tracks an iteration over a sequence of known or unknown length and
//! redraws one line of text (percentage, bar, spinner, elapsed time, ETA) in place.
//! It is designed to be:
//!
//! * **Inline**: no background thread; every redraw happens on the caller's thread while
//!   it advances the bar.
//! * **Throttled**: redraws are rate limited, except for the first and the final line,
//!   which are always shown.
//! * **Injectable**: the output sink is any [`std::io::Write`] and time comes from a
//!   [`Clock`], so output is fully deterministic under test.
//!
//! ```
//! use line_progress::{ManualClock, ProgressBar};
//!
//! let mut bar = ProgressBar::builder()
//!     .terminal_width(60)
//!     .sink(Vec::new())
//!     .clock(ManualClock::new())
//!     .build();
//!
//! for _item in bar.wrap(0..9) {
//!     // work
//! }
//!
//! let output = String::from_utf8(bar.into_sink()).unwrap();
//! assert!(output.ends_with("100% (9 of 9) |########| Elapsed Time: 0:00:00 Time: 0:00:00"));
//! ```
//!
//! ## Modules
//!
//! * [`bar`]: The [`ProgressBar`] driver: start, advance, finish, render.
//! * [`builder`]: Fluent construction and [`Settings`].
//! * [`clock`]: Monotonic time sources.
//! * [`error`]: The crate [`Error`] type.
//! * [`format`]: Lays widgets out into one line.
//! * [`io`]: Wrappers for [`std::io::Read`] and [`std::io::Write`] that track bytes.
//! * [`iter`]: Iterator adapters.
//! * [`progress`]: The [`ProgressState`] machine and [`RenderContext`] snapshots.
//! * [`scheduler`]: Redraw throttling.
//! * [`scope`]: Start-on-entry, finish-on-exit guards.
//! * [`widget`]: The [`Widget`] variants.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bar;
pub mod builder;
pub mod clock;
pub mod error;
pub mod format;
pub mod io;
pub mod iter;
pub mod progress;
pub mod scheduler;
pub mod scope;
pub mod widget;

pub use bar::ProgressBar;
pub use builder::{ProgressBarBuilder, Settings};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AdvanceError, Error, Result};
pub use io::{ProgressReader, ProgressWriter};
pub use iter::{ProgressIter, ProgressIteratorExt};
pub use progress::{Phase, ProgressState, RenderContext};
pub use scheduler::UpdateScheduler;
pub use scope::ProgressGuard;
pub use widget::{BarStyle, Sizing, Widget};
