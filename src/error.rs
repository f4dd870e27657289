//! Error types for progress tracking and rendering.
//!
//! Two things can go wrong while a bar is driven: the caller advances it in a way the
//! state machine does not allow, or the output sink refuses the rendered line. Both are
//! surfaced to the caller as they happen; nothing is retried.

use std::io;

use thiserror::Error;

/// Errors that can happen while driving a [`ProgressBar`](crate::ProgressBar).
#[derive(Error, Debug)]
pub enum Error {
    /// The requested change to the progress value is not allowed.
    ///
    /// This indicates a logic error in the caller, such as an iterable that is longer
    /// than the declared maximum, or an update to a bar that has already finished.
    #[error("invalid advance: {0}")]
    InvalidAdvance(#[from] AdvanceError),

    /// Writing or flushing the rendered line to the output sink failed.
    #[error("failed to render progress line")]
    Render {
        /// The underlying sink error.
        #[from]
        source: io::Error,
    },
}

/// The reason an advance of the progress value was rejected.
#[derive(Error, Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdvanceError {
    /// The bar has already finished; no further mutation is permitted.
    #[error("progress has already finished")]
    Finished,

    /// The resulting value would be larger than the known maximum.
    #[error("value {requested} exceeds the maximum of {max_value}")]
    ExceedsMaximum {
        /// The value the caller asked for.
        requested: u64,
        /// The configured maximum.
        max_value: u64,
    },

    /// An absolute update tried to move the value backwards.
    #[error("value {requested} is below the current value {current}")]
    Backwards {
        /// The value the caller asked for.
        requested: u64,
        /// The value before the update.
        current: u64,
    },

    /// The increment does not fit in a `u64`.
    #[error("advancing {current} by {by} overflows")]
    Overflow {
        /// The value before the advance.
        current: u64,
        /// The requested increment.
        by: u64,
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
