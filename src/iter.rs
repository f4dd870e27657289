//! Iterator adapters for automatic progress tracking.
//!
//! [`ProgressBar::wrap`] (or [`ProgressIteratorExt::progress_with`]) decorates any
//! iterator so that pulling items drives the bar. Items are yielded unchanged.
//!
//! # Counting
//!
//! The bar's value counts *completed* items. Pulling the first item starts the bar and
//! renders the zero line; each later pull marks the previous item complete; exhaustion
//! marks the last one complete and finishes the bar with a single final render. Dropping
//! the adapter early (a `break`, a `?`, a panic) finishes the bar where it stands.
//!
//! # Heuristics
//!
//! If the bar was built without a maximum and has not advanced yet, the adapter checks
//! [`Iterator::size_hint`]:
//! * an exact bound becomes the maximum (a bounded bar),
//! * anything else keeps the bar indeterminate (the spinner layout).
//!
//! # Errors
//!
//! [`ProgressIter::try_next`] returns tracking errors directly. The [`Iterator`] impl
//! cannot, so it records the first error, logs it, stops tracking and keeps yielding
//! items; [`ProgressIter::close`] hands the recorded error back.

use std::io::Write;

use tracing::warn;

use crate::{Error, bar::ProgressBar, clock::Clock, error::Result};

/// An iterator adapter that drives a [`ProgressBar`] as items are pulled.
#[derive(Debug)]
pub struct ProgressIter<'a, I, W: Write, C: Clock> {
    iter: I,
    bar: &'a mut ProgressBar<W, C>,
    primed: bool,
    exhausted: bool,
    error: Option<Error>,
}

impl<'a, I: Iterator, W: Write, C: Clock> ProgressIter<'a, I, W, C> {
    /// Creates a new `ProgressIter`.
    ///
    /// Note: This is usually constructed via [`ProgressBar::wrap`].
    pub fn new(iter: I, bar: &'a mut ProgressBar<W, C>) -> Self {
        bar.infer_max_value(exact_len(&iter));
        Self {
            iter,
            bar,
            primed: false,
            exhausted: false,
            error: None,
        }
    }

    /// Returns the bar being driven.
    #[must_use]
    pub fn bar(&self) -> &ProgressBar<W, C> {
        self.bar
    }

    /// Pulls the next item, returning any tracking error immediately.
    ///
    /// The item that triggered an error is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAdvance`] if the iterator outruns the bar's maximum, and
    /// [`Error::Render`] if the sink fails. A previously recorded error is returned first.
    pub fn try_next(&mut self) -> Result<Option<I::Item>> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        let item = self.iter.next();
        self.track(item.is_some())?;
        Ok(item)
    }

    /// Finishes the bar and returns the first error recorded during iteration, if any.
    ///
    /// # Errors
    ///
    /// The recorded error, or [`Error::Render`] from the final render.
    pub fn close(mut self) -> Result<()> {
        self.exhausted = true;
        let finished = self.bar.finish();
        match self.error.take() {
            Some(err) => Err(err),
            None => finished,
        }
    }

    fn track(&mut self, pulled: bool) -> Result<()> {
        if self.exhausted {
            return Ok(());
        }
        if pulled {
            self.on_item()
        } else {
            self.exhausted = true;
            self.on_exhausted()
        }
    }

    fn on_item(&mut self) -> Result<()> {
        if self.primed {
            return self.bar.advance(1);
        }
        self.primed = true;
        self.bar.ensure_started()
    }

    fn on_exhausted(&mut self) -> Result<()> {
        if self.primed {
            self.bar.complete_item()?;
        } else {
            self.bar.ensure_started()?;
        }
        self.bar.finish()
    }
}

impl<I: Iterator, W: Write, C: Clock> Iterator for ProgressIter<'_, I, W, C> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.iter.next();

        if self.error.is_none()
            && let Err(err) = self.track(item.is_some())
        {
            warn!(error = %err, value = self.bar.value(), "progress tracking suspended");
            self.error = Some(err);
            // Stop tracking; the items keep flowing.
            self.exhausted = true;
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl<I, W: Write, C: Clock> Drop for ProgressIter<'_, I, W, C> {
    fn drop(&mut self) {
        if let Err(err) = self.bar.finish() {
            warn!(error = %err, "failed to render final progress line");
        }
        if let Some(err) = &self.error {
            warn!(error = %err, "progress error was never collected");
        }
    }
}

/// Extension trait to attach progress tracking to any Iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Wraps the iterator so that pulling items drives `bar`.
    fn progress_with<W: Write, C: Clock>(
        self,
        bar: &mut ProgressBar<W, C>,
    ) -> ProgressIter<'_, Self, W, C>;
}

impl<I: Iterator> ProgressIteratorExt for I {
    fn progress_with<W: Write, C: Clock>(
        self,
        bar: &mut ProgressBar<W, C>,
    ) -> ProgressIter<'_, Self, W, C> {
        ProgressIter::new(self, bar)
    }
}

impl<W: Write, C: Clock> ProgressBar<W, C> {
    /// Wraps `iterable` so that iterating it drives this bar.
    pub fn wrap<T: IntoIterator>(&mut self, iterable: T) -> ProgressIter<'_, T::IntoIter, W, C> {
        ProgressIter::new(iterable.into_iter(), self)
    }
}

/// The exact length of `iter`, if its size hint pins it down.
fn exact_len<I: Iterator>(iter: &I) -> Option<u64> {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => u64::try_from(upper).ok(),
        _ => None,
    }
}
