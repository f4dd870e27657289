//! Scoped usage: start on entry, finish on every exit path.
//!
//! [`ProgressBar::enter`] starts the bar and returns a [`ProgressGuard`]. Dropping the
//! guard finishes the bar, which covers early returns, `?` and panics unwinding through
//! the block. Call [`ProgressGuard::exit`] to finish explicitly and see any render error;
//! errors during `Drop` can only be logged.

use std::{
    io::Write,
    ops::{Deref, DerefMut},
};

use tracing::warn;

use crate::{Error, bar::ProgressBar, clock::Clock, error::Result};

/// Keeps a [`ProgressBar`] inside a scope and finishes it when the scope ends.
#[derive(Debug)]
#[must_use = "dropping the guard finishes the bar immediately"]
pub struct ProgressGuard<'a, W: Write, C: Clock> {
    bar: &'a mut ProgressBar<W, C>,
    closed: bool,
}

impl<W: Write, C: Clock> ProgressGuard<'_, W, C> {
    /// Finishes the bar and reports whether the final render succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the sink fails.
    pub fn exit(mut self) -> Result<()> {
        self.closed = true;
        self.bar.finish()
    }
}

impl<W: Write, C: Clock> Deref for ProgressGuard<'_, W, C> {
    type Target = ProgressBar<W, C>;

    fn deref(&self) -> &Self::Target {
        self.bar
    }
}

impl<W: Write, C: Clock> DerefMut for ProgressGuard<'_, W, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.bar
    }
}

impl<W: Write, C: Clock> Drop for ProgressGuard<'_, W, C> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.bar.finish() {
            warn!(error = %err, "failed to render final progress line on scope exit");
        }
    }
}

impl<W: Write, C: Clock> ProgressBar<W, C> {
    /// Starts the bar and returns a guard that finishes it when dropped.
    ///
    /// If the bar was built without a maximum, the zero line is drawn on the first
    /// update instead, so a sequence wrapped inside the scope can still set the maximum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the initial render fails.
    pub fn enter(&mut self) -> Result<ProgressGuard<'_, W, C>> {
        self.start_deferred()?;
        Ok(ProgressGuard {
            bar: self,
            closed: false,
        })
    }

    /// Runs `body` between [`start`](Self::start) and [`finish`](Self::finish).
    ///
    /// The bar is finished however `body` ends, including an `Err` return or a panic.
    ///
    /// ```
    /// use line_progress::{ManualClock, ProgressBar};
    ///
    /// let mut bar = ProgressBar::builder()
    ///     .max_value(2)
    ///     .sink(Vec::new())
    ///     .clock(ManualClock::new())
    ///     .build();
    ///
    /// let total = bar.scope(|bar| -> Result<u32, line_progress::Error> {
    ///     let mut total = 0;
    ///     for n in bar.wrap([1, 2]) {
    ///         total += n;
    ///     }
    ///     Ok(total)
    /// })?;
    /// assert_eq!(total, 3);
    /// assert!(bar.is_finished());
    /// # Ok::<(), line_progress::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the error of `body`, or an [`Error`] from the initial or final render.
    pub fn scope<R, E, F>(&mut self, body: F) -> std::result::Result<R, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<R, E>,
        E: From<Error>,
    {
        let mut guard = self.enter()?;
        let value = body(&mut *guard)?;
        guard.exit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{AssertUnwindSafe, catch_unwind},
        time::Duration,
    };

    use crate::{Error, ManualClock, ProgressBar, error::AdvanceError};

    fn bar(max_value: u64) -> ProgressBar<Vec<u8>, ManualClock> {
        ProgressBar::builder()
            .max_value(max_value)
            .terminal_width(60)
            .min_update_interval(Duration::ZERO)
            .sink(Vec::new())
            .clock(ManualClock::new())
            .build()
    }

    fn last_line(bar: &ProgressBar<Vec<u8>, ManualClock>) -> String {
        String::from_utf8_lossy(bar.sink())
            .rsplit('\r')
            .next()
            .unwrap_or_default()
            .to_owned()
    }

    /// Guard Lifecycle
    /// Entry renders the zero line; dropping the guard renders the final one.
    #[test]
    fn test_guard_finishes_on_drop() {
        let mut bar = bar(3);
        {
            let mut guard = bar.enter().unwrap();
            assert!(last_line(&guard).starts_with("N/A% (0 of 3)"));
            guard.advance(1).unwrap();
        }

        assert!(bar.is_finished());
        assert!(last_line(&bar).starts_with(" 33% (1 of 3)"));
        assert!(last_line(&bar).ends_with("Time: 0:00:00"));
    }

    /// Early Error
    /// The body's error is returned and the bar is still finished.
    #[test]
    fn test_scope_finishes_on_error() {
        let mut bar = bar(1);
        let result: Result<(), Error> = bar.scope(|bar| {
            bar.advance(1)?;
            bar.advance(1)?;
            Ok(())
        });

        assert!(matches!(
            result,
            Err(Error::InvalidAdvance(AdvanceError::ExceedsMaximum { .. }))
        ));
        assert!(bar.is_finished());
        assert!(last_line(&bar).starts_with("100% (1 of 1)"));
    }

    /// Panic Unwind
    #[test]
    fn test_scope_finishes_on_panic() {
        let mut bar = bar(5);
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let _: Result<(), Error> = bar.scope(|bar| {
                bar.advance(2)?;
                panic!("worker failed");
            });
        }));

        assert!(outcome.is_err());
        assert!(bar.is_finished());
        assert!(last_line(&bar).starts_with(" 40% (2 of 5)"));
    }

    #[test]
    fn test_explicit_exit() {
        let mut bar = bar(2);
        let mut guard = bar.enter().unwrap();
        guard.advance(2).unwrap();
        guard.exit().unwrap();

        let finished = String::from_utf8_lossy(bar.sink())
            .matches("0:00:00 Time: ")
            .count();
        assert_eq!(finished, 1, "exit and drop must not both render");
    }

    /// Inferred Maximum
    /// Without a configured maximum the zero line waits for the wrapped sequence.
    #[test]
    fn test_scope_infers_maximum_before_first_line() {
        let mut bar = ProgressBar::builder()
            .terminal_width(60)
            .min_update_interval(Duration::ZERO)
            .sink(Vec::new())
            .clock(ManualClock::new())
            .build();
        {
            let mut guard = bar.enter().unwrap();
            assert!(guard.sink().is_empty());
            for _ in guard.wrap(0..3) {}
        }

        let output = String::from_utf8_lossy(bar.sink()).into_owned();
        let first = output
            .split('\r')
            .find(|part| !part.trim().is_empty())
            .unwrap_or_default();
        assert!(first.starts_with("N/A% (0 of 3)"), "{first}");
        assert!(last_line(&bar).starts_with("100% (3 of 3)"));
    }

    #[test]
    fn test_empty_scope_still_draws_zero_line() {
        let mut bar = ProgressBar::builder()
            .terminal_width(60)
            .sink(Vec::new())
            .clock(ManualClock::new())
            .build();
        bar.enter().unwrap().exit().unwrap();

        let output = String::from_utf8_lossy(bar.sink()).into_owned();
        let lines: Vec<&str> = output
            .split('\r')
            .filter(|part| !part.trim().is_empty())
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("/ |#"), "{}", lines[0]);
        assert!(bar.is_finished());
    }
}
