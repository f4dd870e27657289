//! I/O wrappers that drive a bar by bytes transferred.
//!
//! [`ProgressReader`] and [`ProgressWriter`] wrap any [`Read`] or [`Write`] and advance a
//! [`ProgressBar`] by the number of bytes each call moved. Build the bar with the byte
//! count as its maximum (e.g. a file's length) to get a percentage and an ETA.
//!
//! The inner I/O result is always passed through unchanged. A tracking error (moving past
//! the declared length, a failing progress sink) cannot undo bytes that were already
//! transferred, so it is logged, recorded, and tracking stops;
//! [`take_error`](ProgressWriter::take_error) hands it back. Neither wrapper finishes the
//! bar; call [`ProgressBar::finish`] when the transfer is done.

use std::io::{self, Read, Write};

use tracing::warn;

use crate::{Error, bar::ProgressBar, clock::Clock};

/// A wrapper around [`Read`] that advances a [`ProgressBar`] by bytes read.
#[derive(Debug)]
pub struct ProgressReader<'a, R, W, C> {
    inner: R,
    bar: &'a mut ProgressBar<W, C>,
    error: Option<Error>,
}

impl<'a, R, W, C> ProgressReader<'a, R, W, C> {
    /// Creates a new `ProgressReader` wrapping `inner`.
    pub const fn new(inner: R, bar: &'a mut ProgressBar<W, C>) -> Self {
        Self {
            inner,
            bar,
            error: None,
        }
    }

    /// Returns the tracking error that stopped progress updates, if any.
    ///
    /// Tracking resumes once the error has been taken.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read, W: Write, C: Clock> Read for ProgressReader<'_, R, W, C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        track(self.bar, &mut self.error, n);
        Ok(n)
    }
}

/// A wrapper around [`Write`] that advances a [`ProgressBar`] by bytes written.
#[derive(Debug)]
pub struct ProgressWriter<'a, T, W, C> {
    inner: T,
    bar: &'a mut ProgressBar<W, C>,
    error: Option<Error>,
}

impl<'a, T, W, C> ProgressWriter<'a, T, W, C> {
    /// Creates a new `ProgressWriter` wrapping `inner`.
    pub const fn new(inner: T, bar: &'a mut ProgressBar<W, C>) -> Self {
        Self {
            inner,
            bar,
            error: None,
        }
    }

    /// Returns the tracking error that stopped progress updates, if any.
    ///
    /// Tracking resumes once the error has been taken.
    pub fn take_error(&mut self) -> Option<Error> {
        self.error.take()
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Write, W: Write, C: Clock> Write for ProgressWriter<'_, T, W, C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        track(self.bar, &mut self.error, n);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Advances `bar` by `n` bytes unless an earlier error already stopped tracking.
fn track<W: Write, C: Clock>(bar: &mut ProgressBar<W, C>, error: &mut Option<Error>, n: usize) {
    if error.is_some() || n == 0 {
        return;
    }
    let by = u64::try_from(n).unwrap_or(u64::MAX);
    if let Err(err) = bar.advance(by) {
        warn!(error = %err, bytes = n, "byte tracking suspended");
        *error = Some(err);
    }
}
