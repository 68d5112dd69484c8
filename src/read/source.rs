use std::io::{BufRead, ErrorKind};
use std::sync::{Mutex, PoisonError};

use super::{ReadError, read_line};
use crate::alloc::AllocPolicy;
use crate::buffer::OwnedBytes;

/// A source of bytes which are handed out one at a time.
///
/// Every [`BufRead`] is a `ByteSource`. Interrupted reads are retried transparently.
pub trait ByteSource {
    /// Returns the next byte, or [`None`] once the end of the input has been reached.
    ///
    /// # Errors
    /// Fails if the underlying source reports an error other than an interruption.
    fn next_byte(&mut self) -> Result<Option<u8>, ReadError>;
}

impl<R: BufRead + ?Sized> ByteSource for R {
    fn next_byte(&mut self) -> Result<Option<u8>, ReadError> {
        loop {
            let next = match self.fill_buf() {
                Ok(buf) => buf.first().copied(),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            if next.is_some() {
                self.consume(1);
            }
            return Ok(next);
        }
    }
}

/// A byte source which can be read from several threads at once. Each line is read while holding
/// the source exclusively, so lines are never interleaved.
#[derive(Debug)]
pub struct SharedSource<R> {
    inner: Mutex<R>,
}

impl<R: BufRead> SharedSource<R> {
    pub const fn new(source: R) -> SharedSource<R> {
        SharedSource {
            inner: Mutex::new(source),
        }
    }

    /// Reads the next line from the source. See [`read_line`].
    ///
    /// # Errors
    /// See [`read_line`].
    pub fn read_line(&self, policy: AllocPolicy) -> Result<Option<OwnedBytes>, ReadError> {
        // A panic in another reader can only have left a partially consumed line behind.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        read_line(&mut *guard, policy)
    }

    pub fn into_inner(self) -> R {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An iterator over the lines of a [`ByteSource`], created by [`lines`](super::lines).
///
/// Iteration ends at the end of the input, or after the first error.
#[derive(Debug)]
pub struct Lines<'a, S: ?Sized> {
    pub(crate) source: &'a mut S,
    pub(crate) policy: AllocPolicy,
    pub(crate) done: bool,
}

impl<S: ByteSource + ?Sized> Iterator for Lines<'_, S> {
    type Item = Result<OwnedBytes, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let res = read_line(&mut *self.source, self.policy).transpose();
        if !matches!(res, Some(Ok(_))) {
            self.done = true;
        }
        res
    }
}
