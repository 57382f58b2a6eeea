/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::Result as IoResult;
use std::mem;
use std::num::NonZeroUsize;

use crate::{Result, SockError};

const NEWLINE: u8 = b'\n';

/// The receive buffer of a socket, which splits the received bytes into
/// newline-terminated lines
///
/// The buffer always holds exactly the bytes that were received but not yet
/// returned as part of a complete line, i.e. any number of complete lines
/// followed by, at most, one incomplete trailing fragment. Lines are returned
/// with the `'\n'` terminator stripped; a preceding `'\r'` is **not**
/// stripped.
///
/// The `LineBuffer` does not perform any I/O by itself.
#[derive(Debug, Default)]
pub struct LineBuffer {
    data: Vec<u8>,
    limit: Option<NonZeroUsize>,
}

impl LineBuffer {
    /// Creates an empty buffer that may grow up to `limit` bytes, or without
    /// bounds if `limit` is `None`.
    pub fn new(limit: Option<NonZeroUsize>) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether the buffer holds at least one complete line.
    pub fn has_line(&self) -> bool {
        self.data.contains(&NEWLINE)
    }

    /// Whether the buffer has reached its limit, so that nothing more can be
    /// received until lines are extracted.
    pub fn is_full(&self) -> bool {
        self.remaining_capacity() == 0
    }

    /// Appends `bytes` to the end of the buffer.
    ///
    /// Fails with [`SockError::LineTooLong`], leaving the buffer unchanged,
    /// if the buffer would grow beyond its limit.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.remaining_capacity() {
            return Err(SockError::LineTooLong);
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Lets `fn_recv` write up to `size` bytes straight into the end of the
    /// buffer and keeps as many bytes as it reports.
    ///
    /// `fn_recv` returns `None` if no data was available. If the buffer is
    /// already at its limit, fails with [`SockError::LineTooLong`] without
    /// calling `fn_recv`.
    pub(crate) fn receive<F>(&mut self, size: NonZeroUsize, fn_recv: F) -> Result<Option<usize>>
    where
        F: FnOnce(&mut [u8]) -> IoResult<Option<usize>>,
    {
        let size = size.get().min(self.remaining_capacity());
        if size == 0 {
            return Err(SockError::LineTooLong);
        }

        let valid_length = self.data.len();
        self.data.resize(valid_length.checked_add(size).expect("Numerical overflow!"), 0);

        let result = fn_recv(&mut self.data[valid_length..]);
        let count = match &result {
            Ok(Some(count)) => (*count).min(size),
            _ => 0,
        };

        self.data.truncate(valid_length + count);
        Ok(result?)
    }

    /// Removes the first complete line from the buffer and returns it.
    ///
    /// Returns `None`, without touching the buffer, if the buffer contains
    /// no `'\n'` at all.
    pub fn extract_one(&mut self) -> Option<Vec<u8>> {
        let position = self.data.iter().position(|byte| *byte == NEWLINE)?;
        let mut line: Vec<u8> = self.data.drain(..=position).collect();
        line.pop();
        Some(line)
    }

    /// Removes all complete lines from the buffer and returns them in order.
    ///
    /// An unterminated trailing fragment is not a line: it stays in the
    /// buffer and is not returned.
    pub fn extract_all(&mut self) -> Vec<Vec<u8>> {
        let last = match self.data.iter().rposition(|byte| *byte == NEWLINE) {
            Some(position) => position,
            None => return Vec::new(),
        };
        let complete: Vec<u8> = self.data.drain(..=last).collect();
        complete[..last].split(|byte| *byte == NEWLINE).map(<[u8]>::to_vec).collect()
    }

    /// Removes at most `limit` complete lines from the buffer.
    pub fn extract_up_to(&mut self, limit: usize) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        while lines.len() < limit {
            match self.extract_one() {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        lines
    }

    /// Empties the buffer, returning everything it held, including an
    /// incomplete trailing fragment.
    pub fn take(&mut self) -> Vec<u8> {
        mem::take(&mut self.data)
    }

    fn remaining_capacity(&self) -> usize {
        match self.limit {
            Some(limit) => limit.get().saturating_sub(self.data.len()),
            None => usize::MAX - self.data.len(),
        }
    }
}

impl From<&[u8]> for LineBuffer {
    fn from(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
            limit: None,
        }
    }
}
