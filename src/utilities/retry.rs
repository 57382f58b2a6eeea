/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{ErrorKind, Result as IoResult};

/// Runs a socket operation, repeating it for as long as it is interrupted.
///
/// An operation that would block yields `Ok(None)`; any other error is
/// passed through.
pub(crate) fn attempt<T, F>(mut op: F) -> IoResult<Option<T>>
where
    F: FnMut() -> IoResult<T>,
{
    loop {
        match op() {
            Ok(value) => return Ok(Some(value)),
            Err(error) => match error.kind() {
                ErrorKind::Interrupted => (),
                ErrorKind::WouldBlock => return Ok(None),
                _ => return Err(error),
            },
        }
    }
}
