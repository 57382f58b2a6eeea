/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::Result;
use std::sync::Arc;

use crate::utilities::CancelFlag;

/// A canceller that can be used to abort a pending readiness wait
///
/// Each `Canceller` instance is tied to one
/// [`NonBlockingSocket`](crate::NonBlockingSocket). Calling the
/// [`cancel()`](Canceller::cancel()) function wakes up the socket's pending
/// readiness wait, if any, which then fails with an
/// [`SockError::Cancelled`](crate::SockError::Cancelled) error. Unlike the
/// socket, the `Canceller` *can* be moved across the thread boundary, e.g.
/// into a Ctrl+C (SIGINT) handler.
///
/// Every subsequent operation of the socket that needs to wait for
/// readiness fails as well, until the socket is
/// [`restart()`](crate::NonBlockingSocket::restart())ed. Operations that
/// already started transferring data may still complete.
#[derive(Debug, Clone)]
pub struct Canceller {
    flag: Arc<CancelFlag>,
}

impl Canceller {
    pub(crate) fn from(flag: Arc<CancelFlag>) -> Self {
        Self {
            flag,
        }
    }

    /// Requests cancellation; returns `false` if it was requested already.
    pub fn cancel(&self) -> Result<bool> {
        self.flag.raise()
    }

    pub fn cancelled(&self) -> bool {
        self.flag.is_raised()
    }
}
