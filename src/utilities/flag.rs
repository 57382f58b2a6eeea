/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::Result;
use std::sync::atomic::{AtomicBool, Ordering};

use mio::Waker;

/// Cancellation state shared between a socket and its cancellers; raising
/// or clearing the flag wakes up a pending `Poll::poll()`.
#[derive(Debug)]
pub(crate) struct CancelFlag {
    waker: Waker,
    raised: AtomicBool,
}

impl CancelFlag {
    pub fn new(waker: Waker) -> Self {
        Self {
            waker,
            raised: AtomicBool::new(false),
        }
    }

    pub fn raise(&self) -> Result<bool> {
        self.swap(false, true)
    }

    pub fn clear(&self) -> Result<bool> {
        self.swap(true, false)
    }

    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    fn swap(&self, current: bool, new: bool) -> Result<bool> {
        match self.raised.compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => self.waker.wake().map(|_| true),
            Err(_) => Ok(false),
        }
    }
}
