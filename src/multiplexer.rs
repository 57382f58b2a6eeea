/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{ErrorKind, Result as IoResult};
use std::sync::Arc;
use std::time::Duration;

use mio::{Events, Interest, Poll, Token, Waker};
use mio::net::TcpStream as MioTcpStream;

use log::{trace, warn};

use crate::utilities::{CancelFlag, Timeout};
use crate::{Canceller, Intent, Result, SockError};

const STREAM: Token = Token(0);
const SHUTDOWN: Token = Token(usize::MAX);

/// A snapshot of the directions in which a socket can currently perform I/O
/// without blocking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub readable: bool,
    pub writable: bool,
}

impl Readiness {
    pub const NONE: Self = Self { readable: false, writable: false };

    pub fn any(&self) -> bool {
        self.readable || self.writable
    }

    fn filter(self, intent: Intent) -> Self {
        Self {
            readable: self.readable && intent.readable,
            writable: self.writable && intent.writable,
        }
    }
}

/// Waits for readiness of exactly one registered stream
///
/// `mio` reports readiness *edges*, so the multiplexer remembers the last
/// reported readiness of the stream until an I/O attempt on the stream
/// returns `WouldBlock` and the owner calls [`drained()`](Self::drained()).
#[derive(Debug)]
pub(crate) struct Multiplexer {
    poll: Poll,
    events: Events,
    cancelled: Arc<CancelFlag>,
    ready: Readiness,
    registered: bool,
}

impl Multiplexer {
    pub fn new(capacity: usize) -> IoResult<Self> {
        let poll = Poll::new()?;
        let waker = Waker::new(poll.registry(), SHUTDOWN)?;
        Ok(Self {
            poll,
            events: Events::with_capacity(capacity),
            cancelled: Arc::new(CancelFlag::new(waker)),
            ready: Readiness::NONE,
            registered: false,
        })
    }

    pub fn canceller(&self) -> Canceller {
        Canceller::from(self.cancelled.clone())
    }

    pub fn cancelled(&self) -> bool {
        self.cancelled.is_raised()
    }

    pub fn restart(&self) -> IoResult<bool> {
        self.cancelled.clear()
    }

    pub fn register(&mut self, stream: &mut MioTcpStream) -> IoResult<()> {
        self.poll.registry().register(stream, STREAM, Interest::READABLE | Interest::WRITABLE)?;
        self.ready = Readiness::NONE;
        self.registered = true;
        Ok(())
    }

    pub fn deregister(&mut self, stream: &mut MioTcpStream) {
        if let Err(error) = self.poll.registry().deregister(stream) {
            warn!("Failed to de-register: {:?}", error);
        }
        self.ready = Readiness::NONE;
        self.registered = false;
    }

    /// Forgets the remembered readiness of the given direction(s), after the
    /// stream has reported `WouldBlock`.
    pub fn drained(&mut self, direction: Intent) {
        self.ready.readable &= !direction.readable;
        self.ready.writable &= !direction.writable;
    }

    /// Returns which of the directions in `intent` are ready.
    ///
    /// Returns immediately if at least one of them is ready already;
    /// otherwise waits until one becomes ready, or until the `timeout`
    /// expires, in which case [`Readiness::NONE`] is returned. An empty
    /// `intent` never waits.
    pub fn poll(&mut self, intent: Intent, timeout: Option<Duration>) -> Result<Readiness> {
        if !self.registered {
            return Err(SockError::NotConnected);
        }
        if self.cancelled() {
            return Err(SockError::Cancelled);
        }

        self.collect(Some(Duration::ZERO))?;
        let timeout = Timeout::start(timeout);

        loop {
            let snapshot = self.ready.filter(intent);
            if snapshot.any() || intent.is_empty() {
                trace!("Ready: {:?}", snapshot);
                return Ok(snapshot);
            }
            if timeout.expired() {
                trace!("Readiness wait for {:?} has expired", intent);
                return Ok(Readiness::NONE);
            }
            self.collect(timeout.remaining_time())?;
            if self.cancelled() {
                return Err(SockError::Cancelled);
            }
        }
    }

    fn collect(&mut self, timeout: Option<Duration>) -> Result<()> {
        match self.poll.poll(&mut self.events, timeout) {
            Ok(_) => (),
            Err(error) if error.kind() == ErrorKind::Interrupted => return Ok(()),
            Err(error) => return Err(error.into()),
        }
        for event in self.events.iter().filter(|event| event.token() == STREAM) {
            if event.is_readable() || event.is_read_closed() || event.is_error() {
                self.ready.readable = true;
            }
            if event.is_writable() || event.is_write_closed() || event.is_error() {
                self.ready.writable = true;
            }
        }
        Ok(())
    }
}
