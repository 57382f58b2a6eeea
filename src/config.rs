/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::num::NonZeroUsize;
use std::time::Duration;

/// Default timeout for connection establishment
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default receive size used by the line-reading functions
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

const DEFAULT_EVENTS_CAPACITY: usize = 16;

/// Settings of a [`BlockingSocket`](crate::BlockingSocket) or a
/// [`NonBlockingSocket`](crate::NonBlockingSocket)
///
/// The configuration is passed explicitly when the socket is created. The
/// defaults are:
///
/// | Setting | Default |
/// |---|---|
/// | connect timeout | 60 seconds |
/// | poll timeout | *none*, readiness waits are unbounded |
/// | chunk size | 4096 bytes |
/// | receive buffer limit | *none*, the buffer grows as needed |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SockConfig {
    connect_timeout: Option<Duration>,
    poll_timeout: Option<Duration>,
    chunk_size: NonZeroUsize,
    max_buffer: Option<NonZeroUsize>,
    events_capacity: NonZeroUsize,
}

impl Default for SockConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            poll_timeout: None,
            chunk_size: non_zero(DEFAULT_CHUNK_SIZE),
            max_buffer: None,
            events_capacity: non_zero(DEFAULT_EVENTS_CAPACITY),
        }
    }
}

impl SockConfig {
    /// Timeout for connection establishment; `None` waits for as long as the
    /// platform does.
    pub fn with_connect_timeout(self, timeout: Option<Duration>) -> Self {
        Self { connect_timeout: timeout, ..self }
    }

    /// Upper bound for every single readiness wait of the
    /// [`NonBlockingSocket`](crate::NonBlockingSocket).
    ///
    /// When a bounded wait expires, the socket is reported as neither
    /// readable nor writable. `Some(Duration::ZERO)` turns every readiness
    /// check into a pure snapshot that never waits.
    pub fn with_poll_timeout(self, timeout: Option<Duration>) -> Self {
        Self { poll_timeout: timeout, ..self }
    }

    /// Number of bytes requested per receive by the line-reading functions.
    pub fn with_chunk_size(self, chunk_size: NonZeroUsize) -> Self {
        Self { chunk_size, ..self }
    }

    /// Limits the receive buffer; receiving beyond the limit fails with
    /// [`SockError::LineTooLong`](crate::SockError::LineTooLong).
    pub fn with_max_buffer(self, limit: Option<NonZeroUsize>) -> Self {
        Self { max_buffer: limit, ..self }
    }

    pub fn with_events_capacity(self, capacity: NonZeroUsize) -> Self {
        Self { events_capacity: capacity, ..self }
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    pub fn poll_timeout(&self) -> Option<Duration> {
        self.poll_timeout
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.get()
    }

    pub fn max_buffer(&self) -> Option<NonZeroUsize> {
        self.max_buffer
    }

    pub fn events_capacity(&self) -> usize {
        self.events_capacity.get()
    }
}

const fn non_zero(value: usize) -> NonZeroUsize {
    match NonZeroUsize::new(value) {
        Some(value) => value,
        None => panic!("Value must not be zero!"),
    }
}
