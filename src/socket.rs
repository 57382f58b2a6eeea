/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::mem;
use std::net::SocketAddr;

use crate::{Intent, Result, SockConfig, SockError};

/// The file-like interface shared by [`BlockingSocket`](crate::BlockingSocket)
/// and [`NonBlockingSocket`](crate::NonBlockingSocket)
///
/// A socket starts out *unopened*, is connected by [`open()`](Self::open())
/// and released by [`close()`](Self::close()). Every other operation fails
/// with [`SockError::NotConnected`] unless the socket is open. A closed
/// socket can **not** be opened again.
///
/// Lines are returned without their `'\n'` terminator. Bytes that are not
/// valid UTF-8 are replaced by `U+FFFD`.
pub trait LineSocket: Sized {
    /// Creates an unopened socket for a `host:port` address. The address is
    /// not examined before [`open()`](Self::open()).
    fn new(address: &str, config: SockConfig) -> Result<Self>;

    /// Resolves the address and connects to it.
    ///
    /// Fails with [`SockError::InvalidAddress`] or
    /// [`SockError::AddressNotFound`] if the address is unusable, and with
    /// [`SockError::TimedOut`] if the connect timeout expires.
    fn open(&mut self, intent: Intent) -> Result<()>;

    /// Releases the connection.
    fn close(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    fn readable(&mut self) -> Result<bool>;

    fn writable(&mut self) -> Result<bool>;

    /// Receives data into the socket's line buffer, asking for `size_hint`
    /// bytes per receive; returns the number of bytes newly buffered.
    fn read(&mut self, size_hint: usize) -> Result<usize>;

    /// Returns the next line, or `None` if no complete line is available.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Returns all complete lines that are available.
    fn read_lines(&mut self) -> Result<Vec<String>>;

    /// Returns at most `limit` lines. A `limit` of zero returns nothing and
    /// does not perform any I/O.
    fn read_lines_limit(&mut self, limit: usize) -> Result<Vec<String>>;

    /// Sends all of `data`, returning the number of bytes sent, or `None` if
    /// the socket is not writable right now and nothing was sent.
    fn write(&mut self, data: &[u8]) -> Result<Option<usize>>;

    /// The received bytes that have not been returned as a line yet.
    fn buffered(&self) -> &[u8];

    fn peer_addr(&self) -> Result<SocketAddr>;

    fn local_addr(&self) -> Result<SocketAddr>;

    /// Iterates the lines that are available. The iteration ends as soon as
    /// no complete line can be extracted; calling `lines()` again later
    /// picks up newly received lines.
    fn lines(&mut self) -> Lines<'_, Self> {
        Lines {
            socket: self,
        }
    }
}

/// Iterator over the currently available lines of a [`LineSocket`]
#[derive(Debug)]
pub struct Lines<'a, S> {
    socket: &'a mut S,
}

impl<'a, S: LineSocket> Iterator for Lines<'a, S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.socket.read_line().transpose()
    }
}

/// Creates and opens a socket in one step.
///
/// The returned socket is closed when it is dropped.
pub fn open<S: LineSocket>(address: &str, config: SockConfig, intent: Intent) -> Result<S> {
    let mut socket = S::new(address, config)?;
    socket.open(intent)?;
    Ok(socket)
}

/// Opens a socket, passes it to `body`, and closes it again, whether `body`
/// succeeds or fails.
///
/// An error returned by `body` takes precedence over an error on close.
/// `body` may close the socket itself.
pub fn with_open<S, F, R>(address: &str, config: SockConfig, intent: Intent, body: F) -> Result<R>
where
    S: LineSocket,
    F: FnOnce(&mut S) -> Result<R>,
{
    let mut socket: S = open(address, config, intent)?;
    let result = body(&mut socket);
    let closed = match socket.is_open() {
        true => socket.close(),
        false => Ok(()),
    };
    match (result, closed) {
        (Err(error), _) => Err(error),
        (Ok(value), Ok(_)) => Ok(value),
        (Ok(_), Err(error)) => Err(error),
    }
}

/// Lifecycle of the descriptor owned by a socket
#[derive(Debug)]
pub(crate) enum State<T> {
    Unopened,
    Open(T),
    Closed,
}

impl<T> State<T> {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn get(&self) -> Result<&T> {
        match self {
            Self::Open(stream) => Ok(stream),
            _ => Err(SockError::NotConnected),
        }
    }

    pub fn get_mut(&mut self) -> Result<&mut T> {
        match self {
            Self::Open(stream) => Ok(stream),
            _ => Err(SockError::NotConnected),
        }
    }

    /// Fails unless the socket has never been opened.
    pub fn check_unopened(&self) -> Result<()> {
        match self {
            Self::Unopened => Ok(()),
            _ => Err(SockError::AlreadyOpened),
        }
    }

    /// Moves an open socket to `Closed`, handing out its descriptor.
    pub fn close(&mut self) -> Result<T> {
        match mem::replace(self, Self::Closed) {
            Self::Open(stream) => Ok(stream),
            previous => {
                *self = previous;
                Err(SockError::NotConnected)
            },
        }
    }
}

pub(crate) fn into_string(line: Vec<u8>) -> String {
    match String::from_utf8(line) {
        Ok(text) => text,
        Err(error) => String::from_utf8_lossy(error.as_bytes()).into_owned(),
    }
}
