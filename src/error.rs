/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::error::Error;
use std::fmt::{Display, Debug, Formatter};
use std::io::{ErrorKind, Error as IoError};

/// Result type returned by the **linesock** socket operations
pub type Result<T> = std::result::Result<T, SockError>;

/// The error type for **linesock** operations
///
/// Both socket flavours share this taxonomy, so callers can swap the
/// [`BlockingSocket`](crate::BlockingSocket) for the
/// [`NonBlockingSocket`](crate::NonBlockingSocket) without changing their
/// error handling. Platform errors that have no dedicated variant are passed
/// through "as-is" in the [`Failed`](SockError::Failed) variant.
///
/// A `SockError` converts into an [`std::io::Error`](std::io::Error) carrying
/// the `SockError` as its "inner" error, and back again, so `?` works in
/// either direction.
pub enum SockError {
    /// The host name could not be resolved, or resolved to nothing.
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::NotFound`**
    AddressNotFound(String),
    /// The address string is not of the form `host:port`, or the port is not
    /// numeric.
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::InvalidInput`**
    InvalidAddress(String),
    /// Connection establishment, or a bounded readiness wait, exceeded its
    /// timeout.
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::TimedOut`**
    TimedOut,
    /// The operation requires an open socket, but the socket was never
    /// opened or has been closed already.
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::NotConnected`**
    NotConnected,
    /// `open()` was called on a socket that is open or was closed. A socket
    /// is never re-used after it has been closed.
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::AlreadyExists`**
    AlreadyOpened,
    /// The connection was reset or broken by the peer during an I/O
    /// operation. Note that a peer which closes the connection orderly is
    /// **not** reported this way by the non-blocking read path!
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::BrokenPipe`**
    BrokenConnection,
    /// The pending readiness wait was cancelled through a
    /// [`Canceller`](crate::Canceller). Data may have been written
    /// partially!
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::Interrupted`**
    Cancelled,
    /// Appending the received data would grow the receive buffer beyond the
    /// configured [`max_buffer`](crate::SockConfig::with_max_buffer) limit.
    /// The [`kind()`](std::io::Error::kind()) of the converted error
    /// is:&ensp;**`ErrorKind::OutOfMemory`**
    LineTooLong,
    /// Any other error reported by the platform.
    Failed(IoError),
}

impl SockError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AddressNotFound(_) => ErrorKind::NotFound,
            Self::InvalidAddress(_) => ErrorKind::InvalidInput,
            Self::TimedOut => ErrorKind::TimedOut,
            Self::NotConnected => ErrorKind::NotConnected,
            Self::AlreadyOpened => ErrorKind::AlreadyExists,
            Self::BrokenConnection => ErrorKind::BrokenPipe,
            Self::Cancelled => ErrorKind::Interrupted,
            Self::LineTooLong => ErrorKind::OutOfMemory,
            Self::Failed(inner) => inner.kind(),
        }
    }

    /// Copies a variant back out of a wrapping `std::io::Error`.
    fn duplicate(&self) -> Self {
        match self {
            Self::AddressNotFound(host) => Self::AddressNotFound(host.clone()),
            Self::InvalidAddress(address) => Self::InvalidAddress(address.clone()),
            Self::TimedOut => Self::TimedOut,
            Self::NotConnected => Self::NotConnected,
            Self::AlreadyOpened => Self::AlreadyOpened,
            Self::BrokenConnection => Self::BrokenConnection,
            Self::Cancelled => Self::Cancelled,
            Self::LineTooLong => Self::LineTooLong,
            Self::Failed(inner) => Self::Failed(IoError::new(inner.kind(), inner.to_string())),
        }
    }
}

impl From<IoError> for SockError {
    fn from(error: IoError) -> Self {
        match error.kind() {
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe => Self::BrokenConnection,
            ErrorKind::TimedOut => Self::TimedOut,
            _ => match error.get_ref().and_then(|inner| inner.downcast_ref::<SockError>()) {
                Some(sock_error) => sock_error.duplicate(),
                None => Self::Failed(error),
            },
        }
    }
}

impl From<SockError> for IoError {
    fn from(error: SockError) -> Self {
        match error {
            SockError::Failed(inner) => inner,
            other => IoError::new(other.kind(), other),
        }
    }
}

impl Debug for SockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddressNotFound(host) => write!(f, "SockError::AddressNotFound({:?})", host),
            Self::InvalidAddress(address) => write!(f, "SockError::InvalidAddress({:?})", address),
            Self::TimedOut => write!(f, "SockError::TimedOut"),
            Self::NotConnected => write!(f, "SockError::NotConnected"),
            Self::AlreadyOpened => write!(f, "SockError::AlreadyOpened"),
            Self::BrokenConnection => write!(f, "SockError::BrokenConnection"),
            Self::Cancelled => write!(f, "SockError::Cancelled"),
            Self::LineTooLong => write!(f, "SockError::LineTooLong"),
            Self::Failed(inner) => write!(f, "SockError::Failed({:?})", inner),
        }
    }
}

impl Display for SockError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddressNotFound(host) => write!(f, "Could not resolve the address {:?}!", host),
            Self::InvalidAddress(address) => write!(f, "The address {:?} is not of the form host:port!", address),
            Self::TimedOut => write!(f, "The socket operation timed out!"),
            Self::NotConnected => write!(f, "The socket is not connected!"),
            Self::AlreadyOpened => write!(f, "The socket has been opened before!"),
            Self::BrokenConnection => write!(f, "The connection was broken by the peer!"),
            Self::Cancelled => write!(f, "The socket operation was cancelled!"),
            Self::LineTooLong => write!(f, "The receive buffer exceeds its limit!"),
            Self::Failed(inner) => write!(f, "The socket operation failed: {}", inner),
        }
    }
}

impl Error for SockError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Failed(inner) => Some(inner),
            _ => None,
        }
    }
}
