/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */

/// The directions a socket is opened for
///
/// The intent governs which readiness directions the
/// [`NonBlockingSocket`](crate::NonBlockingSocket) waits for. The default
/// intent is *read-only*.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Intent {
    pub readable: bool,
    pub writable: bool,
}

impl Intent {
    pub const READ: Self = Self { readable: true, writable: false };
    pub const WRITE: Self = Self { readable: false, writable: true };
    pub const READ_WRITE: Self = Self { readable: true, writable: true };

    /// Translates a file-style mode string: `"r"`, `"w"` or `"rw"`.
    ///
    /// Any other mode is not an error; it simply yields the default intent.
    pub fn from_mode(mode: &str) -> Self {
        match mode {
            "r" => Self::READ,
            "w" => Self::WRITE,
            "rw" => Self::READ_WRITE,
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.readable || self.writable)
    }
}

impl Default for Intent {
    fn default() -> Self {
        Self::READ
    }
}

impl From<&str> for Intent {
    fn from(mode: &str) -> Self {
        Self::from_mode(mode)
    }
}
