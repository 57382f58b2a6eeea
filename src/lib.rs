/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */

//! **linesock** lets you treat a TCP connection like a readable/writable
//! ***text file***: write raw bytes, and iterate the received data line by
//! line.
//!
//! Two flavours implement the same [`LineSocket`] interface, so that they
//! can be swapped freely:
//!
//! - [`linesock::BlockingSocket`](BlockingSocket) is a thin layer on top of
//!   [`std::net::TcpStream`](std::net::TcpStream). Reading a line waits until
//!   a complete line has arrived.
//! - [`linesock::NonBlockingSocket`](NonBlockingSocket) never blocks on the
//!   descriptor. Every I/O attempt is preceded by a readiness check, which is
//!   implemented with the [**`mio`**](mio) library, and received bytes are
//!   accumulated until a complete line is available. Pending readiness waits
//!   can be bounded by a timeout and aborted through a
//!   [`linesock::Canceller`](Canceller).
//!
//! Addresses are given as `host:port` strings and resolved when the socket is
//! opened. A socket is opened for reading, writing, or both, as described by
//! its [`Intent`]; the [`from_mode()`](Intent::from_mode()) function accepts
//! the familiar `"r"`, `"w"` and `"rw"` modes.
//!
//! # Usage
//!
//! ```no_run
//! use linesock::{Intent, LineSocket, NonBlockingSocket, SockConfig};
//!
//! fn main() -> linesock::Result<()> {
//!     linesock::with_open("irc.example.net:6667", SockConfig::default(), Intent::from_mode("rw"), |sock: &mut NonBlockingSocket| {
//!         sock.write(b"NICK atestbot\r\n")?;
//!         sock.write(b"USER atestbot 0 * :atestbot\r\n")?;
//!         for line in sock.lines() {
//!             println!("{}", line?.trim_end());
//!         }
//!         Ok(())
//!     })
//! }
//! ```
//!
//! # Limitations
//!
//! The non-blocking flavour can **not** detect a connection that was closed
//! orderly by the peer: reading from it simply yields no data. By default,
//! the receive buffer is unbounded and readiness waits have no timeout; see
//! [`SockConfig`] for how to limit both.

mod address;
mod blocking;
mod canceller;
mod config;
mod connect;
mod error;
mod intent;
mod line_buffer;
mod multiplexer;
mod nonblocking;
mod socket;
mod utilities;

pub use address::Endpoint;
pub use blocking::BlockingSocket;
pub use canceller::Canceller;
pub use config::{SockConfig, DEFAULT_CHUNK_SIZE, DEFAULT_CONNECT_TIMEOUT};
pub use error::{Result, SockError};
pub use intent::Intent;
pub use line_buffer::LineBuffer;
pub use multiplexer::Readiness;
pub use nonblocking::NonBlockingSocket;
pub use socket::{open, with_open, LineSocket, Lines};
