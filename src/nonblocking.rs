/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{Read, Write, Result as IoResult};
use std::net::SocketAddr;
use std::num::NonZeroUsize;
use std::time::Duration;

use mio::net::TcpStream as MioTcpStream;

use log::{debug, trace};

use crate::line_buffer::LineBuffer;
use crate::multiplexer::{Multiplexer, Readiness};
use crate::socket::{into_string, State};
use crate::utilities::attempt;
use crate::{connect, Canceller, Intent, LineSocket, Result, SockConfig, SockError};

/// A line-oriented TCP socket whose I/O never blocks on the descriptor
///
/// Before every receive or send, the `NonBlockingSocket` checks whether the
/// socket is ready in one of the directions of its [`Intent`].
///
/// [`read()`](LineSocket::read()) never waits: it receives whatever is
/// available right now and returns zero if nothing is. The line reads wait
/// until the socket is ready, for at most the configured
/// [`poll timeout`](SockConfig::with_poll_timeout), but only if no complete
/// line is buffered yet; after that they drain the socket without waiting.
/// With the default *unbounded* poll timeout, a socket opened for reading only
/// therefore waits for data to arrive, while a socket opened for reading *and*
/// writing is nearly always writable, so its checks return immediately.
///
/// If `read()` fails after it has already buffered some bytes, it returns
/// their count and reports the error on the next call.
///
/// Received bytes are accumulated in an internal [`LineBuffer`], from which
/// complete lines are handed out. Note that a peer that closed the connection
/// can **not** be told apart from a peer that has nothing to send right now:
/// both make [`read()`](LineSocket::read()) return zero.
///
/// A pending readiness wait can be aborted from another thread by a
/// [`Canceller`] obtained from [`canceller()`](Self::canceller()).
#[derive(Debug)]
pub struct NonBlockingSocket {
    address: String,
    config: SockConfig,
    intent: Intent,
    state: State<MioTcpStream>,
    buffer: LineBuffer,
    multiplexer: Multiplexer,
    deferred: Option<SockError>,
}

impl NonBlockingSocket {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    pub fn canceller(&self) -> Canceller {
        self.multiplexer.canceller()
    }

    /// Clears a cancellation request, so that the socket can wait again.
    pub fn restart(&self) -> Result<bool> {
        Ok(self.multiplexer.restart()?)
    }

    /// Returns the directions of the socket's [`Intent`] that are ready now,
    /// waiting for at most the configured poll timeout if neither is.
    pub fn readiness(&mut self) -> Result<Readiness> {
        self.state.get()?;
        self.multiplexer.poll(self.intent, self.config.poll_timeout())
    }

    /// Waits for readiness unless a complete line is buffered already, then
    /// receives until nothing more is available or the buffer is full.
    fn fill(&mut self) -> Result<()> {
        if self.deferred.is_none() && !self.buffer.has_line() {
            self.multiplexer.poll(self.intent, self.config.poll_timeout())?;
        }
        let chunk_size = self.config.chunk_size();
        while self.read(chunk_size)? > 0 { }
        Ok(())
    }

    fn receive_ready(&mut self, size: NonZeroUsize, total: &mut usize) -> Result<()> {
        let stream = self.state.get_mut()?;
        loop {
            if !self.multiplexer.poll(self.intent, Some(Duration::ZERO))?.readable {
                return Ok(());
            }
            if self.buffer.is_full() {
                return match self.buffer.has_line() {
                    true => Ok(()),
                    false => Err(SockError::LineTooLong),
                };
            }
            match self.buffer.receive(size, |spare| Self::event_read(stream, spare))? {
                Some(0) => return Ok(()),
                Some(count) => {
                    trace!("Received {} byte(s) from {}", count, self.address);
                    *total += count;
                },
                None => self.multiplexer.drained(Intent::READ),
            }
        }
    }

    fn event_read(stream: &mut MioTcpStream, buffer: &mut [u8]) -> IoResult<Option<usize>> {
        attempt(|| stream.read(buffer))
    }

    fn event_write(stream: &mut MioTcpStream, buffer: &[u8]) -> IoResult<Option<usize>> {
        attempt(|| stream.write(buffer))
    }
}

impl LineSocket for NonBlockingSocket {
    fn new(address: &str, config: SockConfig) -> Result<Self> {
        Ok(Self {
            address: address.to_owned(),
            config,
            intent: Intent::default(),
            state: State::Unopened,
            buffer: LineBuffer::new(config.max_buffer()),
            multiplexer: Multiplexer::new(config.events_capacity())?,
            deferred: None,
        })
    }

    fn open(&mut self, intent: Intent) -> Result<()> {
        self.state.check_unopened()?;
        self.intent = intent;
        let stream = connect::connect_non_blocking(&mut self.multiplexer, &self.address, self.config.connect_timeout())?;
        debug!("Connected to {} ({:?} -> {:?}), intent {:?}", self.address, stream.local_addr().ok(), stream.peer_addr().ok(), intent);
        self.state = State::Open(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut stream = self.state.close()?;
        self.multiplexer.deregister(&mut stream);
        debug!("Closed the connection to {}", self.address);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn readable(&mut self) -> Result<bool> {
        self.readiness().map(|ready| ready.readable)
    }

    fn writable(&mut self) -> Result<bool> {
        self.readiness().map(|ready| ready.writable)
    }

    fn read(&mut self, size_hint: usize) -> Result<usize> {
        self.state.get()?;
        if let Some(error) = self.deferred.take() {
            return Err(error);
        }
        let size = match NonZeroUsize::new(size_hint) {
            Some(size) => size,
            None => return Ok(0),
        };

        let mut total = 0usize;
        match self.receive_ready(size, &mut total) {
            Ok(()) => Ok(total),
            Err(error) if total > 0 => {
                debug!("Deferring {:?} after {} received byte(s)", error, total);
                self.deferred = Some(error);
                Ok(total)
            },
            Err(error) => Err(error),
        }
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        Ok(self.read_lines_limit(1)?.pop())
    }

    fn read_lines(&mut self) -> Result<Vec<String>> {
        self.state.get()?;
        self.fill()?;
        Ok(self.buffer.extract_all().into_iter().map(into_string).collect())
    }

    fn read_lines_limit(&mut self, limit: usize) -> Result<Vec<String>> {
        self.state.get()?;
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.fill()?;
        Ok(self.buffer.extract_up_to(limit).into_iter().map(into_string).collect())
    }

    fn write(&mut self, data: &[u8]) -> Result<Option<usize>> {
        let stream = self.state.get_mut()?;
        if !self.intent.writable {
            return Ok(None);
        }

        let poll_timeout = self.config.poll_timeout();
        if !self.multiplexer.poll(self.intent, poll_timeout)?.writable {
            trace!("Not writable: {}", self.address);
            return Ok(None);
        }

        let mut pending = data;
        while !pending.is_empty() {
            match Self::event_write(stream, pending)? {
                Some(0) => return Err(SockError::BrokenConnection),
                Some(count) => pending = &pending[count..],
                None => {
                    self.multiplexer.drained(Intent::WRITE);
                    if !self.multiplexer.poll(Intent::WRITE, poll_timeout)?.writable {
                        return Err(SockError::TimedOut);
                    }
                },
            }
        }

        trace!("Sent {} byte(s) to {}", data.len(), self.address);
        Ok(Some(data.len()))
    }

    fn buffered(&self) -> &[u8] {
        self.buffer.data()
    }

    fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.state.get()?.peer_addr()?)
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.state.get()?.local_addr()?)
    }
}

impl Drop for NonBlockingSocket {
    fn drop(&mut self) {
        if let Ok(mut stream) = self.state.close() {
            self.multiplexer.deregister(&mut stream);
        }
    }
}
