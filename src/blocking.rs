/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream as StdTcpStream};
use std::num::NonZeroUsize;

use log::debug;

use crate::line_buffer::LineBuffer;
use crate::socket::{into_string, State};
use crate::utilities::attempt;
use crate::{connect, Intent, LineSocket, Result, SockConfig};

/// A line-oriented TCP socket on top of a plain blocking
/// [`std::net::TcpStream`](std::net::TcpStream)
///
/// Only connection establishment is bounded by the
/// [`connect timeout`](SockConfig::with_connect_timeout); reads and writes
/// block for as long as the platform lets them.
///
/// Unlike the [`NonBlockingSocket`](crate::NonBlockingSocket), a line read
/// waits until a complete line has arrived, and [`read_lines()`](LineSocket::read_lines())
/// reads until the peer closes the connection. When the stream has ended, an
/// unterminated trailing fragment is returned as the last line.
#[derive(Debug)]
pub struct BlockingSocket {
    address: String,
    config: SockConfig,
    intent: Intent,
    state: State<StdTcpStream>,
    buffer: LineBuffer,
}

impl BlockingSocket {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Reads until the peer closes the connection and returns all data that
    /// has not been returned before, buffered bytes first.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let stream = self.state.get_mut()?;
        let mut data = self.buffer.take();
        stream.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Reads until the stream ends, which yields `true`, or until the buffer
    /// is full but holds complete lines, which yields `false`.
    fn read_to_eof(&mut self) -> Result<bool> {
        let chunk_size = self.config.chunk_size();
        loop {
            if self.buffer.is_full() && self.buffer.has_line() {
                return Ok(false);
            }
            if self.read(chunk_size)? == 0 {
                return Ok(true);
            }
        }
    }

    fn trailing_fragment(&mut self) -> Option<String> {
        match self.buffer.is_empty() {
            true => None,
            false => Some(into_string(self.buffer.take())),
        }
    }
}

impl LineSocket for BlockingSocket {
    fn new(address: &str, config: SockConfig) -> Result<Self> {
        Ok(Self {
            address: address.to_owned(),
            config,
            intent: Intent::default(),
            state: State::Unopened,
            buffer: LineBuffer::new(config.max_buffer()),
        })
    }

    fn open(&mut self, intent: Intent) -> Result<()> {
        self.state.check_unopened()?;
        self.intent = intent;
        let stream = connect::connect_blocking(&self.address, self.config.connect_timeout())?;
        debug!("Connected to {} ({:?} -> {:?}), intent {:?}", self.address, stream.local_addr().ok(), stream.peer_addr().ok(), intent);
        self.state = State::Open(stream);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        drop(self.state.close()?);
        debug!("Closed the connection to {}", self.address);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn readable(&mut self) -> Result<bool> {
        self.state.get()?;
        Ok(self.intent.readable)
    }

    fn writable(&mut self) -> Result<bool> {
        self.state.get()?;
        Ok(self.intent.writable)
    }

    fn read(&mut self, size_hint: usize) -> Result<usize> {
        let stream = self.state.get_mut()?;
        let size = match NonZeroUsize::new(size_hint) {
            Some(size) => size,
            None => return Ok(0),
        };
        let received = self.buffer.receive(size, |spare| attempt(|| stream.read(spare)))?;
        Ok(received.unwrap_or(0))
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        self.state.get()?;
        let chunk_size = self.config.chunk_size();
        loop {
            if let Some(line) = self.buffer.extract_one() {
                return Ok(Some(into_string(line)));
            }
            if self.read(chunk_size)? == 0 {
                return Ok(self.trailing_fragment());
            }
        }
    }

    fn read_lines(&mut self) -> Result<Vec<String>> {
        let ended = self.read_to_eof()?;
        let mut lines: Vec<String> = self.buffer.extract_all().into_iter().map(into_string).collect();
        if ended {
            lines.extend(self.trailing_fragment());
        }
        Ok(lines)
    }

    fn read_lines_limit(&mut self, limit: usize) -> Result<Vec<String>> {
        self.state.get()?;
        let mut lines = Vec::new();
        while lines.len() < limit {
            match self.read_line()? {
                Some(line) => lines.push(line),
                None => break,
            }
        }
        Ok(lines)
    }

    fn write(&mut self, data: &[u8]) -> Result<Option<usize>> {
        let stream = self.state.get_mut()?;
        stream.write_all(data)?;
        stream.flush()?;
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
