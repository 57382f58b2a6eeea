/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::io::{ErrorKind, Error as IoError, Result as IoResult};
use std::net::{SocketAddr, TcpStream as StdTcpStream};
use std::time::Duration;

use mio::net::TcpStream as MioTcpStream;

use log::debug;

use crate::multiplexer::Multiplexer;
use crate::utilities::{attempt, Timeout};
use crate::{Endpoint, Intent, Result, SockError};

/// Parses and resolves a `host:port` address.
pub(crate) fn resolve(address: &str) -> Result<(Endpoint, Vec<SocketAddr>)> {
    let endpoint: Endpoint = address.parse()?;
    let addrs = endpoint.resolve()?;
    Ok((endpoint, addrs))
}

// ~~~~~~~~~~~~~~~~~~~~~~~
// Blocking
// ~~~~~~~~~~~~~~~~~~~~~~~

/// Connects a blocking stream to the first address of `address` that accepts
/// the connection; each attempt may take up to `timeout`.
pub(crate) fn connect_blocking(address: &str, timeout: Option<Duration>) -> Result<StdTcpStream> {
    let (endpoint, addrs) = resolve(address)?;
    try_each(&endpoint, addrs, |addr| {
        let result = match timeout {
            Some(duration) if !duration.is_zero() => StdTcpStream::connect_timeout(&addr, duration),
            _ => StdTcpStream::connect(addr),
        };
        result.map_err(connect_error)
    })
}

fn connect_error(error: IoError) -> SockError {
    match error.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => SockError::TimedOut,
        _ => error.into(),
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~
// Non-blocking
// ~~~~~~~~~~~~~~~~~~~~~~~

/// Connects a non-blocking stream and leaves it registered with the
/// `multiplexer`.
pub(crate) fn connect_non_blocking(multiplexer: &mut Multiplexer, address: &str, timeout: Option<Duration>) -> Result<MioTcpStream> {
    let (endpoint, addrs) = resolve(address)?;
    try_each(&endpoint, addrs, |addr| {
        let mut stream = MioTcpStream::connect(addr)?;
        multiplexer.register(&mut stream)?;
        match await_connected(multiplexer, &mut stream, timeout) {
            Ok(_) => Ok(stream),
            Err(error) => {
                multiplexer.deregister(&mut stream);
                Err(error)
            },
        }
    })
}

fn await_connected(multiplexer: &mut Multiplexer, stream: &mut MioTcpStream, timeout: Option<Duration>) -> Result<()> {
    let timeout = Timeout::start(timeout);

    loop {
        let ready = multiplexer.poll(Intent::WRITE, timeout.remaining_time())?;
        if ready.writable {
            match is_connected(stream) {
                Ok(true) => return Ok(()),
                Ok(_) => multiplexer.drained(Intent::WRITE),
                Err(error) => return Err(error.into()),
            }
        }
        if timeout.expired() {
            return Err(SockError::TimedOut);
        }
    }
}

fn is_connected(stream: &MioTcpStream) -> IoResult<bool> {
    if let Some(error) = stream.take_error()? {
        return Err(error);
    }
    match attempt(|| stream.peer_addr()) {
        Ok(peer) => Ok(peer.is_some()),
        Err(error) if error.kind() == ErrorKind::NotConnected => Ok(false),
        Err(error) => Err(error),
    }
}

fn try_each<T, F>(endpoint: &Endpoint, addrs: Vec<SocketAddr>, mut fn_connect: F) -> Result<T>
where
    F: FnMut(SocketAddr) -> Result<T>,
{
    let mut last_error = None;
    for addr in addrs {
        debug!("Connecting to {} via {}", endpoint, addr);
        match fn_connect(addr) {
            Ok(value) => return Ok(value),
            Err(SockError::Cancelled) => return Err(SockError::Cancelled),
            Err(error) => {
                debug!("Connection to {} has failed: {:?}", addr, error);
                last_error = Some(error);
            },
        }
    }
    Err(last_error.unwrap_or_else(|| SockError::AddressNotFound(endpoint.to_string())))
}
