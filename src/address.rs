/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::fmt::{Display, Formatter};
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use log::debug;

use crate::{Result, SockError};

/// A remote `host:port` pair
///
/// The host may be a name, an IPv4 address, or an IPv6 address enclosed in
/// square brackets (`[::1]:6667`). Resolution happens in
/// [`resolve()`](Endpoint::resolve()), not during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.to_owned(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolves the endpoint into all of its socket addresses.
    ///
    /// Fails with [`SockError::AddressNotFound`] if the lookup fails or
    /// yields no address at all.
    pub fn resolve(&self) -> Result<Vec<SocketAddr>> {
        let host = self.host.trim_start_matches('[').trim_end_matches(']');
        let addrs: Vec<SocketAddr> = match (host, self.port).to_socket_addrs() {
            Ok(iter) => iter.collect(),
            Err(error) => {
                debug!("Lookup of {} has failed: {:?}", self, error);
                return Err(SockError::AddressNotFound(self.to_string()));
            },
        };
        debug!("Resolved {} to {:?}", self, addrs);
        match addrs.is_empty() {
            true => Err(SockError::AddressNotFound(self.to_string())),
            false => Ok(addrs),
        }
    }
}

impl FromStr for Endpoint {
    type Err = SockError;

    fn from_str(address: &str) -> Result<Self> {
        let invalid = || SockError::InvalidAddress(address.to_owned());
        let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() || (host.contains(':') && !(host.starts_with('[') && host.ends_with(']'))) {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self::new(host, port))
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}
