/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
#![allow(dead_code)]

use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use linesock::SockConfig;

/// Accepts exactly one connection on a loopback port and hands it to `script`
/// on a separate thread.
pub fn spawn_peer<F>(script: F) -> (String, JoinHandle<()>)
where
    F: FnOnce(TcpStream) + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind the peer listener!");
    let address = listener.local_addr().expect("Peer listener has no address!").to_string();
    let handle = thread::spawn(move || {
        let (stream, _addr) = listener.accept().expect("Peer failed to accept!");
        script(stream);
    });
    (address, handle)
}

/// An address on which nobody is listening.
pub fn closed_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind!");
    listener.local_addr().expect("Listener has no address!").to_string()
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config() -> SockConfig {
    SockConfig::default().with_connect_timeout(Some(Duration::from_secs(5)))
}

/// Gives data written on the loopback interface time to arrive.
pub fn settle() {
    thread::sleep(Duration::from_millis(50));
}

pub const WAIT: Duration = Duration::from_secs(5);
