/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
use std::{env, thread, time::Duration};

use linesock::{Intent, LineSocket, NonBlockingSocket, SockConfig, SockError};

use lazy_static::lazy_static;
use log::{debug, info, warn, error};
use regex::Regex;

const DEFAULT_SERVER: &str = "irc.libera.chat:6667";
const NICK: &str = "linesockbot";
const CHANNEL: &str = "#linesock";
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    /* Initialize the log output */
    env_logger::init_from_env(env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"));

    /* Print logo */
    info!("linesock - Example IRC Client [Version {}]", PKG_VERSION);

    let server = env::args().nth(1).unwrap_or_else(|| DEFAULT_SERVER.to_owned());
    let config = SockConfig::default().with_poll_timeout(Some(Duration::from_secs(1)));

    /* Open the socket */
    info!("Connecting to server: {}", server);
    let mut sock: NonBlockingSocket = match linesock::open(&server, config, Intent::from_mode("rw")) {
        Ok(sock) => sock,
        Err(error) => return error!("Failed to connect: {}", error),
    };
    info!("Connected: {:?} -> {:?}", sock.local_addr().ok(), sock.peer_addr().ok());

    /* Register Canceller with Ctrl+C handler */
    let canceller = sock.canceller();
    ctrlc::set_handler(move || {
        warn!("Shutdown has been requested!");
        canceller.cancel().expect("Failed to cancel operation!");
    })
    .expect("Failed to register CTRL+C handler!");

    match chat(&mut sock) {
        Ok(_) => info!("Successfully connected & joined. Quitting."),
        Err(SockError::Cancelled) => warn!("Cancelled!"),
        Err(error) => error!("Conversation has failed: {}", error),
    }

    if let Err(error) = sock.close() {
        error!("Failed to close the socket: {}", error);
    }

    /* Bye! */
    info!("That's it, goodbye!");
}

fn chat(sock: &mut NonBlockingSocket) -> linesock::Result<()> {
    send(sock, &format!("NICK {}\r\n", NICK))?;
    send(sock, &format!("USER {} 0 * :{}\r\n", NICK, NICK))?;
    send(sock, &format!("JOIN {}\r\n", CHANNEL))?;

    loop {
        let lines = sock.read_lines()?;
        if lines.is_empty() {
            thread::sleep(Duration::from_millis(100));
            continue;
        }
        for line in lines {
            let line = line.trim_end();
            info!("{}", line);
            if let Some(token) = ping_token(line) {
                send(sock, &format!("PONG :{}\r\n", token))?;
            }
            if end_of_names(line) {
                return Ok(());
            }
        }
    }
}

fn send(sock: &mut NonBlockingSocket, message: &str) -> linesock::Result<()> {
    loop {
        match sock.write(message.as_bytes())? {
            Some(count) => {
                debug!("Sent {} byte(s): {:?}", count, message);
                return Ok(());
            },
            None => thread::sleep(Duration::from_millis(100)),
        }
    }
}

fn ping_token(line: &str) -> Option<&str> {
    lazy_static! {
        static ref PING: Regex = Regex::new(r"^PING :?(\S+)").expect("Failed to create regex!");
    }
    PING.captures(line).and_then(|cap| cap.get(1)).map(|token| token.as_str())
}

fn end_of_names(line: &str) -> bool {
    lazy_static! {
        static ref END_OF_NAMES: Regex = Regex::new(r"^:\S+ 366 ").expect("Failed to create regex!");
    }
    END_OF_NAMES.is_match(line) || line.contains("End of /NAMES list")
}
