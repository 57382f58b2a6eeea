/*
 * linesock - Line-oriented TCP sockets, blocking and non-blocking
 * This is free and unencumbered software released into the public domain.
 */
mod common;

use std::io::{ErrorKind, Read, Write};
use std::num::NonZeroUsize;
use std::thread;
use std::time::{Duration, Instant};

use linesock::{Intent, LineSocket, NonBlockingSocket, SockError};

use common::{closed_address, config, init_logger, settle, spawn_peer, WAIT};

fn assert_not_connected<T: std::fmt::Debug>(result: linesock::Result<T>) {
    match result {
        Err(SockError::NotConnected) => (),
        other => panic!("expected NotConnected, got {:?}", other),
    }
}

#[test]
fn unopened_socket_is_not_connected() {
    let mut sock = NonBlockingSocket::new("127.0.0.1:1", config()).unwrap();
    assert!(!sock.is_open());
    assert_not_connected(sock.read(64));
    assert_not_connected(sock.read_line());
    assert_not_connected(sock.read_lines());
    assert_not_connected(sock.read_lines_limit(0));
    assert_not_connected(sock.read_lines_limit(3));
    assert_not_connected(sock.write(b"data\n"));
    assert_not_connected(sock.readable());
    assert_not_connected(sock.writable());
    assert_not_connected(sock.readiness());
    assert_not_connected(sock.peer_addr());
    assert_not_connected(sock.local_addr());
    assert_not_connected(sock.close());
}

#[test]
fn open_rejects_bad_addresses() {
    init_logger();
    let mut sock = NonBlockingSocket::new("localhost", config()).unwrap();
    assert!(matches!(sock.open(Intent::READ), Err(SockError::InvalidAddress(_))));

    let mut sock = NonBlockingSocket::new("no-such-host.invalid:6667", config()).unwrap();
    assert!(matches!(sock.open(Intent::READ), Err(SockError::AddressNotFound(_))));
}

#[test]
fn open_refused_connection_fails() {
    init_logger();
    let mut sock = NonBlockingSocket::new(&closed_address(), config()).unwrap();
    match sock.open(Intent::READ_WRITE) {
        Err(error) => assert_eq!(error.kind(), ErrorKind::ConnectionRefused),
        Ok(_) => panic!("connected to a closed port"),
    }
    assert!(!sock.is_open());
}

#[test]
fn socket_is_never_reopened() {
    init_logger();
    let (address, peer) = spawn_peer(|_stream| ());
    let mut sock = NonBlockingSocket::new(&address, config()).unwrap();
    sock.open(Intent::READ_WRITE).unwrap();
    assert!(sock.is_open());
    assert!(matches!(sock.open(Intent::READ_WRITE), Err(SockError::AlreadyOpened)));

    sock.close().unwrap();
    assert!(!sock.is_open());
    assert_not_connected(sock.close());
    assert_not_connected(sock.read_line());
    assert!(matches!(sock.open(Intent::READ_WRITE), Err(SockError::AlreadyOpened)));
    peer.join().unwrap();
}

#[test]
fn addresses_of_open_socket() {
    init_logger();
    let (address, peer) = spawn_peer(|_stream| ());
    let sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ_WRITE).unwrap();
    assert_eq!(sock.peer_addr().unwrap().to_string(), address);
    assert!(sock.local_addr().unwrap().ip().is_loopback());
    assert_eq!(sock.intent(), Intent::READ_WRITE);
    assert_eq!(sock.address(), address);
    drop(sock);
    peer.join().unwrap();
}

#[test]
fn read_reports_newly_buffered_bytes() {
    init_logger();
    let (written_tx, written_rx) = crossbeam_channel::bounded(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"0123456789").unwrap();
        written_tx.send(()).unwrap();
        let _ = done_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ_WRITE).unwrap();
    written_rx.recv_timeout(WAIT).unwrap();
    settle();

    assert_eq!(sock.read(64).unwrap(), 10);
    assert_eq!(sock.buffered(), b"0123456789");
    assert_eq!(sock.read(64).unwrap(), 0);
    assert_eq!(sock.buffered(), b"0123456789");
    assert_eq!(sock.read(0).unwrap(), 0);

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn read_line_waits_for_the_terminator() {
    init_logger();
    let (step_tx, step_rx) = crossbeam_channel::bounded(1);
    let (next_tx, next_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"PING :ab").unwrap();
        step_tx.send(()).unwrap();
        next_rx.recv().unwrap();
        stream.write_all(b"c\r\nNICK x\r\n").unwrap();
        step_tx.send(()).unwrap();
        let _ = next_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ_WRITE).unwrap();
    step_rx.recv_timeout(WAIT).unwrap();
    settle();
    assert_eq!(sock.read_line().unwrap(), None);
    assert_eq!(sock.buffered(), b"PING :ab");

    next_tx.send(()).unwrap();
    step_rx.recv_timeout(WAIT).unwrap();
    settle();
    assert_eq!(sock.read_line().unwrap(), Some("PING :abc\r".to_owned()));
    assert_eq!(sock.buffered(), b"NICK x\r\n");
    assert_eq!(sock.read_lines().unwrap(), vec!["NICK x\r".to_owned()]);
    assert!(sock.buffered().is_empty());
    assert_eq!(sock.read_line().unwrap(), None);

    next_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn read_lines_limit() {
    init_logger();
    let (written_tx, written_rx) = crossbeam_channel::bounded(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"a\nb\nc\n").unwrap();
        written_tx.send(()).unwrap();
        let _ = done_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ_WRITE).unwrap();
    written_rx.recv_timeout(WAIT).unwrap();
    settle();

    assert!(sock.read_lines_limit(0).unwrap().is_empty());
    assert!(sock.buffered().is_empty());

    assert_eq!(sock.read_lines_limit(1).unwrap(), vec!["a".to_owned()]);
    assert_eq!(sock.buffered(), b"b\nc\n");
    assert_eq!(sock.read_lines_limit(5).unwrap(), vec!["b".to_owned(), "c".to_owned()]);
    assert!(sock.read_lines_limit(5).unwrap().is_empty());

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn lines_iterator_ends_at_fragment() {
    init_logger();
    let (written_tx, written_rx) = crossbeam_channel::bounded(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"one\n\ntwo\nthr").unwrap();
        written_tx.send(()).unwrap();
        let _ = done_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ_WRITE).unwrap();
    written_rx.recv_timeout(WAIT).unwrap();
    settle();

    let lines: Vec<String> = sock.lines().collect::<linesock::Result<_>>().unwrap();
    assert_eq!(lines, vec!["one".to_owned(), "".to_owned(), "two".to_owned()]);
    assert_eq!(sock.buffered(), b"thr");
    assert_eq!(sock.lines().count(), 0);

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn write_sends_everything() {
    init_logger();
    let (data_tx, data_rx) = crossbeam_channel::bounded(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        let mut data = vec![0u8; 10 + 65536];
        stream.read_exact(&mut data).unwrap();
        data_tx.send(data).unwrap();
    });

    let large = vec![b'x'; 65536];
    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ_WRITE).unwrap();
    assert!(sock.writable().unwrap());
    assert_eq!(sock.write(b"NICK bot\r\n").unwrap(), Some(10));
    assert_eq!(sock.write(&large).unwrap(), Some(65536));

    let data = data_rx.recv_timeout(WAIT).unwrap();
    assert_eq!(&data[..10], b"NICK bot\r\n");
    assert!(data[10..].iter().all(|byte| *byte == b'x'));
    peer.join().unwrap();
}

#[test]
fn write_without_write_intent_is_refused() {
    init_logger();
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |_stream| {
        let _ = done_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::from_mode("r")).unwrap();
    let started = Instant::now();
    for _ in 0..3 {
        assert_eq!(sock.write(b"QUIT\r\n").unwrap(), None);
    }
    assert!(started.elapsed() < WAIT);

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn bounded_poll_reports_not_readable() {
    init_logger();
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |_stream| {
        let _ = done_rx.recv();
    });

    let config = config().with_poll_timeout(Some(Duration::from_millis(50)));
    let mut sock: NonBlockingSocket = linesock::open(&address, config, Intent::READ).unwrap();
    assert!(!sock.readable().unwrap());
    assert!(!sock.writable().unwrap());
    assert_eq!(sock.read(64).unwrap(), 0);
    assert_eq!(sock.read_line().unwrap(), None);

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn canceller_aborts_pending_wait() {
    init_logger();
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |_stream| {
        let _ = done_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ).unwrap();
    let canceller = sock.canceller();
    let cancel_thread = thread::spawn(move || {
        thread::sleep(Duration::from_millis(100));
        canceller.cancel().unwrap()
    });

    assert!(matches!(sock.read_line(), Err(SockError::Cancelled)));
    assert!(cancel_thread.join().unwrap());
    assert!(sock.canceller().cancelled());
    assert!(matches!(sock.read(64), Err(SockError::Cancelled)));
    assert!(matches!(sock.read_line(), Err(SockError::Cancelled)));

    assert!(sock.restart().unwrap());
    assert!(!sock.canceller().cancelled());

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn buffer_limit_is_enforced() {
    init_logger();
    let (written_tx, written_rx) = crossbeam_channel::bounded(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"0123456789abcdef").unwrap();
        written_tx.send(()).unwrap();
        let _ = done_rx.recv();
    });

    let config = config().with_max_buffer(NonZeroUsize::new(8));
    let mut sock: NonBlockingSocket = linesock::open(&address, config, Intent::READ_WRITE).unwrap();
    written_rx.recv_timeout(WAIT).unwrap();
    settle();

    assert!(matches!(sock.read_line(), Err(SockError::LineTooLong)));
    assert_eq!(sock.buffered(), b"01234567");

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn read_returns_count_before_reporting_error() {
    init_logger();
    let (written_tx, written_rx) = crossbeam_channel::bounded(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"0123456789abcdef").unwrap();
        written_tx.send(()).unwrap();
        let _ = done_rx.recv();
    });

    let config = config().with_max_buffer(NonZeroUsize::new(8));
    let mut sock: NonBlockingSocket = linesock::open(&address, config, Intent::READ_WRITE).unwrap();
    written_rx.recv_timeout(WAIT).unwrap();
    settle();

    assert_eq!(sock.read(64).unwrap(), 8);
    assert_eq!(sock.buffered(), b"01234567");
    assert!(matches!(sock.read(64), Err(SockError::LineTooLong)));
    assert!(matches!(sock.read(64), Err(SockError::LineTooLong)));
    assert_eq!(sock.buffered(), b"01234567");

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn full_buffer_still_serves_complete_lines() {
    init_logger();
    let (written_tx, written_rx) = crossbeam_channel::bounded(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"ab\ncd\nef\ngh\n").unwrap();
        written_tx.send(()).unwrap();
        let _ = done_rx.recv();
    });

    let config = config().with_max_buffer(NonZeroUsize::new(8));
    let mut sock: NonBlockingSocket = linesock::open(&address, config, Intent::READ).unwrap();
    written_rx.recv_timeout(WAIT).unwrap();
    settle();

    for expected in ["ab", "cd", "ef", "gh"] {
        assert_eq!(sock.read_line().unwrap(), Some(expected.to_owned()));
    }
    assert!(sock.buffered().is_empty());
    assert_eq!(sock.read(64).unwrap(), 0);

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn read_only_socket_reads_without_waiting() {
    init_logger();
    let (written_tx, written_rx) = crossbeam_channel::bounded(1);
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"0123456789").unwrap();
        written_tx.send(()).unwrap();
        let _ = done_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::from_mode("r")).unwrap();
    written_rx.recv_timeout(WAIT).unwrap();
    settle();

    let started = Instant::now();
    assert_eq!(sock.read(64).unwrap(), 10);
    assert_eq!(sock.read(64).unwrap(), 0);
    assert_eq!(sock.read(64).unwrap(), 0);
    assert_eq!(sock.buffered(), b"0123456789");
    assert!(started.elapsed() < WAIT);

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn read_only_socket_returns_line_while_peer_stays_connected() {
    init_logger();
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        stream.write_all(b"hello\n").unwrap();
        let _ = done_rx.recv();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::from_mode("r")).unwrap();
    assert_eq!(sock.read_line().unwrap(), Some("hello".to_owned()));
    assert!(sock.buffered().is_empty());
    assert_eq!(sock.read(64).unwrap(), 0);

    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn write_reports_not_writable_while_send_buffer_is_full() {
    init_logger();
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let (address, peer) = spawn_peer(move |_stream| {
        let _ = done_rx.recv();
    });

    let config = config().with_poll_timeout(Some(Duration::from_millis(50)));
    let mut sock: NonBlockingSocket = linesock::open(&address, config, Intent::WRITE).unwrap();
    let flood = vec![b'x'; 32 * 1024 * 1024];
    assert!(matches!(sock.write(&flood), Err(SockError::TimedOut)));

    for _ in 0..3 {
        assert_eq!(sock.write(b"QUIT\r\n").unwrap(), None);
    }
    assert!(!sock.writable().unwrap());

    drop(sock);
    done_tx.send(()).unwrap();
    peer.join().unwrap();
}

#[test]
fn closed_peer_reads_as_no_data() {
    init_logger();
    let (address, peer) = spawn_peer(|mut stream| {
        stream.write_all(b"bye\n").unwrap();
    });

    let mut sock: NonBlockingSocket = linesock::open(&address, config(), Intent::READ_WRITE).unwrap();
    peer.join().unwrap();
    settle();

    assert_eq!(sock.read_lines().unwrap(), vec!["bye".to_owned()]);
    assert_eq!(sock.read(64).unwrap(), 0);
    assert_eq!(sock.read_line().unwrap(), None);
    sock.close().unwrap();
}

#[test]
fn with_open_closes_the_socket() {
    init_logger();
    let (data_tx, data_rx) = crossbeam_channel::bounded(1);
    let (address, peer) = spawn_peer(move |mut stream| {
        let mut data = Vec::new();
        stream.read_to_end(&mut data).unwrap();
        data_tx.send(data).unwrap();
    });

    let sent = linesock::with_open(&address, config(), Intent::READ_WRITE, |sock: &mut NonBlockingSocket| {
        sock.write(b"JOIN #x\r\n")
    }).unwrap();
    assert_eq!(sent, Some(9));

    assert_eq!(data_rx.recv_timeout(WAIT).unwrap(), b"JOIN #x\r\n".to_vec());
    peer.join().unwrap();
}

#[test]
fn with_open_reports_body_error() {
    init_logger();
    let (address, peer) = spawn_peer(|mut stream| {
        let mut data = Vec::new();
        let _ = stream.read_to_end(&mut data);
    });

    let result: linesock::Result<()> = linesock::with_open(&address, config(), Intent::READ, |sock: &mut NonBlockingSocket| {
        sock.close()?;
        Err(SockError::BrokenConnection)
    });
    assert!(matches!(result, Err(SockError::BrokenConnection)));
    peer.join().unwrap();
}
