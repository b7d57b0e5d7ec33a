//! Transports, clocks and platforms shared by the integration tests.

#![allow(dead_code)]

use hello_iot::hello::Platform;
use hello_iot::network::{self, Close, Connect, Connection, Read, Write};
use hello_iot::system::{Clock, Delay};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::io::{Read as StdRead, Write as StdWrite};
use std::net::{Shutdown, TcpListener, TcpStream, ToSocketAddrs};
use std::rc::Rc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// What the next connection attempt gets.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Connect succeeds; the server answers with these bytes, then EOF.
    Bytes(Vec<u8>),
    /// Connect fails with this kind.
    Refuse(network::Error),
    /// Connect succeeds; every read fails with this kind.
    ReadFails(network::Error),
}

impl Reply {
    /// A complete response with a `Content-Length` matching `body`.
    pub fn status(code: u16, body: &str) -> Self {
        Reply::Bytes(
            format!(
                "HTTP/1.1 {} X\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                code,
                body.len(),
                body
            )
            .into_bytes(),
        )
    }
}

/// Shared record of everything a [`MockNet`] has seen.
#[derive(Debug, Default)]
pub struct Wire {
    pub replies: VecDeque<Reply>,
    pub connects: Vec<(String, u16, u32)>,
    pub requests: Vec<Vec<u8>>,
    pub closed: usize,
    /// Bytes handed out per read call; 0 means as many as fit.
    pub chunk: usize,
    pub fail_close: bool,
}

impl Wire {
    /// The `n`th request as text.
    pub fn request(&self, n: usize) -> String {
        String::from_utf8_lossy(&self.requests[n]).into_owned()
    }
}

/// Scripted connector. Clones share one [`Wire`].
#[derive(Debug, Clone, Default)]
pub struct MockNet {
    pub wire: Rc<RefCell<Wire>>,
}

impl MockNet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, reply: Reply) -> &Self {
        self.wire.borrow_mut().replies.push_back(reply);
        self
    }
}

impl Connect for MockNet {
    type Connection = MockConn;
    type Error = network::Error;

    fn connect(&mut self, host: &str, port: u16, timeout_ms: u32) -> Result<MockConn, network::Error> {
        let mut wire = self.wire.borrow_mut();
        wire.connects.push((host.to_owned(), port, timeout_ms));
        let (incoming, read_error) = match wire.replies.pop_front() {
            Some(Reply::Bytes(bytes)) => (bytes, None),
            Some(Reply::ReadFails(kind)) => (Vec::new(), Some(kind)),
            Some(Reply::Refuse(kind)) => return Err(kind),
            None => return Err(network::Error::ConnectionRefused),
        };
        Ok(MockConn {
            wire: Rc::clone(&self.wire),
            incoming,
            pos: 0,
            read_error,
            sent: Vec::new(),
        })
    }
}

#[derive(Debug)]
pub struct MockConn {
    wire: Rc<RefCell<Wire>>,
    incoming: Vec<u8>,
    pos: usize,
    read_error: Option<network::Error>,
    sent: Vec<u8>,
}

impl Read for MockConn {
    type Error = network::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if let Some(kind) = self.read_error {
            return Err(kind);
        }
        let chunk = match self.wire.borrow().chunk {
            0 => buf.len(),
            n => n.min(buf.len()),
        };
        let n = chunk.min(self.incoming.len() - self.pos);
        buf[..n].copy_from_slice(&self.incoming[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for MockConn {
    type Error = network::Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.sent.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for MockConn {
    type Error = network::Error;

    fn close(self) -> Result<(), Self::Error> {
        let mut wire = self.wire.borrow_mut();
        wire.requests.push(self.sent);
        wire.closed += 1;
        if wire.fail_close {
            Err(network::Error::NotOpen)
        } else {
            Ok(())
        }
    }
}

impl Connection for MockConn {}

/// Clock the test moves by hand.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(pub Rc<Cell<u64>>);

impl ManualClock {
    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

/// `std::net` transport for loopback tests.
#[derive(Debug, Default)]
pub struct StdNet;

#[derive(Debug)]
pub struct StdConn {
    stream: TcpStream,
}

fn io_kind(e: &std::io::Error, otherwise: network::Error) -> network::Error {
    match e.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => network::Error::Timeout,
        std::io::ErrorKind::ConnectionRefused => network::Error::ConnectionRefused,
        _ => otherwise,
    }
}

impl Connect for StdNet {
    type Connection = StdConn;
    type Error = network::Error;

    fn connect(&mut self, host: &str, port: u16, timeout_ms: u32) -> Result<StdConn, network::Error> {
        let addr = (host, port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.next())
            .ok_or(network::Error::InvalidAddress)?;
        let timeout = Duration::from_millis(timeout_ms.max(1).into());
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|e| io_kind(&e, network::Error::ConnectionRefused))?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(|_| network::Error::NotOpen)?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|_| network::Error::NotOpen)?;
        Ok(StdConn { stream })
    }
}

impl Read for StdConn {
    type Error = network::Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.stream
            .read(buf)
            .map_err(|e| io_kind(&e, network::Error::ReadError))
    }
}

impl Write for StdConn {
    type Error = network::Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream
            .write(buf)
            .map_err(|e| io_kind(&e, network::Error::WriteError))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream.flush().map_err(|_| network::Error::WriteError)
    }
}

impl Close for StdConn {
    type Error = network::Error;

    fn close(self) -> Result<(), Self::Error> {
        self.stream
            .shutdown(Shutdown::Both)
            .map_err(|_| network::Error::NotOpen)
    }
}

impl Connection for StdConn {}

/// Reads one request (head plus `Content-Length` body) from `stream`.
fn read_request(stream: &mut TcpStream) -> Vec<u8> {
    let mut data = Vec::new();
    let mut buf = [0u8; 512];
    let head_end = loop {
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            return data;
        }
        data.extend_from_slice(&buf[..n]);
    };
    let head = String::from_utf8_lossy(&data[..head_end]).to_string();
    let body_len = head
        .lines()
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())
        .unwrap_or(0);
    while data.len() < head_end + body_len {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
    }
    data
}

/// Serves one connection per entry in `replies`, in order, on 127.0.0.1.
///
/// Returns the port and a handle yielding the raw requests received.
pub fn serve(replies: Vec<Vec<u8>>) -> (u16, JoinHandle<Vec<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for reply in replies {
            let (mut stream, _) = listener.accept().unwrap();
            requests.push(read_request(&mut stream));
            stream.write_all(&reply).unwrap();
            let _ = stream.shutdown(Shutdown::Write);
        }
        requests
    });
    (port, handle)
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

/// A plain 200 response carrying `body`.
pub fn ok(body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}

/// Platform whose delays are recorded and advance a shared clock instead of
/// sleeping.
#[derive(Debug)]
pub struct FakeBoard {
    pub clock: ManualClock,
    pub delays: Vec<u32>,
    pub free_heap: u32,
    rng: StdRng,
}

impl FakeBoard {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            delays: Vec::new(),
            free_heap: 200 * 1024,
            rng: StdRng::seed_from_u64(7),
        }
    }
}

impl Delay for FakeBoard {
    fn delay_ms(&mut self, ms: u32) {
        self.delays.push(ms);
        self.clock.advance(ms.into());
    }
}

impl Platform for FakeBoard {
    fn uptime_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    fn free_heap(&self) -> u32 {
        self.free_heap
    }

    fn min_free_heap(&self) -> u32 {
        self.free_heap - 4096
    }

    fn total_heap(&self) -> u32 {
        320 * 1024
    }

    fn random(&mut self) -> u32 {
        self.rng.next_u32()
    }
}
