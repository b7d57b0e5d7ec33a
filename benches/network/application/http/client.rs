use criterion::{BatchSize, Criterion, Throughput};
use hello_iot::hello::message::{Snapshot, compose};
use hello_iot::hello::{HelloApp, HelloConfig, Platform};
use hello_iot::network::application::http::{Client, Config};
use hello_iot::network::{self, Close, Connect, Connection, Read, Write};
use hello_iot::system::{Clock, Delay};
use std::hint::black_box;

/// Connector whose every connection answers with the same canned response.
struct Canned {
    reply: Vec<u8>,
}

impl Canned {
    fn new(body_len: usize) -> Self {
        let mut reply = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n",
            body_len
        )
        .into_bytes();
        reply.resize(reply.len() + body_len, b'a');
        Self { reply }
    }
}

struct CannedConnection {
    reply: Vec<u8>,
    pos: usize,
    written: usize,
}

impl Read for CannedConnection {
    type Error = network::Error;
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.reply.len() - self.pos);
        buf[..n].copy_from_slice(&self.reply[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl Write for CannedConnection {
    type Error = network::Error;
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.written += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for CannedConnection {
    type Error = network::Error;
    fn close(self) -> Result<(), Self::Error> {
        black_box(self.written);
        Ok(())
    }
}

impl Connection for CannedConnection {}

impl Connect for Canned {
    type Connection = CannedConnection;
    type Error = network::Error;
    fn connect(&mut self, _: &str, _: u16, _: u32) -> Result<CannedConnection, network::Error> {
        Ok(CannedConnection {
            reply: self.reply.clone(),
            pos: 0,
            written: 0,
        })
    }
}

struct Frozen;

impl Clock for Frozen {
    fn now_ms(&self) -> u64 {
        42
    }
}

struct Board;

impl Delay for Board {
    fn delay_ms(&mut self, _ms: u32) {}
}

impl Platform for Board {
    fn uptime_ms(&self) -> u64 {
        123_456
    }
    fn free_heap(&self) -> u32 {
        180_000
    }
    fn min_free_heap(&self) -> u32 {
        170_000
    }
    fn total_heap(&self) -> u32 {
        320 * 1024
    }
    fn random(&mut self) -> u32 {
        4
    }
}

fn setup_client(body_len: usize) -> Client<Canned, Frozen> {
    let mut client = Client::new(Canned::new(body_len), Frozen);
    client
        .init(Config::new("192.168.1.100", 8000).unwrap().with_path("/hello").unwrap())
        .expect("Failed to init client");
    client
}

pub fn bench_post(c: &mut Criterion) {
    let mut group = c.benchmark_group("post");
    let payload = "ping from bench";
    group.throughput(Throughput::Bytes(payload.len() as u64));
    group.bench_function("post", |b| {
        let mut client = setup_client(4);
        b.iter(|| {
            let response = client
                .post(None, "text/plain", black_box(payload))
                .expect("Failed to post");
            black_box(response.status_code);
        })
    });
    group.finish();
}

pub fn bench_post_with_headers(c: &mut Criterion) {
    let mut group = c.benchmark_group("post_with_headers");
    group.bench_function("post_with_10_headers", |b| {
        b.iter_batched_ref(
            || {
                let mut client = setup_client(4);
                for i in 0..10 {
                    client
                        .add_header(&format!("X-Bench-{i}"), "some header value")
                        .expect("Failed to add header");
                }
                client
            },
            |client| {
                let response = client
                    .post(None, "text/plain", "ping")
                    .expect("Failed to post");
                black_box(response.status_code);
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

pub fn bench_large_body(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_body");
    let body_len = 60 * 1024;
    group.throughput(Throughput::Bytes(body_len as u64));
    group.bench_function("get_60k", |b| {
        let mut client = setup_client(body_len);
        b.iter(|| {
            let mut response = client.get(None).expect("Failed to get");
            black_box(response.body_length());
            response.release();
        })
    });
    group.finish();
}

pub fn bench_hello_message(c: &mut Criterion) {
    let mut group = c.benchmark_group("hello_message");
    let config = HelloConfig::default();
    let snapshot = Snapshot {
        number: 7,
        uptime_ms: 123_456,
        free_heap: 180_000,
        min_free_heap: 170_000,
        total_heap: 320 * 1024,
        random: 4,
    };
    group.bench_function("compose", |b| {
        b.iter(|| black_box(compose(&config, &snapshot, Some("bench")).expect("Failed to compose")))
    });
    group.bench_function("send_message", |b| {
        let client = Client::new(Canned::new(2), Frozen);
        let mut app = HelloApp::new(client, Board, HelloConfig::default()).expect("Failed to init app");
        b.iter(|| black_box(app.send_message().expect("Failed to send")))
    });
    group.finish();
}
