//! HTTP/1.1 framing: request heads out, response heads in.

use alloc::string::String as HeapString;
use alloc::vec::Vec as HeapVec;
use core::fmt::Write as _;
use heapless::String;

use super::headers::{HeaderSet, truncated};
use super::response::MAX_CONTENT_TYPE_LEN;
use super::{Error, Method};
use crate::network::{self, ErrorKind, Read, Write};

/// Largest response head (status line plus headers) accepted.
pub const MAX_RESPONSE_HEAD: usize = 2048;

/// Everything that goes before the body of a request.
pub(crate) struct RequestHead<'a> {
    pub method: Method,
    pub host: &'a str,
    pub port: u16,
    pub path: &'a str,
    pub user_agent: &'a str,
    pub headers: &'a HeaderSet,
    pub content_type: Option<&'a str>,
    /// `Some` for methods that carry a body, even an empty one.
    pub content_length: Option<usize>,
}

impl RequestHead<'_> {
    /// Serialises the head into a freshly allocated buffer.
    ///
    /// A `User-Agent` in `headers` replaces the configured one, and an explicit
    /// content type replaces a `Content-Type` in `headers`. `Content-Length`,
    /// `Host` and `Connection` are always written by the engine.
    pub fn encode(&self) -> Result<HeapString, Error> {
        let path = if self.path.is_empty() { "/" } else { self.path };

        let mut capacity = self.method.as_str().len()
            + path.len()
            + self.host.len()
            + self.user_agent.len()
            + self.content_type.map_or(0, str::len)
            + 128;
        for header in self.headers {
            capacity += header.name.len() + header.value.len() + 4;
        }

        let mut head = HeapString::new();
        head.try_reserve_exact(capacity)
            .map_err(|_| Error::NoMemory)?;

        // Writing into a `String` cannot fail.
        let _ = write!(head, "{} {} HTTP/1.1\r\n", self.method.as_str(), path);
        if self.port == 80 {
            let _ = write!(head, "Host: {}\r\n", self.host);
        } else {
            let _ = write!(head, "Host: {}:{}\r\n", self.host, self.port);
        }
        if !self.headers.contains("User-Agent") {
            let _ = write!(head, "User-Agent: {}\r\n", self.user_agent);
        }
        for header in self.headers {
            let name = header.name.as_str();
            if is_engine_managed(name)
                || (self.content_type.is_some() && name.eq_ignore_ascii_case("Content-Type"))
            {
                continue;
            }
            let _ = write!(head, "{}: {}\r\n", name, header.value.as_str());
        }
        if let Some(content_type) = self.content_type {
            let _ = write!(head, "Content-Type: {}\r\n", content_type);
        }
        if let Some(len) = self.content_length {
            let _ = write!(head, "Content-Length: {}\r\n", len);
        }
        head.push_str("Connection: close\r\n\r\n");
        Ok(head)
    }
}

fn is_engine_managed(name: &str) -> bool {
    ["Host", "Content-Length", "Connection", "Transfer-Encoding"]
        .iter()
        .any(|managed| name.eq_ignore_ascii_case(managed))
}

/// Writes a serialised head followed by `body` and flushes.
pub(crate) fn send<C: Write>(conn: &mut C, head: &str, body: &[u8]) -> Result<(), network::Error> {
    conn.write_all(head.as_bytes())?;
    conn.write_all(body)?;
    conn.flush().map_err(|e| e.kind())
}

/// Parsed status line and the headers the engine cares about.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    pub status_code: u16,
    pub content_length: usize,
    pub content_type: String<MAX_CONTENT_TYPE_LEN>,
}

impl ResponseHead {
    /// Parses a head up to, not including, the blank line.
    pub fn parse(data: &[u8]) -> Result<Self, network::Error> {
        let text = core::str::from_utf8(data).map_err(|_| network::Error::ProtocolError)?;
        let mut lines = text.split("\r\n");

        let status_line = lines.next().ok_or(network::Error::ProtocolError)?;
        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap_or_default();
        if !version.starts_with("HTTP/") {
            return Err(network::Error::ProtocolError);
        }
        let status_code = parts
            .next()
            .filter(|code| code.len() == 3)
            .and_then(|code| code.parse::<u16>().ok())
            .ok_or(network::Error::ProtocolError)?;

        let mut head = ResponseHead {
            status_code,
            ..ResponseHead::default()
        };
        for line in lines.filter(|l| !l.is_empty()) {
            let (name, value) = line
                .split_once(':')
                .ok_or(network::Error::ProtocolError)?;
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("Content-Length") {
                head.content_length = value.parse().unwrap_or(0);
            } else if name.eq_ignore_ascii_case("Content-Type") {
                head.content_type = truncated(value);
            }
        }
        Ok(head)
    }
}

/// Reads until the end of the response head.
///
/// Returns the head buffer, the head length (without the blank line) and how many
/// bytes were filled in total; bytes past the blank line are the start of the
/// body.
pub(crate) fn read_head<C: Read>(
    conn: &mut C,
    buf: &mut [u8; MAX_RESPONSE_HEAD],
) -> Result<(usize, usize), network::Error> {
    let mut total_read = 0;
    loop {
        if total_read == buf.len() {
            return Err(network::Error::ProtocolError);
        }
        match conn.read(&mut buf[total_read..]) {
            Ok(0) => return Err(network::Error::ConnectionClosed),
            Ok(n) => {
                // Resume the search a few bytes back in case the terminator
                // straddles two reads.
                let from = total_read.saturating_sub(3);
                total_read += n;
                if let Some(pos) = find_slice(&buf[from..total_read], b"\r\n\r\n") {
                    return Ok((from + pos, total_read));
                }
            }
            Err(e) => return Err(e.kind()),
        }
    }
}

/// Reads exactly `len` body bytes, starting with what already arrived.
pub(crate) fn read_body<C: Read>(
    conn: &mut C,
    already: &[u8],
    len: usize,
) -> Result<HeapVec<u8>, Error> {
    let mut body = HeapVec::new();
    body.try_reserve_exact(len).map_err(|_| Error::NoMemory)?;
    body.extend_from_slice(&already[..already.len().min(len)]);

    let mut temp_buf = [0u8; 256];
    while body.len() < len {
        let want = (len - body.len()).min(temp_buf.len());
        match conn.read(&mut temp_buf[..want]) {
            Ok(0) => return Err(network::Error::ConnectionClosed.into()),
            Ok(n) => body.extend_from_slice(&temp_buf[..n]),
            Err(e) => return Err(e.kind().into()),
        }
    }
    Ok(body)
}

/// Finds the first occurrence of a slice in another slice and returns its starting position.
fn find_slice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
