//! HTTP/1.1 exchange engine for embedded systems.
//!
//! This module provides a blocking HTTP client built for devices that post small
//! payloads to a server on the local network. One request is in flight at a
//! time; each one opens its own connection, writes the request, reads the
//! response and closes the connection again.
//!
//! # Features
//!
//! - Synchronous request/response model over any [`Connect`](crate::network::Connect)
//! - Bounded, ordered [`HeaderSet`] that persists across requests until cleared
//! - Caller-owned [`Response`] bodies, captured up to 64 KiB
//! - Per-client [`Stats`] with byte totals
//! - GET, POST, PUT, DELETE, HEAD and PATCH
//!
//! # Usage
//!
//! ```rust,no_run
//! use hello_iot::network::application::http::{Client, Config, Method, Request};
//! # use hello_iot::network::{Close, Connect, Connection, Read, Write};
//! # use hello_iot::system::Clock;
//! # struct Tcp;
//! # impl Connection for Tcp {}
//! # impl Read for Tcp {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for Tcp {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for Tcp {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # struct Net;
//! # impl Connect for Net {
//! #     type Connection = Tcp;
//! #     type Error = ();
//! #     fn connect(&mut self, _: &str, _: u16, _: u32) -> Result<Tcp, ()> { Ok(Tcp) }
//! # }
//! # struct Uptime;
//! # impl Clock for Uptime { fn now_ms(&self) -> u64 { 0 } }
//!
//! let mut client = Client::new(Net, Uptime);
//! client.init(Config::new("192.168.1.13", 8000)?)?;
//!
//! let request = Request::new(Method::Put).with_body("application/json", br#"{"led":true}"#);
//! let response = client.send_request(&request, Some("/api/led"))?;
//! println!("status {}", response.status_code);
//! # Ok::<(), hello_iot::network::application::http::Error>(())
//! ```

/// The exchange engine and request description.
pub mod client;
/// Engine configuration.
pub mod config;
/// Engine error type.
pub mod error;
/// Outgoing header set.
pub mod headers;
/// Caller-owned response buffer.
pub mod response;
/// Request statistics.
pub mod stats;
mod wire;

pub use client::{Client, Request};
pub use config::Config;
pub use error::Error;
pub use headers::{Header, HeaderSet};
pub use response::Response;
pub use stats::Stats;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `PATCH`
    Patch,
}

impl Method {
    /// The method token as written on the request line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Patch => "PATCH",
        }
    }

    /// `true` for the methods whose body is sent: POST, PUT and PATCH.
    pub fn has_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}
