//! A network abstraction layer for embedded systems
//!
//! The traits in this module describe the minimum a transport has to offer for the
//! protocol clients in [`application`] to run over it: a byte stream that can be
//! read, written and closed, and a connector that opens such a stream to a remote
//! `host:port` within a time limit. Nothing here assumes an operating system; a
//! smoltcp socket, an ESP-IDF `esp_transport` handle or a `std::net::TcpStream`
//! can all sit behind them.
//!

#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application-layer protocol clients built on the traits below
pub mod application;

pub use error::{Error, ErrorKind};

/// Re-exports of common traits
pub mod prelude {
    pub use super::{Close, Connect, Connection, ErrorKind, Read, Write};
}

/// Byte source half of a connection.
pub trait Read {
    /// Associated error type
    type Error: ErrorKind;
    /// Read data from the connection.
    ///
    /// `Ok(0)` means the peer closed the stream.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Byte sink half of a connection.
pub trait Write {
    /// Associated error type
    type Error: ErrorKind;
    /// Write data to the connection, returning how many bytes were accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Write the whole buffer, retrying short writes.
    fn write_all(&mut self, mut buf: &[u8]) -> Result<(), Error> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => return Err(Error::WriteError),
                Ok(n) => buf = &buf[n..],
                Err(e) => return Err(e.kind()),
            }
        }
        Ok(())
    }
}

/// Teardown of a connection.
pub trait Close {
    /// Associated error type
    type Error: ErrorKind;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A synchronous connector (client)
pub trait Connect {
    /// Associated connection type
    type Connection: Connection;
    /// Associated error type
    type Error: ErrorKind;
    /// Open a connection to `host:port`.
    ///
    /// `timeout_ms` bounds the connect itself and every subsequent read and write
    /// on the returned connection. Zero means the transport's own default.
    fn connect(
        &mut self,
        host: &str,
        port: u16,
        timeout_ms: u32,
    ) -> Result<Self::Connection, Self::Error>;
}
