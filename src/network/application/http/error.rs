//! Errors returned by the HTTP exchange engine.

use core::fmt;

use crate::network;

/// Failure of an engine call.
///
/// Everything except [`Error::Transport`] is a caller bug or a resource limit and
/// does not touch the request statistics. A transport failure is counted in
/// [`Stats::requests_failed`](super::Stats::requests_failed).
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// A required argument was empty, out of range or too long.
    InvalidArgument,
    /// The engine has not been initialised, or has been deinitialised.
    InvalidState,
    /// The header set already holds its maximum number of entries.
    CapacityExceeded,
    /// An allocation for the request or response buffer failed.
    NoMemory,
    /// Connect, write, read, timeout or protocol failure below the status line.
    Transport(network::Error),
}

impl From<network::Error> for Error {
    fn from(e: network::Error) -> Self {
        Error::Transport(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument => f.write_str("invalid argument"),
            Error::InvalidState => f.write_str("client not initialized"),
            Error::CapacityExceeded => f.write_str("header capacity exceeded"),
            Error::NoMemory => f.write_str("out of memory"),
            Error::Transport(e) => write!(f, "transport failure: {e}"),
        }
    }
}

impl core::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::InvalidArgument => defmt::write!(f, "InvalidArgument"),
            Error::InvalidState => defmt::write!(f, "InvalidState"),
            Error::CapacityExceeded => defmt::write!(f, "CapacityExceeded"),
            Error::NoMemory => defmt::write!(f, "NoMemory"),
            Error::Transport(e) => defmt::write!(f, "Transport({})", e),
        }
    }
}
