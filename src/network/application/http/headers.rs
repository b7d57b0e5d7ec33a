//! Caller-managed set of outgoing request headers.

use base64ct::{Base64, Encoding};
use heapless::{String, Vec};

use super::Error;

/// Maximum number of headers held at once.
pub const MAX_HEADERS: usize = 10;
/// Header names longer than this are truncated.
pub const MAX_HEADER_NAME_LEN: usize = 63;
/// Header values longer than this are truncated.
pub const MAX_HEADER_VALUE_LEN: usize = 191;

/// Longest `user:password` that still fits a `Basic` value once encoded.
const MAX_CREDENTIALS_LEN: usize = (MAX_HEADER_VALUE_LEN - "Basic ".len()) / 4 * 3;

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name, as given.
    pub name: String<MAX_HEADER_NAME_LEN>,
    /// Header value, as given.
    pub value: String<MAX_HEADER_VALUE_LEN>,
}

/// Ordered, bounded collection of headers sent with every request.
///
/// Headers stay in the set until [`clear`](HeaderSet::clear) is called, so a
/// caller issuing requests that need different headers must clear and re-add
/// them between calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    headers: Vec<Header, MAX_HEADERS>,
}

impl HeaderSet {
    /// Creates an empty header set.
    pub const fn new() -> Self {
        Self {
            headers: Vec::new(),
        }
    }

    /// Appends a header.
    ///
    /// Names longer than [`MAX_HEADER_NAME_LEN`] and values longer than
    /// [`MAX_HEADER_VALUE_LEN`] bytes are cut at the last character boundary that
    /// fits; this is not an error.
    ///
    /// # Errors
    ///
    /// - [`Error::CapacityExceeded`] when [`MAX_HEADERS`] entries are already held.
    /// - [`Error::InvalidArgument`] when either string is empty, the name contains
    ///   `:`, or either contains a line break.
    pub fn add(&mut self, name: &str, value: &str) -> Result<(), Error> {
        if self.headers.is_full() {
            error!("Maximum headers ({}) reached", MAX_HEADERS);
            return Err(Error::CapacityExceeded);
        }
        if name.is_empty() || value.is_empty() {
            return Err(Error::InvalidArgument);
        }
        if name.contains([':', '\r', '\n']) || value.contains(['\r', '\n']) {
            return Err(Error::InvalidArgument);
        }

        let header = Header {
            name: truncated(name),
            value: truncated(value),
        };
        if header.name.len() < name.len() || header.value.len() < value.len() {
            warn!("Header {} truncated", header.name.as_str());
        }
        self.headers
            .push(header)
            .map_err(|_| Error::CapacityExceeded)
    }

    /// Appends an `Authorization: Basic` header for `user` and `password`.
    ///
    /// # Errors
    ///
    /// Same as [`add`](HeaderSet::add), plus [`Error::InvalidArgument`] when the
    /// encoded credentials would not fit in a header value.
    pub fn add_basic_auth(&mut self, user: &str, password: &str) -> Result<(), Error> {
        let mut credentials: Vec<u8, MAX_CREDENTIALS_LEN> = Vec::new();
        credentials
            .extend_from_slice(user.as_bytes())
            .map_err(|_| Error::InvalidArgument)?;
        credentials.push(b':').map_err(|_| Error::InvalidArgument)?;
        credentials
            .extend_from_slice(password.as_bytes())
            .map_err(|_| Error::InvalidArgument)?;

        let mut encoded = [0u8; MAX_HEADER_VALUE_LEN];
        let encoded =
            Base64::encode(&credentials, &mut encoded).map_err(|_| Error::InvalidArgument)?;

        let mut value: String<MAX_HEADER_VALUE_LEN> = String::new();
        value.push_str("Basic ").map_err(|_| Error::InvalidArgument)?;
        value.push_str(encoded).map_err(|_| Error::InvalidArgument)?;
        self.add("Authorization", &value)
    }

    /// Removes every header.
    pub fn clear(&mut self) {
        self.headers.clear();
    }

    /// Number of headers held.
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// `true` when no headers are held.
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Headers in insertion order.
    pub fn iter(&self) -> core::slice::Iter<'_, Header> {
        self.headers.iter()
    }

    /// The first header whose name matches `name`, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// `true` if a header named `name` is held, ignoring ASCII case.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<'a> IntoIterator for &'a HeaderSet {
    type Item = &'a Header;
    type IntoIter = core::slice::Iter<'a, Header>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Copies the longest prefix of `s` that fits in `N` bytes without splitting a
/// character.
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut end = s.len().min(N);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::new();
    // Cannot fail: `end <= N`.
    let _ = out.push_str(&s[..end]);
    out
}
