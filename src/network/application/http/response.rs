//! Caller-owned response buffer.

use alloc::vec::Vec;
use heapless::String;

/// Bodies whose declared length reaches this many bytes are not captured.
pub const MAX_BODY_LEN: usize = 64 * 1024;
/// Content-Type values longer than this are truncated.
pub const MAX_CONTENT_TYPE_LEN: usize = 127;

/// Result of one completed exchange.
///
/// The body lives on the heap and belongs to the caller. It is freed by
/// [`release`](Response::release) or when the response is dropped.
///
/// A missing body and a body that was too large to capture look the same here
/// (`body_length() == 0`); only [`content_length`](Response::content_length)
/// tells them apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code from the status line.
    pub status_code: u16,
    /// `Content-Length` as declared by the server, 0 if absent.
    pub content_length: usize,
    /// `Content-Type` as sent by the server, empty if absent.
    pub content_type: String<MAX_CONTENT_TYPE_LEN>,
    pub(crate) body: Option<Vec<u8>>,
}

impl Response {
    /// The captured body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// The captured body as text, if present and valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        self.body().and_then(|b| core::str::from_utf8(b).ok())
    }

    /// Number of body bytes captured.
    pub fn body_length(&self) -> usize {
        self.body.as_ref().map_or(0, Vec::len)
    }

    /// Frees the body. Calling it again, or on a response without a body, does
    /// nothing.
    pub fn release(&mut self) {
        self.body = None;
    }

    /// `true` if the server declared a body too large to capture.
    pub fn is_body_capped(&self) -> bool {
        self.content_length >= MAX_BODY_LEN
    }

    /// `true` for status 200, the only status the application counts as a
    /// delivered message. Any status is still a successful exchange.
    pub fn is_ok_status(&self) -> bool {
        self.status_code == 200
    }
}
