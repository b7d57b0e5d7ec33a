//! Request statistics.

use serde::{Deserialize, Serialize};

/// Counters kept by a [`Client`](super::Client) since init or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Exchanges that completed at the transport level, whatever the status.
    pub requests_sent: u32,
    /// Exchanges that failed below the status line.
    pub requests_failed: u32,
    /// Status code of the most recent completed exchange, 0 before the first.
    pub last_status_code: u16,
    /// Start of the most recent completed exchange, in milliseconds since init.
    pub last_request_time_ms: u64,
    /// Request body bytes of completed exchanges.
    pub bytes_sent: u64,
    /// Response body bytes captured.
    pub bytes_received: u64,
}

impl Stats {
    pub(crate) fn record_success(
        &mut self,
        status_code: u16,
        started_at_ms: u64,
        sent: usize,
        received: usize,
    ) {
        self.requests_sent = self.requests_sent.saturating_add(1);
        self.last_status_code = status_code;
        self.last_request_time_ms = started_at_ms;
        self.bytes_sent = self.bytes_sent.saturating_add(sent as u64);
        self.bytes_received = self.bytes_received.saturating_add(received as u64);
    }

    pub(crate) fn record_failure(&mut self) {
        self.requests_failed = self.requests_failed.saturating_add(1);
    }

    /// Total exchanges attempted past argument validation.
    pub fn total_requests(&self) -> u32 {
        self.requests_sent.saturating_add(self.requests_failed)
    }
}
