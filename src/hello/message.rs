//! Hello World payload text.

use core::fmt::Write;
use heapless::String;

use super::HelloConfig;
use crate::network::application::http::Error;

/// Largest payload composed, in bytes.
pub const MAX_MESSAGE_LEN: usize = 1024;

/// Device readings that go into one message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Message number, starting at 1.
    pub number: u32,
    /// Uptime when the message was composed.
    pub uptime_ms: u64,
    /// Free heap in bytes.
    pub free_heap: u32,
    /// Lowest free heap seen since boot.
    pub min_free_heap: u32,
    /// Heap size in bytes.
    pub total_heap: u32,
    /// A fresh random number.
    pub random: u32,
}

impl Snapshot {
    /// `2^n` for the message number, wrapping back to 1 once it passes 10000.
    pub fn verification_value(&self) -> u32 {
        // Doubling from 1 reaches 16384 on the 14th step and restarts at 1.
        1 << (self.number % 14)
    }

    /// CRC-32 over the little-endian message number and uptime.
    ///
    /// Firmware builds that print `number * uptime_ms` as the hash produce
    /// different values for the same message; servers should treat the field
    /// as opaque.
    pub fn hash(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&self.number.to_le_bytes());
        hasher.update(&self.uptime_ms.to_le_bytes());
        hasher.finalize()
    }

    /// Heap in use, in tenths of a percent.
    fn heap_usage_permille(&self) -> u64 {
        if self.total_heap == 0 {
            return 0;
        }
        let used = self.total_heap.saturating_sub(self.free_heap) as u64;
        used * 1000 / self.total_heap as u64
    }
}

/// Builds the message text.
///
/// Optional sections that do not fit in [`MAX_MESSAGE_LEN`] are left out; only
/// the leading message section is mandatory.
///
/// # Errors
///
/// [`Error::NoMemory`] if the mandatory section does not fit.
pub fn compose(
    config: &HelloConfig,
    snapshot: &Snapshot,
    custom: Option<&str>,
) -> Result<String<MAX_MESSAGE_LEN>, Error> {
    let mut out = String::new();
    let n = snapshot.number;
    let uptime = snapshot.uptime_ms;

    write!(
        out,
        "Hello World from ESP32!\n\
         =======================================\n\
         Message Information:\n   \
         Message Number: {}\n   \
         Uptime: {}.{:03} seconds ({} ms total)\n   \
         Verification Value: {} (calc: 2^{})\n   \
         Message Hash: {:08x}\n\n",
        n,
        uptime / 1000,
        uptime % 1000,
        uptime,
        snapshot.verification_value(),
        n,
        snapshot.hash(),
    )
    .map_err(|_| {
        error!("Message buffer too small");
        Error::NoMemory
    })?;

    if config.include_system_info {
        let permille = snapshot.heap_usage_permille();
        section(&mut out, |w| {
            write!(
                w,
                "System Information:\n   \
                 Free Heap Memory: {} bytes\n   \
                 Minimum Free Heap: {} bytes\n   \
                 Memory Usage: {}.{}%\n   \
                 Target Server: {}:{}{}\n\n",
                snapshot.free_heap,
                snapshot.min_free_heap,
                permille / 10,
                permille % 10,
                config.target_host.as_str(),
                config.target_port,
                config.target_path.as_str(),
            )
        });
    }

    if config.include_random_data {
        let n = n as u64;
        section(&mut out, |w| {
            write!(
                w,
                "Verification Data (changes each message):\n   \
                 Random Value: {}\n   \
                 Counter Squared: {}\n   \
                 Sum Formula: {}\n\n",
                snapshot.random % 1000,
                n * n,
                (n * (n + 1) / 2) % 1000,
            )
        });
    }

    if let Some(custom) = custom.filter(|c| !c.is_empty()) {
        section(&mut out, |w| write!(w, "Custom Message:\n{}\n\n", custom));
    }

    section(&mut out, |w| {
        w.write_str(
            "Network Information:\n   \
             Connected to WiFi\n   \
             Local network communication\n   \
             HTTP POST request\n\n\
             Generated at runtime by ESP32!\n\
             =======================================",
        )
    });

    Ok(out)
}

/// Appends a section, or nothing at all if it does not fit.
fn section(
    out: &mut String<MAX_MESSAGE_LEN>,
    write: impl FnOnce(&mut String<MAX_MESSAGE_LEN>) -> core::fmt::Result,
) {
    let mark = out.len();
    if write(out).is_err() {
        out.truncate(mark);
        warn!("Message section dropped, {} bytes left", MAX_MESSAGE_LEN - mark);
    }
}
