//! System services for embedded devices.
//!
//! The protocol clients and the hello application need two things from the
//! platform that `core` cannot provide: a monotonic millisecond clock and a way
//! to block the current task for a while. Both are traits so the same code runs
//! on an RTOS tick counter, a hardware timer or `std::time`.
//!
//! # Design Principles
//!
//! - **Embedded-First**: no allocation, no global state
//! - **Portable**: implemented in a few lines on any target
//!
//! # Usage
//!
//! ```rust
//! use hello_iot::system::{Clock, Delay};
//! use std::time::Instant;
//!
//! struct Uptime(Instant);
//!
//! impl Clock for Uptime {
//!     fn now_ms(&self) -> u64 {
//!         self.0.elapsed().as_millis() as u64
//!     }
//! }
//!
//! struct Sleep;
//!
//! impl Delay for Sleep {
//!     fn delay_ms(&mut self, ms: u32) {
//!         std::thread::sleep(std::time::Duration::from_millis(ms.into()));
//!     }
//! }
//!
//! let clock = Uptime(Instant::now());
//! Sleep.delay_ms(1);
//! assert!(clock.now_ms() >= 1);
//! ```

/// Monotonic time source.
pub trait Clock {
    /// Milliseconds since an arbitrary, fixed starting point (typically boot).
    fn now_ms(&self) -> u64;
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// Blocking delay.
pub trait Delay {
    /// Blocks the calling task for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
