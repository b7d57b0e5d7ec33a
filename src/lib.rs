//! # hello-iot - HTTP telemetry for embedded devices
//!
//! A small SDK for devices that report to a server on the local network over
//! plain HTTP/1.1. It is written for `no_std` targets with a heap, such as an
//! ESP32 running a Wi-Fi stack, and runs unchanged on a host for testing.
//!
//! ## Features
//!
//! ### HTTP Exchange Engine
//! - One blocking request/response exchange at a time over any
//!   [`Connect`](network::Connect) implementation
//! - Bounded custom headers that persist until cleared, Basic authentication
//! - Caller-owned response bodies, request statistics
//!
//! ### Hello World Application
//! - Numbered telemetry messages with uptime, heap and verification data
//! - One-shot, retrying, demo sequence and periodic sending
//!
//! ### System Services
//! - [`Clock`](system::Clock) and [`Delay`](system::Delay) traits the platform
//!   implements once
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! hello-iot = "0.1.0"
//! ```
//!
//! ### Basic HTTP Client Example
//!
//! ```rust,no_run
//! use hello_iot::network::application::http::{Client, Config};
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
//! # struct WifiStack;
//! # impl Connect for WifiStack {
//! #     type Connection = Tcp;
//! #     type Error = ();
//! #     fn connect(&mut self, _: &str, _: u16, _: u32) -> Result<Tcp, ()> { Ok(Tcp) }
//! # }
//! # struct Uptime;
//! # impl Clock for Uptime { fn now_ms(&self) -> u64 { 0 } }
//!
//! let mut client = Client::new(WifiStack, Uptime);
//! client.init(Config::new("192.168.1.100", 8000)?.with_path("/hello")?)?;
//!
//! let mut response = client.get(None)?;
//! if let Some(text) = response.body_str() {
//!     // use the server's answer
//! #   let _ = text;
//! }
//! response.release();
//! # Ok::<(), hello_iot::network::application::http::Error>(())
//! ```
//!
//! ## Platform Support
//!
//! This library is designed to work on:
//! - Embedded microcontrollers with an allocator (ESP32, ARM Cortex-M, RISC-V)
//! - Linux-based IoT devices (Raspberry Pi, etc.)
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Log through defmt and derive `defmt::Format` for public types
//! - `log`: Log through the `log` facade

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

extern crate alloc;

#[macro_use]
mod fmt;

/// Network abstraction layer providing the transport traits and the HTTP engine.
///
/// The device's TCP stack is reached through the traits in this module; the
/// protocol code on top of it never touches a socket API directly.
pub mod network;

/// System utilities for embedded devices.
///
/// Time and delay services the protocol and application code need from the
/// platform.
pub mod system;

/// The Hello World telemetry application.
pub mod hello;
