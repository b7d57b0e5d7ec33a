//! # Application Layer Network Protocols
//!
//! Protocol clients that run over the [`network`](crate::network) traits.
//!
//! ## Available Protocols
//!
//! - **[`http`]**: blocking HTTP/1.1 exchange engine with a bounded header set,
//!   caller-owned response buffers and request statistics
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any type implementing [`Connect`](crate::network::Connect)
//! - **No-std Compatible**: Bounded strings and collections come from `heapless`;
//!   only response bodies use the global allocator
//! - **Explicit Errors**: Every failure is returned from the call that caused it

/// HTTP client implementation.
///
/// Provides a blocking HTTP/1.1 exchange engine suitable for embedded systems,
/// supporting GET, POST, PUT, DELETE, HEAD and PATCH with custom headers.
pub mod http;
