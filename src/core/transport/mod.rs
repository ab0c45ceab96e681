//! Transport layer for the MCP server.
//!
//! This module provides two bindings of the same [`McpServer`](crate::core::McpServer):
//! - **STDIO**: standard input/output, one persistent session - feature: `stdio`
//! - **SSE**: HTTP event streams, one session per open stream - feature: `sse`
//!
//! Both hand their byte streams to rmcp and drive the resulting service with
//! [`serve_until`], so tool dispatch lives in exactly one place.

mod config;
mod error;
mod service;
mod signal;

#[cfg(feature = "sse")]
pub mod session;

#[cfg(feature = "sse")]
pub mod sse;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::{TransportService, serve_until};
pub use signal::shutdown_signal;

#[cfg(feature = "sse")]
pub use config::SseConfig;
