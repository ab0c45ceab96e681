//! Top-level error type.
//!
//! Lookup failures never show up here: the docs pipeline turns them into
//! sentinel results, and rejected tool calls become JSON-RPC errors. What
//! remains is startup and transport failure.

use thiserror::Error;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// A setting could not be used (bad URL, HTTP client setup).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A transport binding failed.
    #[error(transparent)]
    Transport(#[from] super::transport::TransportError),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
