//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Failures of a transport binding.
///
/// Only [`Bind`](Self::Bind) and [`Handshake`](Self::Handshake) on stdio
/// reach `main`; session-level failures end that session and are logged.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The listener could not be bound.
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// The client never completed `initialize`.
    #[error("MCP handshake failed: {0}")]
    Handshake(String),

    /// The client side of a session went away.
    #[error("session closed: {0}")]
    SessionClosed(String),

    /// Reading from or writing to a session pipe failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The HTTP server stopped with an error.
    #[error("HTTP server error: {0}")]
    Http(String),

    /// The rmcp service task failed.
    #[error("MCP service error: {0}")]
    Service(String),
}

impl TransportError {
    pub fn bind(address: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            address: address.into(),
            source,
        }
    }

    pub fn handshake(err: impl ToString) -> Self {
        Self::Handshake(err.to_string())
    }

    pub fn session_closed(reason: impl Into<String>) -> Self {
        Self::SessionClosed(reason.into())
    }

    pub fn http(err: impl ToString) -> Self {
        Self::Http(err.to_string())
    }

    pub fn service(err: impl ToString) -> Self {
        Self::Service(err.to_string())
    }
}
