//! Transport configuration types.

use serde::{Deserialize, Serialize};

#[cfg(feature = "sse")]
use crate::core::config::env_number;

/// Transport configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Standard input/output transport.
    #[cfg(feature = "stdio")]
    Stdio,

    /// HTTP event-stream transport (default).
    #[cfg(feature = "sse")]
    Sse(SseConfig),
}

/// SSE transport configuration.
#[cfg(feature = "sse")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Port number to listen on.
    pub port: u16,

    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Path that opens an event stream.
    #[serde(default = "default_sse_path")]
    pub sse_path: String,

    /// Path that accepts messages for an open stream.
    #[serde(default = "default_message_path")]
    pub message_path: String,

    /// Enable CORS for browser clients.
    #[serde(default = "default_cors")]
    pub enable_cors: bool,

    /// How long a session waits for the answer to one request before
    /// accepting the next message.
    #[serde(default = "default_response_timeout")]
    pub response_timeout_secs: u64,

    /// Interval between keep-alive comments on idle streams.
    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,
}

#[cfg(feature = "sse")]
fn default_host() -> String {
    "0.0.0.0".to_string()
}

#[cfg(feature = "sse")]
fn default_sse_path() -> String {
    "/sse".to_string()
}

#[cfg(feature = "sse")]
fn default_message_path() -> String {
    "/message".to_string()
}

#[cfg(feature = "sse")]
fn default_cors() -> bool {
    true
}

#[cfg(feature = "sse")]
fn default_response_timeout() -> u64 {
    60
}

#[cfg(feature = "sse")]
fn default_keep_alive() -> u64 {
    15
}

impl Default for TransportConfig {
    fn default() -> Self {
        #[cfg(feature = "sse")]
        {
            return Self::Sse(SseConfig::default());
        }

        #[cfg(all(not(feature = "sse"), feature = "stdio"))]
        {
            return Self::Stdio;
        }

        #[cfg(not(any(feature = "stdio", feature = "sse")))]
        {
            compile_error!("At least one transport feature must be enabled: stdio or sse");
        }
    }
}

#[cfg(feature = "sse")]
impl Default for SseConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: default_host(),
            sse_path: default_sse_path(),
            message_path: default_message_path(),
            enable_cors: default_cors(),
            response_timeout_secs: default_response_timeout(),
            keep_alive_secs: default_keep_alive(),
        }
    }
}

impl TransportConfig {
    /// Create an SSE transport config.
    #[cfg(feature = "sse")]
    pub fn sse(port: u16, host: impl Into<String>) -> Self {
        Self::Sse(SseConfig {
            port,
            host: host.into(),
            ..Default::default()
        })
    }

    /// Load transport config from environment variables.
    ///
    /// `SERVER_TYPE` (or `MCP_TRANSPORT`) selects the binding: `stdio`
    /// selects the local channel, anything else the event stream.
    pub fn from_env() -> Self {
        let transport = std::env::var("SERVER_TYPE")
            .or_else(|_| std::env::var("MCP_TRANSPORT"))
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match transport.as_str() {
            #[cfg(feature = "stdio")]
            "stdio" => Self::Stdio,
            #[cfg(feature = "sse")]
            _ => Self::Sse(SseConfig::from_env()),
            #[cfg(not(feature = "sse"))]
            _ => Self::Stdio,
        }
    }

    /// Get a description of this transport for logging.
    pub fn description(&self) -> String {
        match self {
            #[cfg(feature = "stdio")]
            Self::Stdio => "STDIO (standard MCP mode)".to_string(),
            #[cfg(feature = "sse")]
            Self::Sse(cfg) => format!("SSE on {}:{}{}", cfg.host, cfg.port, cfg.sse_path),
        }
    }

    /// Check if this transport is the standard STDIO mode.
    pub fn is_stdio(&self) -> bool {
        #[cfg(feature = "stdio")]
        {
            matches!(self, Self::Stdio)
        }
        #[cfg(not(feature = "stdio"))]
        {
            false
        }
    }
}

#[cfg(feature = "sse")]
impl SseConfig {
    /// Load SSE settings, starting from defaults.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Some(port) = env_number("PORT").or_else(|| env_number("MCP_HTTP_PORT")) {
            cfg.port = port;
        }
        if let Ok(host) = std::env::var("MCP_HTTP_HOST") {
            cfg.host = host;
        }
        if let Ok(path) = std::env::var("MCP_SSE_PATH") {
            cfg.sse_path = path;
        }
        if let Ok(path) = std::env::var("MCP_MESSAGE_PATH") {
            cfg.message_path = path;
        }
        if let Ok(v) = std::env::var("MCP_HTTP_CORS") {
            cfg.enable_cors = v.to_lowercase() != "false" && v != "0";
        }
        if let Some(secs) = env_number("MCP_SESSION_RESPONSE_TIMEOUT_SECS") {
            cfg.response_timeout_secs = secs;
        }

        cfg
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
