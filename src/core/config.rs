//! Server configuration.
//!
//! Everything is read once at startup from the environment, after loading a
//! `.env` file if one exists. Unset or unparseable values keep their default.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Main configuration structure for the MCP server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Documentation upstreams.
    pub docs: DocsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Reported in `initialize` and on the status page.
    pub name: String,

    /// Crate version.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,

    /// Prefix log lines with a timestamp.
    pub with_timestamps: bool,
}

/// Where documentation is searched and fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocsConfig {
    /// Base URL relative locators are resolved against.
    pub base_url: String,

    /// Host prefixed to relative search hit URLs.
    pub site_url: String,

    /// Search endpoint, queried with a `q` parameter.
    pub search_url: String,

    /// Timeout applied to every outbound request, in seconds.
    pub timeout_secs: u64,

    /// User agent sent upstream.
    pub user_agent: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://kestra.io/docs/".to_string(),
            site_url: "https://kestra.io".to_string(),
            search_url: "https://api.kestra.io/v1/search".to_string(),
            timeout_secs: 10,
            user_agent: concat!("kestra-docs-mcp/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "Kestra Documentation Server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                with_timestamps: true,
            },
            transport: TransportConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

/// Read a numeric environment variable, warning on unparseable values.
pub(crate) fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid number", name, raw);
            None
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`,
    /// `MCP_LOG_LEVEL`, `MCP_DOCS_*`). Transport selection also honors
    /// `SERVER_TYPE` and `PORT`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(v) = std::env::var("MCP_LOG_TIMESTAMPS") {
            config.logging.with_timestamps =
                !matches!(v.trim().to_lowercase().as_str(), "0" | "false");
        }

        config.transport = TransportConfig::from_env();

        if let Ok(base_url) = std::env::var("MCP_DOCS_BASE_URL") {
            config.docs.base_url = base_url;
        }

        if let Ok(site_url) = std::env::var("MCP_DOCS_SITE_URL") {
            config.docs.site_url = site_url;
        }

        if let Ok(search_url) = std::env::var("MCP_DOCS_SEARCH_URL") {
            config.docs.search_url = search_url;
        }

        if let Some(timeout) = env_number("MCP_DOCS_TIMEOUT_SECS") {
            config.docs.timeout_secs = timeout;
        }

        config
    }
}
