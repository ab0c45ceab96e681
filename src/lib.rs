//! Kestra documentation MCP server.
//!
//! Exposes two Model Context Protocol tools, `docs-search` and
//! `docs-by-path`, that answer questions from the Kestra documentation. The
//! server is reachable over stdio or over HTTP event streams.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the MCP server handler and the
//!   transport bindings
//! - **domains**: business logic
//!   - **docs**: search, page fetching and normalization into [`DocResult`]s
//!   - **tools**: the MCP tool definitions that dispatch into `docs`
//!
//! Lookups never fail at the protocol level: a missing page or an
//! unreachable search endpoint yields a sentinel [`DocResult`] whose
//! category is `"error"`.
//!
//! # Example
//!
//! ```rust,no_run
//! use kestra_docs_mcp_server::core::{Config, McpServer, TransportService};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env();
//!     let server = McpServer::new(config.clone())?;
//!     TransportService::new(config.transport).run(server).await?;
//!     Ok(())
//! }
//! ```
//!
//! [`DocResult`]: domains::docs::DocResult

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
