//! Transport service - starts the configured binding.
//!
//! Also home to [`serve_until`], the one driver both bindings use for their
//! rmcp services.

use std::future::Future;

use rmcp::RoleServer;
use rmcp::service::{QuitReason, RunningService};
use tracing::info;

use super::{TransportConfig, TransportError, TransportResult};
use crate::core::McpServer;

#[cfg(feature = "stdio")]
use super::stdio::StdioTransport;

#[cfg(feature = "sse")]
use super::sse::SseTransport;

/// Transport service - manages the transport layer for the MCP server.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    /// Create a new transport service with the given configuration.
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Log information about the configured transport.
    pub fn log_info(&self) {
        info!("Starting transport: {}", self.config.description());
    }

    /// Start the transport with the given MCP server.
    ///
    /// This method blocks until the transport is shut down.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        self.log_info();

        match self.config {
            #[cfg(feature = "stdio")]
            TransportConfig::Stdio => StdioTransport::run(server).await,
            #[cfg(feature = "sse")]
            TransportConfig::Sse(cfg) => SseTransport::new(cfg).run(server).await,
        }
    }
}

/// Drive an initialized MCP service until it ends or `shutdown` resolves.
///
/// On shutdown the service is cancelled and awaited, so the caller returns
/// only once the binding is fully closed.
pub async fn serve_until<F>(
    service: RunningService<RoleServer, McpServer>,
    shutdown: F,
) -> TransportResult<QuitReason>
where
    F: Future<Output = ()>,
{
    let token = service.cancellation_token();
    let waiting = service.waiting();
    tokio::pin!(waiting);

    let result = tokio::select! {
        result = &mut waiting => result,
        _ = shutdown => {
            token.cancel();
            waiting.await
        }
    };

    result.map_err(TransportError::service)
}
