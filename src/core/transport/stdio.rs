//! STDIO transport implementation.
//!
//! A single persistent session over standard input/output.

use std::future::Future;

use rmcp::RoleServer;
use rmcp::ServiceExt;
use rmcp::service::QuitReason;
use rmcp::transport::IntoTransport;
use tracing::info;

use super::{TransportError, TransportResult, serve_until, shutdown_signal};
use crate::core::McpServer;

/// STDIO transport handler.
pub struct StdioTransport;

impl StdioTransport {
    /// Run the STDIO transport until stdin closes or a termination signal
    /// arrives.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        info!("Ready - communicating via stdin/stdout");

        let reason =
            Self::serve_channel(server, rmcp::transport::stdio(), shutdown_signal()).await?;

        info!("STDIO transport finished: {:?}", reason);
        Ok(())
    }

    /// Serve one session over `channel` until it closes or `shutdown`
    /// resolves.
    pub async fn serve_channel<T, E, A, F>(
        server: McpServer,
        channel: T,
        shutdown: F,
    ) -> TransportResult<QuitReason>
    where
        T: IntoTransport<RoleServer, E, A>,
        E: std::error::Error + Send + Sync + 'static,
        F: Future<Output = ()>,
    {
        let service = server
            .serve(channel)
            .await
            .map_err(TransportError::handshake)?;

        serve_until(service, shutdown).await
    }
}
