//! MCP Server implementation.
//!
//! [`McpServer`] is the one protocol handler behind every transport. It
//! advertises the tools capability and routes `tools/call` through the
//! [`ToolRegistry`].

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use crate::domains::docs::DocsPipeline;
use crate::domains::tools::{ToolRegistry, build_tool_router};

const INSTRUCTIONS: &str = "This server answers questions about Kestra from its official documentation. \
Use docs-search with a free-text question, or docs-by-path with a documentation path \
such as 'workflow-components/flow' or a full kestra.io URL.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Fails when a configured documentation URL does not parse.
    pub fn new(config: Config) -> crate::core::Result<Self> {
        let pipeline = DocsPipeline::from_config(&config.docs)?;
        info!(?pipeline, "Documentation pipeline ready");
        Ok(Self::with_pipeline(config, pipeline))
    }

    /// Create a server around an already built pipeline.
    pub fn with_pipeline(config: Config, pipeline: DocsPipeline) -> Self {
        let registry = Arc::new(ToolRegistry::new(Arc::new(pipeline)));

        Self {
            tool_router: build_tool_router::<Self>(registry),
            config: Arc::new(config),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Tools as routed by rmcp.
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Implementation::from_build_env()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_info() {
        let server = McpServer::new(Config::default()).unwrap();
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert_eq!(info.server_info.name, "Kestra Documentation Server");
        assert_eq!(server.list_tools().len(), 2);
    }

    #[test]
    fn test_invalid_docs_url_is_a_config_error() {
        let mut config = Config::default();
        config.docs.search_url = "not a url".to_string();
        assert!(matches!(
            McpServer::new(config),
            Err(crate::core::Error::Config(_))
        ));
    }
}
