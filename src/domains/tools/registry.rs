//! Tool Registry - central registration and dispatch for all tools.
//!
//! Every transport ends up here: the rmcp routes built in `router.rs` and
//! the SSE status page both read from this registry, and all tool calls go
//! through [`ToolRegistry::call_tool`].

use std::sync::Arc;

use rmcp::model::{CallToolResult, JsonObject, Tool};
use tracing::warn;

use super::ToolError;
use super::definitions::{DocsByPathTool, DocsSearchTool};
use crate::domains::docs::DocsPipeline;

// ============================================================================
// Tool Registry
// ============================================================================

/// Tool registry - owns the retrieval pipeline and dispatches to tools.
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    pipeline: Arc<DocsPipeline>,
}

impl ToolRegistry {
    /// Create a new tool registry.
    pub fn new(pipeline: Arc<DocsPipeline>) -> Self {
        Self { pipeline }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![DocsSearchTool::NAME, DocsByPathTool::NAME]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![DocsSearchTool::to_tool(), DocsByPathTool::to_tool()]
    }

    /// Dispatch a tool call to the appropriate tool.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ToolError> {
        match name {
            DocsSearchTool::NAME => DocsSearchTool::execute(arguments, &self.pipeline).await,
            DocsByPathTool::NAME => DocsByPathTool::execute(arguments, &self.pipeline).await,
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}
