//! Tool Router - builds the rmcp ToolRouter from the registry.
//!
//! Each tool creates its own route; every route dispatches through
//! [`ToolRegistry::call_tool`].

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use super::definitions::{DocsByPathTool, DocsSearchTool};
use super::registry::ToolRegistry;

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(registry: Arc<ToolRegistry>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(DocsSearchTool::create_route(registry.clone()))
        .with_route(DocsByPathTool::create_route(registry))
}
