//! `docs-search`: free-text search over the Kestra documentation.

use std::sync::Arc;

use futures::FutureExt;
use rmcp::{
    handler::server::tool::{ToolCallContext, ToolRoute, cached_schema_for_type},
    model::{CallToolResult, JsonObject, Tool},
};
use tracing::{info, instrument};

use super::super::common::{doc_result, parse_query};
use crate::domains::docs::{DocQuery, DocResult, DocsPipeline};
use crate::domains::tools::{ToolError, ToolRegistry};

/// Documentation search tool.
#[derive(Debug, Clone)]
pub struct DocsSearchTool;

impl DocsSearchTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "docs-search";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Search Kestra documentation to find answers about Kestra functionality, workflows, plugins, and more";

    /// Run a search. Lookup failures come back as sentinel documents.
    #[instrument(skip_all, fields(query))]
    pub async fn execute(
        arguments: JsonObject,
        pipeline: &DocsPipeline,
    ) -> Result<CallToolResult, ToolError> {
        let params = parse_query(arguments)?;
        tracing::Span::current().record("query", params.query.as_str());

        let retrieval = pipeline.search(&params.query, params.filter.as_ref()).await;
        info!(outcome = retrieval.outcome.as_str(), "Search finished");

        doc_result(retrieval.result)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: cached_schema_for_type::<DocQuery>(),
            annotations: None,
            output_schema: Some(cached_schema_for_type::<DocResult>()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute that dispatches through the registry.
    pub fn create_route<S>(registry: Arc<ToolRegistry>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let registry = registry.clone();
            async move { Ok(registry.call_tool(Self::NAME, args).await?) }.boxed()
        })
    }
}
