//! `docs-by-path`: fetch one documentation page by path or URL.

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

/// Documentation page lookup tool.
///
/// Takes the same input as `docs-search`; `query` is the locator and
/// `filter` is ignored.
#[derive(Debug, Clone)]
pub struct DocsByPathTool;

impl DocsByPathTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "docs-by-path";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str =
        "Retrieve a specific Kestra documentation page by its path";

    #[instrument(skip_all, fields(locator))]
    pub async fn execute(
        arguments: JsonObject,
        pipeline: &DocsPipeline,
    ) -> Result<CallToolResult, ToolError> {
        let params = parse_query(arguments)?;
        tracing::Span::current().record("locator", params.query.as_str());

        let retrieval = pipeline.fetch_by_path(&params.query).await;
        info!(outcome = retrieval.outcome.as_str(), "Lookup finished");

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
