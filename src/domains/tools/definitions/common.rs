//! Helpers shared by the documentation tools.

use rmcp::model::{CallToolResult, Content, JsonObject};
use serde::de::DeserializeOwned;
use tracing::error;

use crate::domains::docs::{DocQuery, DocResult};
use crate::domains::tools::ToolError;

/// Deserialize tool arguments into `T`.
pub fn parse_params<T: DeserializeOwned>(arguments: JsonObject) -> Result<T, ToolError> {
    serde_json::from_value(serde_json::Value::Object(arguments))
        .map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

/// Deserialize a [`DocQuery`], rejecting blank queries.
pub fn parse_query(arguments: JsonObject) -> Result<DocQuery, ToolError> {
    let query: DocQuery = parse_params(arguments)?;
    if query.query.trim().is_empty() {
        return Err(ToolError::invalid_arguments("query must not be blank"));
    }
    Ok(query)
}

/// Wrap a [`DocResult`] as structured content plus its JSON text.
///
/// A result without a path breaks the output contract and is reported as an
/// internal error rather than sent.
pub fn doc_result(doc: DocResult) -> Result<CallToolResult, ToolError> {
    if doc.path.trim().is_empty() {
        error!("Refusing to return a document without a path");
        return Err(ToolError::internal("document result has an empty path"));
    }

    let structured = serde_json::to_value(&doc).map_err(|e| {
        error!("Failed to serialize document result: {}", e);
        ToolError::internal(e.to_string())
    })?;
    let text = serde_json::to_string_pretty(&structured)
        .map_err(|e| ToolError::internal(e.to_string()))?;

    Ok(CallToolResult {
        content: vec![Content::text(text)],
        structured_content: Some(structured),
        is_error: Some(false),
        meta: None,
    })
}
