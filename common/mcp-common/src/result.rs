//! Result helpers for MCP tool and resource responses

use rmcp::model::{CallToolResult, Content, ReadResourceResult, ResourceContents};
use serde::Serialize;

use crate::error::{internal_error, McpResult};

/// Create a successful tool response holding pretty-printed JSON
///
/// ```rust,ignore
/// #[derive(Serialize)]
/// struct Tables { count: usize }
///
/// json_success(&Tables { count: 2 })
/// ```
pub fn json_success<T: Serialize>(data: &T) -> McpResult<CallToolResult> {
    let json = serde_json::to_string_pretty(data).map_err(|e| internal_error(e.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Create a successful plain text tool response
pub fn text_success(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

/// Wrap text as the contents of the resource at `uri`
fn text_resource(uri: impl Into<String>, text: impl Into<String>) -> ReadResourceResult {
    ReadResourceResult {
        contents: vec![ResourceContents::text(text.into(), uri.into())],
    }
}

/// Serialize `data` as pretty JSON and wrap it as the resource at `uri`
pub fn json_resource<T: Serialize>(
    uri: impl Into<String>,
    data: &T,
) -> McpResult<ReadResourceResult> {
    let json = serde_json::to_string_pretty(data).map_err(|e| internal_error(e.to_string()))?;
    Ok(text_resource(uri, json))
}
