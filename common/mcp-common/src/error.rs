//! Protocol-level error constructors
//!
//! Domain crates keep their own `thiserror` taxonomies and only reach for
//! these when a failure has to cross the MCP boundary as an error response.

use rmcp::ErrorData as McpError;

/// Type alias for MCP handler results
pub type McpResult<T> = Result<T, McpError>;

/// Create an internal error with a message
pub fn internal_error(message: impl Into<String>) -> McpError {
    McpError::internal_error(message.into(), None)
}

/// Create an invalid params error with a message
///
/// Use this when a tool or resource receives arguments it cannot decode.
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

/// Create a resource-not-found error carrying the requested URI
pub fn resource_not_found(uri: &str) -> McpError {
    McpError::resource_not_found(
        format!("unknown resource: {}", uri),
        Some(serde_json::json!({ "uri": uri })),
    )
}
