//! Embeddable MCP trait for in-process execution
//!
//! [`EmbeddableMcp`] lets a host drive an MCP server directly, calling tools
//! and reading resources without a transport or subprocess in between.
//!
//! ```rust,ignore
//! use mcp_common::EmbeddableMcp;
//!
//! let tools = server.list_tools();
//! let result = server.call_tool("list_tables", serde_json::json!({})).await?;
//! let tables = server.read_resource("database://tables").await?;
//! ```

use async_trait::async_trait;
use rmcp::model::{CallToolResult, ReadResourceResult, Resource, ResourceTemplate, Tool};
use serde_json::Value;

/// Error type for embeddable MCP operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddableError {
    /// Tool was not found in the server
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    /// No resource or resource template matches the URI
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// Invalid parameters passed to the tool
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    /// MCP protocol error
    #[error("mcp error: {0}")]
    McpError(String),
}

impl From<rmcp::ErrorData> for EmbeddableError {
    fn from(err: rmcp::ErrorData) -> Self {
        EmbeddableError::McpError(err.message.to_string())
    }
}

/// Result type for embeddable MCP operations
pub type EmbeddableResult<T> = Result<T, EmbeddableError>;

/// Trait for MCP servers that can be executed in-process
///
/// Implementations must be `Send + Sync` so a host can issue concurrent
/// calls from multiple tasks. Servers built on `#[tool_router]` typically
/// answer [`list_tools`](EmbeddableMcp::list_tools) from their router and
/// dispatch [`call_tool`](EmbeddableMcp::call_tool) by name.
///
/// Resource support is optional; the defaults advertise nothing and
/// reject every URI.
#[async_trait]
pub trait EmbeddableMcp: Send + Sync {
    /// Server name, matching the name used in MCP configuration files
    fn server_name(&self) -> &str;

    /// All available tools with their input schemas
    fn list_tools(&self) -> Vec<Tool>;

    /// Execute a tool by name with a JSON object of parameters
    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult>;

    /// Concrete resources the server exposes
    fn list_resources(&self) -> Vec<Resource> {
        Vec::new()
    }

    /// URI templates for parameterized resources
    fn list_resource_templates(&self) -> Vec<ResourceTemplate> {
        Vec::new()
    }

    /// Read the resource addressed by `uri`
    async fn read_resource(&self, uri: &str) -> EmbeddableResult<ReadResourceResult> {
        Err(EmbeddableError::ResourceNotFound(uri.to_string()))
    }

    /// Optional description used for documentation and discovery
    fn server_description(&self) -> Option<&str> {
        None
    }
}
