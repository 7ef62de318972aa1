//! Database MCP Server implementation
//!
//! Exposes the gateway as four tools and two resources. The server owns no
//! database state of its own; the store it queries is injected through the
//! [`Gateway`].

use mcp_common::{
    async_trait, invalid_params, json_resource, json_success, resource_not_found,
    text_success, EmbeddableError, EmbeddableMcp, EmbeddableResult, McpError, McpResult,
};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, CallToolResult, ListResourceTemplatesResult, ListResourcesResult,
        PaginatedRequestParam, RawResource, RawResourceTemplate, ReadResourceRequestParam,
        ReadResourceResult, Resource, ResourceTemplate, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, RoleServer,
};
use serde_json::Value;

use crate::gateway::Gateway;
use crate::params::*;

/// URI of the structured table list
pub const TABLES_URI: &str = "database://tables";

/// Prefix of per-table schema URIs; the table name follows it
pub const SCHEMA_URI_PREFIX: &str = "database://schema/";

pub const SCHEMA_URI_TEMPLATE: &str = "database://schema/{table_name}";

const INSTRUCTIONS: &str = "Read-only database gateway. Use list_tables to see what exists, \
     describe_table for column and foreign-key details, execute_query to run a bounded \
     read-only SQL query, and get_sample_queries for examples. Mutating statements are refused.";

/// The Database MCP Server
#[derive(Clone)]
pub struct DatabaseMcpServer {
    gateway: Gateway,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl DatabaseMcpServer {
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "List all user tables in the database as a numbered list.")]
    async fn list_tables(&self) -> Result<CallToolResult, McpError> {
        Ok(text_success(self.gateway.list_tables_text().await))
    }

    #[tool(
        description = "Describe a table: each column's type, nullability, default value and primary-key flag, plus foreign keys."
    )]
    async fn describe_table(
        &self,
        Parameters(params): Parameters<DescribeTableParams>,
    ) -> Result<CallToolResult, McpError> {
        Ok(text_success(
            self.gateway.describe_table_text(&params.table_name).await,
        ))
    }

    #[tool(
        description = "Execute a read-only SQL query. Statements containing INSERT, UPDATE, DELETE, DROP, CREATE, ALTER or TRUNCATE are refused. A LIMIT (default 100, max 1000) is added when the query has none."
    )]
    async fn execute_query(
        &self,
        Parameters(params): Parameters<ExecuteQueryParams>,
    ) -> Result<CallToolResult, McpError> {
        match params.format.unwrap_or_default() {
            OutputFormat::Table => Ok(text_success(
                self.gateway.run_query_text(&params.sql, params.limit).await,
            )),
            OutputFormat::Json => {
                json_success(&self.gateway.run_query_json(&params.sql, params.limit).await)
            }
        }
    }

    #[tool(description = "Get example read-only queries for the sample employees/departments schema.")]
    async fn get_sample_queries(&self) -> Result<CallToolResult, McpError> {
        Ok(text_success(self.gateway.sample_queries_text()))
    }
}

// ============================================================================
// Resources
// ============================================================================

impl DatabaseMcpServer {
    fn resources() -> Vec<Resource> {
        let mut tables = RawResource::new(TABLES_URI, "tables");
        tables.description = Some("All user tables in the database, with a count".to_string());
        tables.mime_type = Some("application/json".to_string());
        vec![tables.no_annotation()]
    }

    fn resource_templates() -> Vec<ResourceTemplate> {
        let template = RawResourceTemplate {
            uri_template: SCHEMA_URI_TEMPLATE.to_string(),
            name: "table-schema".to_string(),
            title: None,
            description: Some("Columns and foreign keys of one table".to_string()),
            mime_type: Some("application/json".to_string()),
            icons: None,
        };
        vec![template.no_annotation()]
    }

    /// Read the resource at `uri`, or `None` if no resource matches
    async fn resource(&self, uri: &str) -> Option<McpResult<ReadResourceResult>> {
        if uri == TABLES_URI {
            return Some(json_resource(uri, &self.gateway.tables_document().await));
        }

        let segment = uri.strip_prefix(SCHEMA_URI_PREFIX)?;
        if segment.is_empty() {
            return None;
        }

        let table = match urlencoding::decode(segment) {
            Ok(table) => table,
            Err(e) => {
                return Some(Err(invalid_params(format!(
                    "table name in '{}' is not valid UTF-8: {}",
                    uri, e
                ))))
            }
        };
        Some(json_resource(uri, &self.gateway.schema_document(&table).await))
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl rmcp::ServerHandler for DatabaseMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        Ok(ListResourcesResult::with_all_items(Self::resources()))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, McpError> {
        Ok(ListResourceTemplatesResult::with_all_items(
            Self::resource_templates(),
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        match self.resource(&request.uri).await {
            Some(result) => result,
            None => Err(resource_not_found(&request.uri)),
        }
    }
}

// ============================================================================
// EmbeddableMcp Implementation
// ============================================================================

#[async_trait]
impl EmbeddableMcp for DatabaseMcpServer {
    fn server_name(&self) -> &str {
        "database"
    }

    fn server_description(&self) -> Option<&str> {
        Some(INSTRUCTIONS)
    }

    fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    async fn call_tool(&self, name: &str, params: Value) -> EmbeddableResult<CallToolResult> {
        match name {
            "list_tables" => self.list_tables().await.map_err(Into::into),

            "describe_table" => {
                let params: DescribeTableParams = serde_json::from_value(params)?;
                self.describe_table(Parameters(params))
                    .await
                    .map_err(Into::into)
            }

            "execute_query" => {
                let params: ExecuteQueryParams = serde_json::from_value(params)?;
                self.execute_query(Parameters(params))
                    .await
                    .map_err(Into::into)
            }

            "get_sample_queries" => self.get_sample_queries().await.map_err(Into::into),

            _ => Err(EmbeddableError::ToolNotFound(name.to_string())),
        }
    }

    fn list_resources(&self) -> Vec<Resource> {
        Self::resources()
    }

    fn list_resource_templates(&self) -> Vec<ResourceTemplate> {
        Self::resource_templates()
    }

    async fn read_resource(&self, uri: &str) -> EmbeddableResult<ReadResourceResult> {
        match self.resource(uri).await {
            Some(result) => result.map_err(Into::into),
            None => Err(EmbeddableError::ResourceNotFound(uri.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::create_sample_data;
    use crate::store::Store;
    use rmcp::model::{RawContent, ResourceContents};
    use rusqlite::Connection;
    use std::sync::Arc;

    fn sample_server() -> DatabaseMcpServer {
        let conn = Connection::open_in_memory().unwrap();
        create_sample_data(&conn).unwrap();
        DatabaseMcpServer::new(Gateway::new(Arc::new(Store::from_connection(conn))))
    }

    fn tool_text(result: &CallToolResult) -> String {
        match &result.content[0].raw {
            RawContent::Text(text) => text.text.clone(),
            other => panic!("expected text content, got {:?}", other),
        }
    }

    fn resource_body(result: &ReadResourceResult) -> String {
        match &result.contents[0] {
            ResourceContents::TextResourceContents { text, .. } => text.clone(),
            other => panic!("expected text resource, got {:?}", other),
        }
    }

    #[test]
    fn test_embeddable_server_name() {
        let server = sample_server();
        assert_eq!(server.server_name(), "database");
    }

    #[test]
    fn test_embeddable_list_tools() {
        let server = sample_server();
        let tools = server.list_tools();
        assert_eq!(tools.len(), 4);

        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert!(names.contains(&"list_tables"));
        assert!(names.contains(&"describe_table"));
        assert!(names.contains(&"execute_query"));
        assert!(names.contains(&"get_sample_queries"));
    }

    #[test]
    fn test_resource_listing() {
        let server = sample_server();

        let resources = EmbeddableMcp::list_resources(&server);
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].raw.uri, TABLES_URI);

        let templates = EmbeddableMcp::list_resource_templates(&server);
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].raw.uri_template, SCHEMA_URI_TEMPLATE);
    }

    #[tokio::test]
    async fn test_call_list_tables() {
        let server = sample_server();
        let result = server
            .call_tool("list_tables", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(tool_text(&result), "Database tables:\n1. employees\n2. departments\n");
    }

    #[tokio::test]
    async fn test_call_execute_query_with_limit() {
        let server = sample_server();
        let result = server
            .call_tool(
                "execute_query",
                serde_json::json!({ "sql": "SELECT * FROM employees", "limit": 2 }),
            )
            .await
            .unwrap();
        assert!(tool_text(&result).starts_with("Query returned 2 row(s):"));
    }

    #[tokio::test]
    async fn test_call_execute_query_json() {
        let server = sample_server();
        let result = server
            .call_tool(
                "execute_query",
                serde_json::json!({
                    "sql": "SELECT name FROM employees WHERE department = '工程部' ORDER BY id",
                    "format": "json"
                }),
            )
            .await
            .unwrap();

        let json: Value = serde_json::from_str(&tool_text(&result)).unwrap();
        assert_eq!(json["rows"], serde_json::json!([["张三"], ["赵六"]]));
    }

    #[tokio::test]
    async fn test_call_refused_query_is_not_an_error() {
        let server = sample_server();
        let result = server
            .call_tool(
                "execute_query",
                serde_json::json!({ "sql": "DROP TABLE employees" }),
            )
            .await
            .unwrap();
        assert!(tool_text(&result).starts_with("Query refused:"));
    }

    #[tokio::test]
    async fn test_call_describe_table_missing_param() {
        let server = sample_server();
        let result = server
            .call_tool("describe_table", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(EmbeddableError::SerdeError(_))));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let server = sample_server();
        let result = server.call_tool("drop_everything", serde_json::json!({})).await;
        assert!(matches!(result, Err(EmbeddableError::ToolNotFound(_))));
    }

    #[tokio::test]
    async fn test_read_tables_resource() {
        let server = sample_server();
        let result = EmbeddableMcp::read_resource(&server, TABLES_URI).await.unwrap();
        let json: Value = serde_json::from_str(&resource_body(&result)).unwrap();
        assert_eq!(json["count"], 2);
    }

    #[tokio::test]
    async fn test_read_schema_resource() {
        let server = sample_server();
        let result = EmbeddableMcp::read_resource(&server, "database://schema/departments")
            .await
            .unwrap();
        let body = resource_body(&result);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["tableName"], "departments");
        assert_eq!(json["columns"][1]["nullable"], false);
    }

    #[tokio::test]
    async fn test_read_schema_resource_decodes_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE \"部门 list\" (id INTEGER PRIMARY KEY, title TEXT)")
            .unwrap();
        let server =
            DatabaseMcpServer::new(Gateway::new(Arc::new(Store::from_connection(conn))));

        let uri = format!("{}{}", SCHEMA_URI_PREFIX, urlencoding::encode("部门 list"));
        let result = EmbeddableMcp::read_resource(&server, &uri).await.unwrap();
        let json: Value = serde_json::from_str(&resource_body(&result)).unwrap();
        assert_eq!(json["tableName"], "部门 list");
        assert_eq!(json["columns"][1]["name"], "title");
    }

    #[tokio::test]
    async fn test_read_schema_resource_rejects_invalid_encoding() {
        let server = sample_server();
        let result = EmbeddableMcp::read_resource(&server, "database://schema/%FF%FE").await;
        assert!(matches!(result, Err(EmbeddableError::McpError(_))));
    }

    #[tokio::test]
    async fn test_resources_on_disconnected_store_stay_json() {
        let server = DatabaseMcpServer::new(Gateway::new(Arc::new(Store::disconnected())));

        let result = EmbeddableMcp::read_resource(&server, TABLES_URI).await.unwrap();
        let json: Value = serde_json::from_str(&resource_body(&result)).unwrap();
        assert_eq!(
            json["error"],
            "Failed to list tables: database is not connected"
        );

        let result = EmbeddableMcp::read_resource(&server, "database://schema/employees")
            .await
            .unwrap();
        let json: Value = serde_json::from_str(&resource_body(&result)).unwrap();
        assert_eq!(
            json["error"],
            "Failed to get schema of table 'employees': database is not connected"
        );
    }

    #[tokio::test]
    async fn test_read_unknown_resource() {
        let server = sample_server();
        for uri in ["database://views", "database://schema/"] {
            let result = EmbeddableMcp::read_resource(&server, uri).await;
            assert!(matches!(result, Err(EmbeddableError::ResourceNotFound(_))));
        }
    }
}
