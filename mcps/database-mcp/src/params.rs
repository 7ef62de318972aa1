//! Parameter types for Database MCP tools

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DescribeTableParams {
    #[schemars(description = "Name of the table to describe")]
    pub table_name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteQueryParams {
    #[schemars(description = "Read-only SQL query to execute (SELECT statements only)")]
    pub sql: String,

    #[schemars(
        description = "Maximum rows to return when the query has no LIMIT clause (1-1000, default 100)"
    )]
    #[serde(default)]
    pub limit: Option<i64>,

    #[schemars(description = "Output format: 'table' (default) or 'json'")]
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
