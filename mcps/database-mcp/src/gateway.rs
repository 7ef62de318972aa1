//! Gateway facade
//!
//! The single entry point callers use. Each `*_text` / `*_document`
//! operation is total: collaborator failures come back as descriptive text
//! with an operation-specific label, never as an error. JSON documents carry
//! the same text under an `error` key.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{GatewayError, GatewayResult};
use crate::executor::{BoundedExecutor, DEFAULT_LIMIT};
use crate::introspect;
use crate::render;
use crate::store::Store;
use crate::types::{QueryResultRow, TableSchema};
use crate::validate::{validate_with, ValidationOutcome, ValidationPolicy};

const SAMPLE_QUERIES: &[&str] = &[
    "-- All employees",
    "SELECT * FROM employees;",
    "",
    "-- Head count per department",
    "SELECT department, COUNT(*) AS employee_count FROM employees GROUP BY department;",
    "",
    "-- Engineering staff by salary",
    "SELECT name, salary FROM employees WHERE department = '工程部' ORDER BY salary DESC;",
    "",
    "-- Departments ranked by average salary",
    "SELECT department, AVG(salary) AS avg_salary FROM employees GROUP BY department ORDER BY avg_salary DESC;",
    "",
    "-- All departments",
    "SELECT * FROM departments;",
];

#[derive(Clone)]
pub struct Gateway {
    store: Arc<Store>,
    policy: ValidationPolicy,
    default_limit: i64,
}

impl Gateway {
    pub fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            policy: ValidationPolicy::default(),
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    // ------------------------------------------------------------------------
    // Typed operations
    // ------------------------------------------------------------------------

    pub async fn list_tables(&self) -> GatewayResult<Vec<String>> {
        self.store.with_connection(introspect::list_tables).await
    }

    pub async fn describe_table(&self, name: &str) -> GatewayResult<TableSchema> {
        self.store
            .with_connection(|conn| introspect::describe_table(conn, name))
            .await
    }

    /// Validate `sql` and, if accepted, execute it with a bounded row count
    ///
    /// A rejected query never reaches the store.
    pub async fn run_query(
        &self,
        sql: &str,
        limit: Option<i64>,
    ) -> GatewayResult<Vec<QueryResultRow>> {
        let query = match validate_with(self.policy, sql) {
            ValidationOutcome::Accepted(query) => query,
            ValidationOutcome::Rejected(reason) => {
                return Err(GatewayError::ValidationRejected(reason))
            }
        };

        let executor = match self.policy {
            ValidationPolicy::Denylist => BoundedExecutor::new(),
            ValidationPolicy::Strict => BoundedExecutor::enforcing_readonly(),
        };
        let limit = limit.unwrap_or(self.default_limit);

        self.store
            .with_connection(|conn| executor.execute(conn, &query, limit))
            .await
    }

    // ------------------------------------------------------------------------
    // Text operations
    // ------------------------------------------------------------------------

    pub async fn list_tables_text(&self) -> String {
        match self.list_tables().await {
            Ok(tables) => render::table_list(&tables),
            Err(e) => failure("Failed to list tables", e),
        }
    }

    pub async fn describe_table_text(&self, name: &str) -> String {
        match self.describe_table(name).await {
            Ok(schema) => render::schema_report(&schema),
            Err(e) => failure("Failed to describe table", e),
        }
    }

    pub async fn run_query_text(&self, sql: &str, limit: Option<i64>) -> String {
        match self.run_query(sql, limit).await {
            Ok(rows) => render::rows_table(&rows),
            Err(e) => query_failure(e),
        }
    }

    /// Run a query and return the structured `{columns, rows, rowCount}` document
    pub async fn run_query_json(&self, sql: &str, limit: Option<i64>) -> Value {
        match self.run_query(sql, limit).await {
            Ok(rows) => render::to_value(&render::query_document(&rows)),
            Err(e) => render::error_document(&query_failure(e)),
        }
    }

    /// Illustrative read-only queries against the sample schema
    pub fn sample_queries_text(&self) -> String {
        SAMPLE_QUERIES.join("\n")
    }

    // ------------------------------------------------------------------------
    // Structured operations
    // ------------------------------------------------------------------------

    pub async fn tables_document(&self) -> Value {
        match self.list_tables().await {
            Ok(tables) => render::to_value(&render::tables_document(&tables)),
            Err(e) => render::error_document(&failure("Failed to list tables", e)),
        }
    }

    pub async fn schema_document(&self, name: &str) -> Value {
        match self.describe_table(name).await {
            Ok(schema) => render::to_value(&schema),
            Err(e) => render::error_document(&failure(
                &format!("Failed to get schema of table '{}'", name),
                e,
            )),
        }
    }
}

fn failure(label: &str, err: GatewayError) -> String {
    tracing::warn!(error = %err, "{}", label);
    format!("{}: {}", label, err)
}

fn query_failure(err: GatewayError) -> String {
    match err {
        GatewayError::ValidationRejected(reason) => {
            tracing::warn!(%reason, "Query refused");
            format!("Query refused: {}", reason)
        }
        other => failure("Query failed", other),
    }
}
