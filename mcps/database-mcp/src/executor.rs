//! Bounded query execution
//!
//! Queries reaching this module must already have passed validation; the
//! executor only bounds the row count and runs them.

use rusqlite::{types::Value, Batch, Connection};

use crate::error::{GatewayError, GatewayResult};
use crate::types::{QueryResultRow, ScalarValue};
use crate::validate::READ_ONLY_REASON;

/// Row limit used when the caller does not give one
pub const DEFAULT_LIMIT: i64 = 100;

/// Largest row limit the executor will inject
pub const MAX_LIMIT: i64 = 1000;

/// Failure reported when the query text holds more than one statement
pub const SINGLE_STATEMENT_REASON: &str = "only one statement may be executed at a time";

/// Clamp a caller-supplied limit into `1..=MAX_LIMIT`
pub fn clamp_limit(limit: i64) -> i64 {
    limit.clamp(1, MAX_LIMIT)
}

/// Rewrite `query` so it ends with exactly one `;` and, unless it already
/// mentions `limit`, carries `LIMIT <limit>`
///
/// The caller's own `LIMIT` is never overridden, even when it is larger
/// than [`MAX_LIMIT`].
pub fn bound_query(query: &str, limit: i64) -> String {
    let body = query.trim_end_matches(|c: char| c == ';' || c.is_whitespace());

    if query.to_lowercase().contains("limit") {
        return format!("{};", body);
    }

    // A trailing line comment would swallow a clause appended on the same line
    let separator = match body.lines().last() {
        Some(line) if line.contains("--") => "\n",
        _ => " ",
    };
    format!("{}{}LIMIT {};", body, separator, limit)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundedExecutor {
    enforce_readonly: bool,
}

impl BoundedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor that also refuses statements SQLite reports as writing
    pub fn enforcing_readonly() -> Self {
        Self {
            enforce_readonly: true,
        }
    }

    /// Run `query` with a clamped row limit and materialize every row
    pub fn execute(
        &self,
        conn: &Connection,
        query: &str,
        limit: i64,
    ) -> GatewayResult<Vec<QueryResultRow>> {
        let sql = bound_query(query, clamp_limit(limit));
        tracing::debug!(%sql, "Executing bounded query");

        // `prepare` alone compiles the first statement and drops the rest
        let mut batch = Batch::new(conn, &sql);
        let mut stmt = batch
            .next()?
            .ok_or_else(|| GatewayError::ExecutionFailed("query is empty".to_string()))?;
        if !matches!(batch.next(), Ok(None)) {
            return Err(GatewayError::ExecutionFailed(
                SINGLE_STATEMENT_REASON.to_string(),
            ));
        }

        if self.enforce_readonly && !stmt.readonly() {
            return Err(GatewayError::ValidationRejected(READ_ONLY_REASON.to_string()));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map([], |row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, name)| {
                        let value: Value = row.get(i)?;
                        Ok((name.as_str(), ScalarValue::from(value)))
                    })
                    .collect::<rusqlite::Result<QueryResultRow>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rows = rows.len(), "Query completed");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::create_sample_data;

    fn sample_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_sample_data(&conn).unwrap();
        conn
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(5000), 1000);
        assert_eq!(clamp_limit(1000), 1000);
        assert_eq!(clamp_limit(100), 100);
        assert_eq!(clamp_limit(0), 1);
        assert_eq!(clamp_limit(-7), 1);
    }

    #[test]
    fn test_bound_query_appends_limit() {
        assert_eq!(
            bound_query("SELECT * FROM employees", 2),
            "SELECT * FROM employees LIMIT 2;"
        );
    }

    #[test]
    fn test_bound_query_keeps_single_terminator() {
        assert_eq!(
            bound_query("SELECT * FROM employees;  ", 5),
            "SELECT * FROM employees LIMIT 5;"
        );
        assert_eq!(
            bound_query("SELECT * FROM employees;;", 5),
            "SELECT * FROM employees LIMIT 5;"
        );
    }

    #[test]
    fn test_bound_query_respects_existing_limit() {
        assert_eq!(
            bound_query("SELECT * FROM employees Limit 1", 100),
            "SELECT * FROM employees Limit 1;"
        );
        assert_eq!(
            bound_query("SELECT * FROM employees LIMIT 5000;", 1000),
            "SELECT * FROM employees LIMIT 5000;"
        );
    }

    #[test]
    fn test_bound_query_after_line_comment() {
        assert_eq!(
            bound_query("SELECT * FROM employees -- everyone", 3),
            "SELECT * FROM employees -- everyone\nLIMIT 3;"
        );
    }

    #[test]
    fn test_limit_injection_caps_rows() {
        let conn = sample_conn();
        let rows = BoundedExecutor::new()
            .execute(&conn, "SELECT * FROM employees", 2)
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_multiple_statements_fail_without_running() {
        let conn = sample_conn();
        let executor = BoundedExecutor::new();

        for query in [
            "SELECT * FROM employees; SELECT 1",
            "SELECT * FROM employees; SELECT * FROM nowhere",
            "SELECT * FROM employees LIMIT 3; DELETE FROM employees",
        ] {
            match executor.execute(&conn, query, 2) {
                Err(GatewayError::ExecutionFailed(message)) => {
                    assert_eq!(message, SINGLE_STATEMENT_REASON, "{}", query)
                }
                other => panic!("expected ExecutionFailed for {:?}, got {:?}", query, other),
            }
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_trailing_comments_are_not_statements() {
        let conn = sample_conn();
        let executor = BoundedExecutor::new();

        for query in [
            "SELECT * FROM employees -- note\n",
            "SELECT * FROM employees /* c */",
        ] {
            assert_eq!(executor.execute(&conn, query, 2).unwrap().len(), 2);
        }
    }

    #[test]
    fn test_caller_limit_wins() {
        let conn = sample_conn();
        let rows = BoundedExecutor::new()
            .execute(&conn, "SELECT * FROM employees LIMIT 1", 100)
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_out_of_range_limits_behave_like_bounds() {
        let conn = sample_conn();
        let executor = BoundedExecutor::new();
        let query = "SELECT id FROM employees ORDER BY id";

        assert_eq!(
            executor.execute(&conn, query, 5000).unwrap(),
            executor.execute(&conn, query, 1000).unwrap()
        );
        assert_eq!(
            executor.execute(&conn, query, 0).unwrap(),
            executor.execute(&conn, query, 1).unwrap()
        );
        assert_eq!(executor.execute(&conn, query, 0).unwrap().len(), 1);
    }

    #[test]
    fn test_rows_keep_column_order_and_types() {
        let conn = sample_conn();
        let rows = BoundedExecutor::new()
            .execute(
                &conn,
                "SELECT name, salary, id, NULL AS note FROM employees ORDER BY id",
                10,
            )
            .unwrap();

        assert_eq!(rows.len(), 4);
        let first = &rows[0];
        assert_eq!(
            first.columns().collect::<Vec<_>>(),
            vec!["name", "salary", "id", "note"]
        );
        assert_eq!(first.get("name"), Some(&ScalarValue::Text("张三".into())));
        assert_eq!(first.get("salary"), Some(&ScalarValue::Real(80000.0)));
        assert_eq!(first.get("id"), Some(&ScalarValue::Integer(1)));
        assert_eq!(first.get("note"), Some(&ScalarValue::Null));
    }

    #[test]
    fn test_store_errors_become_execution_failed() {
        let conn = sample_conn();
        let result = BoundedExecutor::new().execute(&conn, "SELECT * FROM missing_table", 10);
        match result {
            Err(GatewayError::ExecutionFailed(message)) => {
                assert!(message.contains("missing_table"))
            }
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_readonly_enforcement_refuses_writes() {
        let conn = sample_conn();
        // Mentions LIMIT so nothing is appended to the DELETE
        let result = BoundedExecutor::enforcing_readonly().execute(
            &conn,
            "DELETE FROM employees WHERE id IN (SELECT id FROM employees LIMIT 10)",
            10,
        );
        assert!(matches!(result, Err(GatewayError::ValidationRejected(_))));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }
}
