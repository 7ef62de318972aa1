//! Sample database used for demos and tests
//!
//! Two small tables, `employees` and `departments`, with a handful of rows.

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

const SAMPLE_SCHEMA: &str = r#"
BEGIN;

CREATE TABLE employees (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    department TEXT,
    salary REAL,
    hire_date DATE
);

CREATE TABLE departments (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    budget REAL
);

INSERT INTO departments VALUES (1, '工程部', 500000);
INSERT INTO departments VALUES (2, '销售部', 300000);
INSERT INTO departments VALUES (3, '人事部', 200000);

INSERT INTO employees VALUES (1, '张三', '工程部', 80000, '2023-01-15');
INSERT INTO employees VALUES (2, '李四', '销售部', 60000, '2023-02-20');
INSERT INTO employees VALUES (3, '王五', '人事部', 55000, '2023-03-10');
INSERT INTO employees VALUES (4, '赵六', '工程部', 75000, '2023-04-05');

COMMIT;
"#;

/// Create the sample tables and rows on `conn`
pub fn create_sample_data(conn: &Connection) -> Result<()> {
    conn.execute_batch(SAMPLE_SCHEMA)
        .context("Failed to create sample data")
}

/// Create a sample database file at `path` unless the file already exists
///
/// Returns `true` when a new database was written. Uses its own short-lived
/// connection so the gateway connection can be opened read-only afterwards.
pub fn seed_if_absent(path: &Path) -> Result<bool> {
    if path.exists() {
        tracing::debug!(path = %path.display(), "Database file exists, skipping seed");
        return Ok(false);
    }

    let conn = Connection::open(path)
        .with_context(|| format!("Failed to create database at {:?}", path))?;
    create_sample_data(&conn)?;
    conn.close()
        .map_err(|(_, e)| e)
        .context("Failed to close seeding connection")?;

    tracing::info!(path = %path.display(), "Sample database created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_row_counts() {
        let conn = Connection::open_in_memory().unwrap();
        create_sample_data(&conn).unwrap();

        let employees: i64 = conn
            .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
            .unwrap();
        let departments: i64 = conn
            .query_row("SELECT COUNT(*) FROM departments", [], |row| row.get(0))
            .unwrap();

        assert_eq!(employees, 4);
        assert_eq!(departments, 3);
    }

    #[test]
    fn test_seed_if_absent_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.db");

        assert!(seed_if_absent(&path).unwrap());
        assert!(path.exists());
        assert!(!seed_if_absent(&path).unwrap());

        let conn = Connection::open(&path).unwrap();
        let employees: i64 = conn
            .query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))
            .unwrap();
        assert_eq!(employees, 4);
    }
}
