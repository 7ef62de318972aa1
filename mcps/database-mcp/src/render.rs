//! Result rendering
//!
//! Structured output is JSON values; a failure becomes `{"error": ...}`.
//! Tabular output is fixed-width plain text for humans.

use serde::Serialize;

use crate::types::{QueryResultRow, ScalarValue, TableSchema};

/// Width of every column in tabular output, in characters
pub const COLUMN_WIDTH: usize = 15;

/// Text shown in place of a null value
pub const NULL_TEXT: &str = "NULL";

pub const NO_ROWS_MESSAGE: &str = "Query succeeded but no rows were returned";

const RULE_WIDTH: usize = 50;

// ============================================================================
// Structured
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TablesDocument<'a> {
    pub tables: &'a [String],
    pub count: usize,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDocument<'a> {
    pub columns: Vec<&'a str>,
    pub rows: Vec<Vec<&'a ScalarValue>>,
    pub row_count: usize,
}

pub fn tables_document(tables: &[String]) -> TablesDocument<'_> {
    TablesDocument {
        tables,
        count: tables.len(),
        description: "All user tables available in the database",
    }
}

pub fn query_document(rows: &[QueryResultRow]) -> QueryDocument<'_> {
    QueryDocument {
        columns: rows
            .first()
            .map(|row| row.columns().collect())
            .unwrap_or_default(),
        rows: rows.iter().map(|row| row.values().collect()).collect(),
        row_count: rows.len(),
    }
}

/// Convert a document to a JSON value, or an error document if it cannot be
pub fn to_value<T: Serialize>(document: &T) -> serde_json::Value {
    serde_json::to_value(document)
        .unwrap_or_else(|e| error_document(&format!("Failed to render document: {}", e)))
}

/// JSON body standing in for a document that could not be produced
pub fn error_document(message: &str) -> serde_json::Value {
    serde_json::json!({ "error": message })
}

// ============================================================================
// Text
// ============================================================================

/// Numbered list of table names
pub fn table_list(tables: &[String]) -> String {
    if tables.is_empty() {
        return "No tables found in the database".to_string();
    }

    let mut out = String::from("Database tables:\n");
    for (i, table) in tables.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, table));
    }
    out
}

/// Labeled column and foreign-key report for one table
pub fn schema_report(schema: &TableSchema) -> String {
    if schema.is_empty() {
        return format!(
            "Table '{}' was not found or has no columns",
            schema.table_name
        );
    }

    let rule = "-".repeat(RULE_WIDTH);
    let mut out = format!("Table '{}' structure:\n\nColumns:\n{}\n", schema.table_name, rule);

    for col in &schema.columns {
        out.push_str(&format!("Column: {}\n", col.name));
        out.push_str(&format!("  Type: {}\n", col.declared_type));
        out.push_str(&format!("  Nullable: {}\n", yes_no(col.nullable)));
        out.push_str(&format!(
            "  Default: {}\n",
            col.default_value.as_deref().unwrap_or("none")
        ));
        out.push_str(&format!("  Primary key: {}\n\n", yes_no(col.is_primary_key)));
    }

    if !schema.foreign_keys.is_empty() {
        out.push_str(&format!("Foreign keys:\n{}\n", rule));
        for fk in &schema.foreign_keys {
            out.push_str(&format!(
                "{} -> {}.{}\n",
                fk.column, fk.referenced_table, fk.referenced_column
            ));
        }
    }

    out
}

/// Fixed-width table of query rows
pub fn rows_table(rows: &[QueryResultRow]) -> String {
    let Some(first) = rows.first() else {
        return NO_ROWS_MESSAGE.to_string();
    };

    let header = first.columns().map(cell).collect::<Vec<_>>().join(" | ");

    let mut out = format!(
        "Query returned {} row(s):\n{}\n{}\n{}\n",
        rows.len(),
        "=".repeat(RULE_WIDTH),
        header,
        "-".repeat(header.chars().count())
    );

    for row in rows {
        let line = row
            .values()
            .map(|value| cell(&scalar_text(value)))
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(&line);
        out.push('\n');
    }

    out
}

fn scalar_text(value: &ScalarValue) -> String {
    if value.is_null() {
        NULL_TEXT.to_string()
    } else {
        value.to_string()
    }
}

/// Left-align `text` in a column, cutting it at [`COLUMN_WIDTH`] characters
fn cell(text: &str) -> String {
    let clipped: String = text.chars().take(COLUMN_WIDTH).collect();
    format!("{:<width$}", clipped, width = COLUMN_WIDTH)
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}
