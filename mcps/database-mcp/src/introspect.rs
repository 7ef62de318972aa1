//! Schema introspection against the SQLite catalog
//!
//! Nothing here is cached: every call reads the live catalog.

use rusqlite::Connection;

use crate::error::GatewayResult;
use crate::types::{ColumnDescriptor, ForeignKeyDescriptor, TableSchema};

/// User tables in catalog order, skipping SQLite's internal `sqlite_` tables
pub fn list_tables(conn: &Connection) -> GatewayResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
    )?;

    let tables = stmt
        .query_map([], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(tables)
}

/// Columns and foreign keys of `table`
///
/// An unknown table is not an error; it comes back with no columns.
pub fn describe_table(conn: &Connection, table: &str) -> GatewayResult<TableSchema> {
    let mut stmt = conn.prepare(
        "SELECT name, type, \"notnull\", dflt_value, pk FROM pragma_table_info(?1) ORDER BY cid",
    )?;

    let columns = stmt
        .query_map([table], |row| {
            Ok(ColumnDescriptor {
                name: row.get(0)?,
                declared_type: row.get(1)?,
                nullable: row.get::<_, i64>(2)? == 0,
                default_value: row.get(3)?,
                is_primary_key: row.get::<_, i64>(4)? != 0,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut stmt = conn.prepare(
        "SELECT \"from\", \"table\", \"to\" FROM pragma_foreign_key_list(?1)",
    )?;

    let foreign_keys = stmt
        .query_map([table], |row| {
            Ok(ForeignKeyDescriptor {
                column: row.get(0)?,
                referenced_table: row.get(1)?,
                // NULL when the reference targets the parent's primary key implicitly
                referenced_column: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TableSchema {
        table_name: table.to_string(),
        columns,
        foreign_keys,
    })
}
