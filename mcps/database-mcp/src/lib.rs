//! Database MCP Library
//!
//! A read-only gateway over a SQLite database: list tables, describe a
//! table, run a bounded query. Mutating statements are refused before they
//! reach the store.
//!
//! # Usage as Library
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use database_mcp::{open_store, DatabaseMcpConfig, DatabaseMcpServer, Gateway};
//!
//! let config = DatabaseMcpConfig::default();
//! let store = Arc::new(open_store(&config)?);
//! let gateway = Gateway::new(Arc::clone(&store));
//! println!("{}", gateway.list_tables_text().await);
//!
//! // Or serve it over MCP
//! let server = DatabaseMcpServer::new(gateway);
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

pub mod config;
pub mod error;
pub mod executor;
pub mod gateway;
pub mod introspect;
pub mod params;
pub mod render;
pub mod seed;
pub mod server;
pub mod store;
pub mod types;
pub mod validate;

// Re-export main types
pub use config::DatabaseMcpConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::Gateway;
pub use server::DatabaseMcpServer;
pub use store::Store;
pub use types::{ColumnDescriptor, ForeignKeyDescriptor, QueryResultRow, ScalarValue, TableSchema};
pub use validate::{validate, ValidationOutcome, ValidationPolicy};

// Re-export parameter types for direct API usage
pub use params::*;

/// Seed the sample database if configured, then open the gateway connection
pub fn open_store(config: &DatabaseMcpConfig) -> Result<Store> {
    let db = &config.database;

    if db.seed_sample_data {
        seed::seed_if_absent(&db.path)?;
    }

    Store::open(
        &db.path,
        db.read_only,
        Duration::from_secs(db.busy_timeout_secs),
    )
}

/// Build a gateway over `store` with the query settings from `config`
pub fn gateway_from_config(store: Arc<Store>, config: &DatabaseMcpConfig) -> Gateway {
    Gateway::new(store)
        .with_policy(config.query.validation)
        .with_default_limit(config.query.default_limit)
}
