//! Database MCP Server
//!
//! Serves a read-only gateway over a SQLite database on stdio.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use database_mcp::{
    gateway_from_config, open_store, DatabaseMcpConfig, DatabaseMcpServer, ValidationPolicy,
};

#[derive(Parser)]
#[command(name = "database-mcp")]
#[command(about = "Read-only MCP gateway for exploring and querying a SQLite database")]
struct Cli {
    /// Config file (default: searched in ~/.binks, ./, and the XDG config dir)
    #[arg(long, env = "DATABASE_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file, overriding the config
    #[arg(long, env = "DATABASE_MCP_PATH")]
    database: Option<PathBuf>,

    /// Do not create the sample database when the file is missing
    #[arg(long)]
    no_seed: bool,

    /// Parse queries and allow only a single read statement
    #[arg(long)]
    strict: bool,
}

impl Cli {
    fn apply(&self, config: &mut DatabaseMcpConfig) {
        if let Some(path) = &self.database {
            config.database.path = path.clone();
        }
        if self.no_seed {
            config.database.seed_sample_data = false;
        }
        if self.strict {
            config.query.validation = ValidationPolicy::Strict;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    mcp_common::init_tracing("database_mcp")?;

    tracing::info!("Starting Database MCP Server");

    let mut config = DatabaseMcpConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);

    let store = Arc::new(open_store(&config)?);
    let gateway = gateway_from_config(Arc::clone(&store), &config);
    tracing::info!(policy = ?gateway.policy(), "Gateway ready");

    let served = mcp_common::serve_stdio(DatabaseMcpServer::new(gateway)).await;

    store.close().await?;
    served
}
