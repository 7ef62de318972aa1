//! Configuration for the database MCP server

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::executor::DEFAULT_LIMIT;
use crate::validate::ValidationPolicy;

/// Database MCP configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseMcpConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub query: QueryConfig,
}

/// Database connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    #[serde(default = "default_path")]
    pub path: PathBuf,

    /// Open the gateway connection read-only
    /// Default: true
    #[serde(default = "default_true")]
    pub read_only: bool,

    /// How long SQLite waits on a locked database, in seconds
    /// Default: 30
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    /// Create the sample database when the file does not exist
    /// Default: true
    #[serde(default = "default_true")]
    pub seed_sample_data: bool,
}

/// Query handling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Row limit applied when a caller does not pass one
    #[serde(default = "default_limit")]
    pub default_limit: i64,

    /// How queries are checked before they run
    #[serde(default)]
    pub validation: ValidationPolicy,
}

fn default_path() -> PathBuf {
    PathBuf::from("example.db")
}

fn default_true() -> bool {
    true
}

fn default_busy_timeout() -> u64 {
    30
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            read_only: true,
            busy_timeout_secs: default_busy_timeout(),
            seed_sample_data: true,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            validation: ValidationPolicy::default(),
        }
    }
}

impl DatabaseMcpConfig {
    /// Load configuration
    ///
    /// An explicit path (from `--config` or `DATABASE_MCP_CONFIG`) must exist
    /// and parse. Otherwise the first readable file among these wins:
    /// 1. `~/.binks/database.toml`
    /// 2. `./database-mcp.toml`
    /// 3. `$XDG_CONFIG_HOME/database-mcp/config.toml`
    ///
    /// Falls back to defaults when none is found.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            tracing::info!("Loaded config from {}", path.display());
            return Ok(config);
        }

        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    return Ok(config);
                }
                Err(e) => tracing::warn!("Skipping config {}: {:#}", path.display(), e),
            }
        }

        tracing::info!("Using default configuration");
        Ok(Self::default())
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {:?}", path))
    }

    fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".binks").join("database.toml"));
        }

        paths.push(PathBuf::from("database-mcp.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("database-mcp").join("config.toml"));
        }

        paths
    }

    /// Create a config pointing at a specific database with everything else default
    pub fn with_database(path: PathBuf) -> Self {
        Self {
            database: DatabaseConfig {
                path,
                ..DatabaseConfig::default()
            },
            query: QueryConfig::default(),
        }
    }
}
