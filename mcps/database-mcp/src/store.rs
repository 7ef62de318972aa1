//! Shared store connection
//!
//! The process opens one SQLite connection at startup and closes it at
//! shutdown. Every store-touching call goes through [`Store::with_connection`],
//! which holds the mutex for the whole round trip, so concurrent callers are
//! served one at a time.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use tokio::sync::Mutex;

use crate::error::{GatewayError, GatewayResult};

pub struct Store {
    conn: Mutex<Option<Connection>>,
}

impl Store {
    /// Open the database file at `path`
    ///
    /// With `read_only` set the file must already exist and SQLite itself
    /// refuses any write on this connection.
    pub fn open(path: &Path, read_only: bool, busy_timeout: Duration) -> Result<Self> {
        let flags = if read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::default()
        };

        let conn = Connection::open_with_flags(path, flags)
            .with_context(|| format!("Failed to open database at {:?}", path))?;
        conn.busy_timeout(busy_timeout)
            .context("Failed to set busy timeout")?;

        tracing::info!(path = %path.display(), read_only, "Database connection established");
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(Some(conn)),
        }
    }

    /// A store with no connection; every call fails with `NotConnected`
    pub fn disconnected() -> Self {
        Self {
            conn: Mutex::new(None),
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.conn.lock().await.is_some()
    }

    /// Run `f` with exclusive access to the live connection
    pub async fn with_connection<T, F>(&self, f: F) -> GatewayResult<T>
    where
        F: FnOnce(&Connection) -> GatewayResult<T>,
    {
        let guard = self.conn.lock().await;
        let conn = guard.as_ref().ok_or(GatewayError::NotConnected)?;
        f(conn)
    }

    /// Close the connection; later calls fail with `NotConnected`
    pub async fn close(&self) -> Result<()> {
        let conn = self.conn.lock().await.take();
        if let Some(conn) = conn {
            conn.close()
                .map_err(|(_, e)| e)
                .context("Failed to close database connection")?;
            tracing::info!("Database connection closed");
        }
        Ok(())
    }
}
