//! Error taxonomy for gateway operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The store connection is not open
    #[error("database is not connected")]
    NotConnected,

    /// The query was refused before reaching the store
    #[error("{0}")]
    ValidationRejected(String),

    /// The store failed to run a query or catalog lookup
    #[error("{0}")]
    ExecutionFailed(String),
}

impl From<rusqlite::Error> for GatewayError {
    fn from(err: rusqlite::Error) -> Self {
        GatewayError::ExecutionFailed(err.to_string())
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
