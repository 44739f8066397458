//! Store Error Types

use thiserror::Error;

/// Store result type
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend is unreachable or failed
    #[error("Database error: {0}")]
    Database(String),

    /// Stored bytes could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid query parameters
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery(message.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        Self::Database(err.to_string())
    }
}
