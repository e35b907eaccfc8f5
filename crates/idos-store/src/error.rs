//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record body could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("record not found: {table}/{id}")]
    NotFound { table: String, id: String },

    #[error("record already exists: {table}/{id}")]
    AlreadyExists { table: String, id: String },

    /// A record is missing a required field or has one of the wrong type.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A blocking task panicked or was cancelled.
    #[error("background task failed: {0}")]
    Task(String),

    /// A lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Lock(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
