//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Object serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No object stored under this url.
    #[error("object not found: {0}")]
    NotFound(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The operation was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// The backend gave up waiting.
    #[error("operation timed out: {0}")]
    Timeout(String),
}

impl StoreError {
    /// True for `Cancelled` and `Timeout`.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, StoreError::Cancelled | StoreError::Timeout(_))
    }
}

impl From<sealkeep_core::CoreError> for StoreError {
    fn from(err: sealkeep_core::CoreError) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
