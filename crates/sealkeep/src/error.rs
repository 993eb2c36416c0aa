//! Error types for Sealkeep.

use sealkeep_acl::AclError;
use sealkeep_core::CoreError;
use sealkeep_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Sealkeep operations.
#[derive(Debug, Error)]
pub enum KernelError {
    /// ACL error, including `Permission`, `Misuse` and `Authentication`.
    #[error("{0}")]
    Acl(#[from] AclError),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// The value claims to be an envelope but is not a valid one.
    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Payload (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl KernelError {
    /// Whether no presented identity could open the payload.
    pub fn is_authentication(&self) -> bool {
        matches!(self, KernelError::Acl(e) if e.is_authentication())
    }

    /// Whether the persistence layer cancelled or timed out.
    pub fn is_cancelled(&self) -> bool {
        match self {
            KernelError::Acl(e) => e.is_cancelled(),
            KernelError::Store(e) => e.is_cancelled(),
            _ => false,
        }
    }
}

/// Result type for Sealkeep operations.
pub type Result<T> = std::result::Result<T, KernelError>;
