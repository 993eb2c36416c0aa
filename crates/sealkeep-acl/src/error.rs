//! Error types for access control lists.

use sealkeep_core::{CoreError, ObjectKind, ObjectUrl};
use sealkeep_store::StoreError;
use thiserror::Error;

/// Errors that can occur during ACL operations.
///
/// `Authentication` means no presented identity holds a grant that opens the
/// ciphertext. It is never used for malformed input or storage failures.
#[derive(Debug, Error)]
pub enum AclError {
    /// A secret-using or mutating operation was attempted on a public copy.
    #[error("permission denied: {0}")]
    Permission(String),

    /// A programmer or protocol error: entries read before they were
    /// materialized, or `publish` called outside a tokio runtime.
    #[error("misuse: {0}")]
    Misuse(String),

    /// Every candidate identity and token was tried and none decrypted.
    #[error("authentication failed: no usable grant for the presented identities")]
    Authentication,

    /// Crypto error other than an exhausted candidate search.
    #[error("crypto error: {0}")]
    Crypto(#[from] CoreError),

    /// Fetch, store or append failure, propagated unchanged.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// A fetched object was not of the expected kind.
    #[error("unexpected object at {url}: expected {expected}, found {found}")]
    UnexpectedObject {
        url: ObjectUrl,
        expected: ObjectKind,
        found: ObjectKind,
    },

    /// An entry could not be decoded or failed signature verification.
    #[error("invalid entry: {0}")]
    InvalidEntry(String),
}

impl AclError {
    /// Whether the persistence layer cancelled or timed out the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AclError::Persistence(e) if e.is_cancelled())
    }

    /// Whether this is an exhausted decryption search.
    pub fn is_authentication(&self) -> bool {
        matches!(self, AclError::Authentication)
    }
}

/// Result type for ACL operations.
pub type Result<T> = std::result::Result<T, AclError>;
