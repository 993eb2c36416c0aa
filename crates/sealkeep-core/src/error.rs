//! Error types for Sealkeep Core.

use thiserror::Error;

/// Errors raised by the core primitives.
///
/// `DecryptionFailed` is the only variant that means "this key does not open
/// this ciphertext". Callers searching over candidate keys may retry on it and
/// must propagate everything else.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("decryption failed: wrong key or tampered ciphertext")]
    DecryptionFailed,

    #[error("malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("invalid signature")]
    InvalidSignature,

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("invalid object url: {0}")]
    InvalidUrl(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("decoding error: {0}")]
    Decoding(String),
}

impl CoreError {
    /// Whether this error means the key was wrong, as opposed to bad input.
    pub fn is_decryption_failure(&self) -> bool {
        matches!(self, CoreError::DecryptionFailed)
    }
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
