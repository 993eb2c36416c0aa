//! The crypto provider: the narrow interface ACLs consume for encryption.
//!
//! Two layers:
//!
//! 1. **Key wrapping**: the accesskey is wrapped for each viewer with an
//!    ephemeral X25519 exchange against the viewer's public key, a Blake3
//!    derived wrapping key bound to a context, and ChaCha20-Poly1305.
//! 2. **Payload encryption**: payloads are sealed under the accesskey with
//!    ChaCha20-Poly1305 and a fresh random nonce.
//!
//! Both decrypt paths report a wrong key as [`CoreError::DecryptionFailed`]
//! and undecodable input as [`CoreError::MalformedCiphertext`].

use serde::{Deserialize, Serialize};

use crate::canonical::{from_canonical_bytes, to_canonical_bytes};
use crate::cipher::{AccessKey, EncryptionNonce, EphemeralKeyPair, X25519PublicKey, X25519StaticSecret};
use crate::error::{CoreError, Result};

/// Asymmetric and symmetric encryption used by access control lists.
pub trait CryptoProvider: Send + Sync {
    /// A fresh random accesskey of the provider's standard width.
    fn random_key(&self) -> AccessKey;

    /// Encrypt `plaintext` so only the holder of `recipient`'s secret can read it.
    fn encrypt_for(
        &self,
        recipient: &X25519PublicKey,
        plaintext: &[u8],
        context: &[u8],
    ) -> Result<Vec<u8>>;

    /// Decrypt a ciphertext produced by [`CryptoProvider::encrypt_for`].
    fn decrypt(
        &self,
        secret: &X25519StaticSecret,
        ciphertext: &[u8],
        context: &[u8],
    ) -> Result<Vec<u8>>;

    /// Encrypt a payload under an accesskey.
    fn sym_encrypt(&self, plaintext: &[u8], key: &AccessKey) -> Result<Vec<u8>>;

    /// Decrypt a payload sealed by [`CryptoProvider::sym_encrypt`].
    fn sym_decrypt(&self, ciphertext: &[u8], key: &AccessKey) -> Result<Vec<u8>>;
}

/// Format identifier for sealed payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum EncryptionFormat {
    /// ChaCha20-Poly1305 with 256-bit key.
    ChaCha20Poly1305 = 1,
}

/// A payload sealed under an accesskey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedPayload {
    /// Encryption algorithm used.
    pub format: EncryptionFormat,

    /// Nonce used for encryption (unique per encryption).
    pub nonce: EncryptionNonce,

    /// The encrypted data (includes authentication tag).
    pub ciphertext: Vec<u8>,
}

/// A secret wrapped for one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedSecret {
    /// Ephemeral X25519 public key (sender's side of ECDH).
    pub ephemeral_public: X25519PublicKey,

    /// Nonce used for encryption.
    pub nonce: EncryptionNonce,

    /// The secret, encrypted with the derived wrapping key.
    pub ciphertext: Vec<u8>,
}

/// X25519 + ChaCha20-Poly1305 provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCrypto;

impl StandardCrypto {
    /// Create the provider.
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for StandardCrypto {
    fn random_key(&self) -> AccessKey {
        AccessKey::generate()
    }

    fn encrypt_for(
        &self,
        recipient: &X25519PublicKey,
        plaintext: &[u8],
        context: &[u8],
    ) -> Result<Vec<u8>> {
        let ephemeral = EphemeralKeyPair::generate();
        let ephemeral_public = ephemeral.public_key();

        let wrap_key = ephemeral
            .diffie_hellman(recipient)
            .derive_wrap_key(context);

        let nonce = EncryptionNonce::generate();
        let ciphertext = wrap_key.encrypt(plaintext, &nonce)?;

        to_canonical_bytes(&WrappedSecret {
            ephemeral_public,
            nonce,
            ciphertext,
        })
    }

    fn decrypt(
        &self,
        secret: &X25519StaticSecret,
        ciphertext: &[u8],
        context: &[u8],
    ) -> Result<Vec<u8>> {
        let wrapped: WrappedSecret = from_canonical_bytes(ciphertext)
            .map_err(|e| CoreError::MalformedCiphertext(e.to_string()))?;

        let wrap_key = secret
            .diffie_hellman(&wrapped.ephemeral_public)
            .derive_wrap_key(context);

        wrap_key.decrypt(&wrapped.ciphertext, &wrapped.nonce)
    }

    fn sym_encrypt(&self, plaintext: &[u8], key: &AccessKey) -> Result<Vec<u8>> {
        let nonce = EncryptionNonce::generate();
        let ciphertext = key.encrypt(plaintext, &nonce)?;

        to_canonical_bytes(&SealedPayload {
            format: EncryptionFormat::ChaCha20Poly1305,
            nonce,
            ciphertext,
        })
    }

    fn sym_decrypt(&self, ciphertext: &[u8], key: &AccessKey) -> Result<Vec<u8>> {
        let sealed: SealedPayload = from_canonical_bytes(ciphertext)
            .map_err(|e| CoreError::MalformedCiphertext(e.to_string()))?;

        match sealed.format {
            EncryptionFormat::ChaCha20Poly1305 => key.decrypt(&sealed.ciphertext, &sealed.nonce),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_wrap_unwrap_roundtrip() {
        let crypto = StandardCrypto::new();
        let recipient = X25519StaticSecret::generate();
        let key = crypto.random_key();

        let token = crypto
            .encrypt_for(&recipient.public_key(), key.as_bytes(), b"list")
            .unwrap();
        let unwrapped = crypto.decrypt(&recipient, &token, b"list").unwrap();

        assert_eq!(unwrapped, key.as_bytes());
    }

    #[test]
    fn test_unwrap_wrong_recipient_is_decryption_failure() {
        let crypto = StandardCrypto::new();
        let recipient = X25519StaticSecret::generate();
        let stranger = X25519StaticSecret::generate();

        let token = crypto
            .encrypt_for(&recipient.public_key(), b"secret", b"list")
            .unwrap();

        let err = crypto.decrypt(&stranger, &token, b"list").unwrap_err();
        assert!(err.is_decryption_failure());
    }

    #[test]
    fn test_unwrap_wrong_context_is_decryption_failure() {
        let crypto = StandardCrypto::new();
        let recipient = X25519StaticSecret::generate();

        let token = crypto
            .encrypt_for(&recipient.public_key(), b"secret", b"list-a")
            .unwrap();

        let err = crypto.decrypt(&recipient, &token, b"list-b").unwrap_err();
        assert!(err.is_decryption_failure());
    }

    #[test]
    fn test_sym_wrong_key_is_decryption_failure() {
        let crypto = StandardCrypto::new();
        let sealed = crypto.sym_encrypt(b"payload", &AccessKey::generate()).unwrap();

        let err = crypto.sym_decrypt(&sealed, &AccessKey::generate()).unwrap_err();
        assert!(err.is_decryption_failure());
    }

    #[test]
    fn test_sym_garbage_is_malformed_not_decryption_failure() {
        let crypto = StandardCrypto::new();

        let err = crypto.sym_decrypt(b"not cbor at all", &AccessKey::generate()).unwrap_err();
        assert!(matches!(err, CoreError::MalformedCiphertext(_)));
        assert!(!err.is_decryption_failure());
    }

    #[test]
    fn test_sym_encrypt_uses_fresh_nonce() {
        let crypto = StandardCrypto::new();
        let key = AccessKey::generate();

        let a = crypto.sym_encrypt(b"same", &key).unwrap();
        let b = crypto.sym_encrypt(b"same", &key).unwrap();
        assert_ne!(a, b);
    }

    proptest! {
        #[test]
        fn prop_sym_roundtrip(key in any::<[u8; 32]>(), payload in prop::collection::vec(any::<u8>(), 0..512)) {
            let crypto = StandardCrypto::new();
            let key = AccessKey::from_bytes(key);

            let sealed = crypto.sym_encrypt(&payload, &key).unwrap();
            prop_assert_eq!(crypto.sym_decrypt(&sealed, &key).unwrap(), payload);
        }
    }
}
