//! # Sealkeep Core
//!
//! Pure primitives for Sealkeep: identities, signed records, content
//! addressing, and the crypto provider used to wrap and unwrap accesskeys.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`Identity`] / [`PublicIdentity`] - An actor with signing and encryption keys
//! - [`AccessKey`] - The symmetric secret that opens protected payloads
//! - [`SignedRecord`] - One element of an append-only signed entry list
//! - [`StoredObject`] - Tagged union of everything the persistence layer stores
//! - [`ObjectUrl`] - Content address of a stored object
//! - [`CryptoProvider`] - Key wrapping and payload encryption interface

pub mod canonical;
pub mod cipher;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod object;
pub mod provider;
pub mod record;
pub mod types;

pub use canonical::{from_canonical_bytes, to_canonical_bytes};
pub use cipher::{AccessKey, EncryptionNonce, X25519PublicKey, X25519StaticSecret, ACCESS_KEY_LEN};
pub use crypto::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};
pub use error::{CoreError, Result};
pub use identity::{Identity, IdentitySecret, PublicIdentity};
pub use object::{IdentityRecord, MasterAclRecord, ObjectKind, PublicAclRecord, StoredObject};
pub use provider::{CryptoProvider, SealedPayload, StandardCrypto, WrappedSecret};
pub use record::SignedRecord;
pub use types::{ListId, ObjectUrl};
