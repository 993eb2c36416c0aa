//! # Sealkeep
//!
//! The unified API for Sealkeep - envelope-based access control for shared
//! encrypted content.
//!
//! ## Overview
//!
//! A producer creates an access control list, encrypts values under its
//! accesskey and ships them as [`Envelope`]s that reference the list's public
//! url. Viewers are granted by appending a signed entry that wraps the
//! accesskey for their public key. A consumer resolves an envelope by finding
//! the list (locally or by fetching it) and unwrapping its own grant.
//!
//! ## Key Concepts
//!
//! - **Accesskey**: symmetric secret that decrypts protected content
//! - **Envelope**: `{acl, encrypted}` on the wire; anything else is plaintext
//! - **Master copy**: the privately held ACL with the accesskey
//! - **Public copy**: the secret-free projection anyone can fetch
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sealkeep::{Sealkeep, SealkeepConfig};
//! use sealkeep::core::Identity;
//! use sealkeep::store::SqliteStore;
//!
//! async fn example() -> sealkeep::Result<()> {
//!     let store = SqliteStore::open("sealkeep.db")?;
//!     let sk = Sealkeep::new(Identity::generate()?, store, SealkeepConfig::default());
//!
//!     let acl = sk.create_acl("notes", None).await?;
//!     // sk.grant(&acl, &viewer_url).await?;
//!
//!     let envelope = sk.seal(&acl, "hello").await?;
//!     let text: String = sk.open(&envelope).await?;
//!     assert_eq!(text, "hello");
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! This crate re-exports the component crates for convenience:
//!
//! - `sealkeep::core` - Core primitives (identities, keys, records)
//! - `sealkeep::store` - Persistence abstraction and SQLite
//! - `sealkeep::acl` - Access control lists and the keychain

pub mod envelope;
pub mod error;
pub mod kernel;
pub mod resolver;

// Re-export component crates
pub use sealkeep_acl as acl;
pub use sealkeep_core as core;
pub use sealkeep_store as store;

// Re-export main types for convenience
pub use envelope::Envelope;
pub use error::{KernelError, Result};
pub use kernel::{Sealkeep, SealkeepConfig};
pub use resolver::Resolver;

// Re-export commonly used types
pub use sealkeep_acl::{AccessControlList, AclConfig, AclError, Keychain, KeychainLookup};
pub use sealkeep_core::{AccessKey, Identity, ObjectUrl, PublicIdentity};
