//! # Sealkeep ACL
//!
//! Access control lists for shared encrypted content.
//!
//! ## Overview
//!
//! An ACL is a named list of viewers. Each viewer is granted an
//! [`AccessEntry`]: a signed record carrying the ACL's accesskey wrapped under
//! that viewer's public key. Payloads are encrypted once under the accesskey;
//! any viewer holding a grant can unwrap the key and decrypt.
//!
//! ## Key Concepts
//!
//! - **Master copy**: holds the accesskey and private keys; can grant,
//!   encrypt and publish
//! - **Public copy**: the secret-free projection; can only decrypt for a
//!   viewer with a grant
//! - **Materialization**: a fetched public copy must merge its snapshot with
//!   the live entry log before its entries can be read
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use sealkeep_acl::{AccessControlList, AclConfig, Collaborators};
//! use sealkeep_core::Identity;
//! use sealkeep_store::MemoryStore;
//!
//! async fn example(viewer: Arc<Identity>) -> sealkeep_acl::Result<()> {
//!     let collaborators = Collaborators::standard(Arc::new(MemoryStore::new()));
//!     let acl = AccessControlList::new_master(
//!         "docs",
//!         Identity::generate()?,
//!         None,
//!         collaborators,
//!         AclConfig::default(),
//!     );
//!
//!     acl.add_viewer(&viewer.url()).await?;
//!     let ciphertext = acl.encrypt(b"hello")?;
//!     assert_eq!(acl.decrypt(&ciphertext, &[viewer])?, b"hello");
//!     Ok(())
//! }
//! ```

pub mod acl;
pub mod config;
pub mod entry;
pub mod error;
pub mod keychain;
pub mod list;

pub use acl::{AccessControlList, Collaborators};
pub use config::AclConfig;
pub use entry::AccessEntry;
pub use error::{AclError, Result};
pub use keychain::{Keychain, KeychainLookup};
pub use list::EntryList;
