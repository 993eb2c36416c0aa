//! The decryption resolver.
//!
//! Turns an arbitrary JSON value into plaintext:
//!
//! 1. A value without a non-empty `encrypted` string is returned unchanged.
//! 2. If a locally held ACL was published under the envelope's url, it
//!    decrypts with no fetch of the ACL object. A public copy still merges
//!    the live entry log first.
//! 3. Otherwise the public ACL is fetched, its entries materialized, and
//!    decryption is attempted against the local identities.
//!
//! The decrypted bytes are JSON and are decoded before being returned.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use sealkeep_acl::{AccessControlList, AclConfig, Collaborators, KeychainLookup};

use crate::envelope::Envelope;
use crate::error::Result;

/// Resolves envelopes against a keychain and a persistence layer.
#[derive(Clone)]
pub struct Resolver {
    collaborators: Collaborators,
    keychain: Arc<dyn KeychainLookup>,
    config: AclConfig,
}

impl Resolver {
    /// Create a resolver.
    pub fn new(
        collaborators: Collaborators,
        keychain: Arc<dyn KeychainLookup>,
        config: AclConfig,
    ) -> Self {
        Self {
            collaborators,
            keychain,
            config,
        }
    }

    /// Resolve a JSON value, decrypting it if it is an envelope.
    pub async fn resolve(&self, value: Value) -> Result<Value> {
        if !Envelope::is_encrypted(&value) {
            return Ok(value);
        }

        let envelope = Envelope::from_value(value)?;
        let plaintext = self.open(&envelope).await?;
        Ok(serde_json::from_slice(&plaintext)?)
    }

    /// Decrypt an envelope to its raw payload bytes.
    #[tracing::instrument(skip(self, envelope), fields(acl = %envelope.acl))]
    pub async fn open(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        let url = envelope.acl_url()?;
        let ciphertext = envelope.ciphertext()?;
        let identities = self.keychain.local_identities();

        if let Some(acl) = self.keychain.find_by_public_url(&url) {
            debug!(master = acl.is_master(), "resolving through local ACL");
            if !acl.is_master() {
                acl.materialize().await?;
            }
            return Ok(acl.decrypt(&ciphertext, &identities)?);
        }

        debug!("resolving through fetched ACL");
        let acl = AccessControlList::fetch(&url, self.collaborators.clone(), self.config).await?;
        acl.materialize().await?;
        Ok(acl.decrypt(&ciphertext, &identities)?)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").field("config", &self.config).finish()
    }
}
