//! Sealkeep: unified API for envelope-based access control.
//!
//! Brings together persistence, a local keychain, ACLs and the resolver.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use sealkeep_acl::{AccessControlList, AclConfig, Collaborators, Keychain};
use sealkeep_core::{AccessKey, CryptoProvider, Identity, MasterAclRecord, ObjectUrl, StandardCrypto};
use sealkeep_store::Persistence;

use crate::envelope::Envelope;
use crate::error::Result;
use crate::resolver::Resolver;

/// Configuration for Sealkeep.
#[derive(Debug, Clone, Default)]
pub struct SealkeepConfig {
    /// ACL configuration.
    pub acl: AclConfig,
}

/// The main Sealkeep struct.
///
/// Provides a unified API for:
/// - Creating ACLs and registering them locally
/// - Granting viewers
/// - Sealing values into envelopes
/// - Resolving envelopes back to plaintext
pub struct Sealkeep<P: Persistence + 'static> {
    /// The identity this instance acts as.
    identity: Arc<Identity>,
    /// The storage backend.
    store: Arc<P>,
    /// Services handed to every ACL.
    collaborators: Collaborators,
    /// Identities and ACLs held locally.
    keychain: Arc<Keychain>,
    /// Envelope resolver over the keychain.
    resolver: Resolver,
    /// Configuration.
    config: SealkeepConfig,
}

impl<P: Persistence + 'static> Sealkeep<P> {
    /// Create a new instance with the standard crypto provider.
    pub fn new(identity: Identity, store: P, config: SealkeepConfig) -> Self {
        Self::with_crypto(identity, store, Arc::new(StandardCrypto::new()), config)
    }

    /// Create a new instance with an explicit crypto provider.
    pub fn with_crypto(
        identity: Identity,
        store: P,
        crypto: Arc<dyn CryptoProvider>,
        config: SealkeepConfig,
    ) -> Self {
        let store = Arc::new(store);
        let collaborators = Collaborators::new(store.clone(), crypto);

        let identity = Arc::new(identity);
        let keychain = Arc::new(Keychain::new());
        keychain.add_identity(identity.clone());

        let resolver = Resolver::new(collaborators.clone(), keychain.clone(), config.acl);

        Self {
            identity,
            store,
            collaborators,
            keychain,
            resolver,
            config,
        }
    }

    /// The identity this instance acts as.
    pub fn identity(&self) -> &Arc<Identity> {
        &self.identity
    }

    /// Get the store reference.
    pub fn store(&self) -> &P {
        &self.store
    }

    /// The local keychain.
    pub fn keychain(&self) -> &Arc<Keychain> {
        &self.keychain
    }

    /// The resolver used by [`Sealkeep::resolve`].
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Configuration in effect.
    pub fn config(&self) -> &SealkeepConfig {
        &self.config
    }

    /// Store this instance's public identity so others can grant it.
    ///
    /// Returns the identity url.
    pub async fn publish_identity(&self) -> Result<ObjectUrl> {
        Ok(self.store.store(&self.identity.to_object()).await?)
    }

    /// Add another identity this process controls.
    pub fn add_identity(&self, identity: Arc<Identity>) {
        self.keychain.add_identity(identity);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // ACL Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a master ACL with its own fresh identity, publish it and
    /// register it on the keychain.
    pub async fn create_acl(
        &self,
        name: &str,
        accesskey: Option<AccessKey>,
    ) -> Result<Arc<AccessControlList>> {
        let acl = Arc::new(AccessControlList::new_master(
            name,
            Identity::generate()?,
            accesskey,
            self.collaborators.clone(),
            self.config.acl,
        ));

        let url = acl.publish_and_wait().await?;
        self.keychain.add_acl(acl.clone());

        debug!(acl = name, url = %url, "created ACL");
        Ok(acl)
    }

    /// Restore a master ACL from its persisted record and register it.
    pub fn restore_acl(&self, record: MasterAclRecord) -> Result<Arc<AccessControlList>> {
        let acl = Arc::new(AccessControlList::from_master_record(
            record,
            self.collaborators.clone(),
            self.config.acl,
        )?);
        self.keychain.add_acl(acl.clone());
        Ok(acl)
    }

    /// Fetch and materialize the public ACL at `url`.
    pub async fn load_acl(&self, url: &ObjectUrl) -> Result<Arc<AccessControlList>> {
        let acl = AccessControlList::fetch(url, self.collaborators.clone(), self.config.acl).await?;
        acl.materialize().await?;
        Ok(Arc::new(acl))
    }

    /// Grant `viewer_url` access to `acl`.
    pub async fn grant(&self, acl: &AccessControlList, viewer_url: &ObjectUrl) -> Result<ObjectUrl> {
        Ok(acl.add_viewer(viewer_url).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Envelopes
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt a serializable value into an envelope referencing `acl`.
    ///
    /// The ACL is published first if it has no public url yet.
    pub async fn seal<T: Serialize + ?Sized>(
        &self,
        acl: &AccessControlList,
        value: &T,
    ) -> Result<Envelope> {
        let plaintext = serde_json::to_vec(value)?;
        let ciphertext = acl.encrypt(&plaintext)?;

        let url = match acl.public_url() {
            Some(url) => url,
            None => acl.publish_and_wait().await?,
        };

        Ok(Envelope::new(url, &ciphertext))
    }

    /// Resolve a JSON value, decrypting it if it is an envelope.
    pub async fn resolve(&self, value: Value) -> Result<Value> {
        self.resolver.resolve(value).await
    }

    /// Open an envelope into a typed value.
    pub async fn open<T: DeserializeOwned>(&self, envelope: &Envelope) -> Result<T> {
        let plaintext = self.resolver.open(envelope).await?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealkeep_store::MemoryStore;
    use serde_json::json;

    fn sealkeep() -> Sealkeep<MemoryStore> {
        Sealkeep::new(
            Identity::generate().unwrap(),
            MemoryStore::new(),
            SealkeepConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_acl_publishes_and_registers() {
        let sk = sealkeep();
        let acl = sk.create_acl("docs", None).await.unwrap();

        let url = acl.public_url().unwrap();
        assert!(sk.store().contains(&url).await.unwrap());
        assert_eq!(sk.keychain().acl_count(), 1);
    }

    #[tokio::test]
    async fn test_seal_and_resolve_locally() {
        let sk = sealkeep();
        let acl = sk.create_acl("docs", None).await.unwrap();

        let envelope = sk.seal(&acl, &json!({"text": "hello"})).await.unwrap();
        let value = sk.resolve(envelope.to_value().unwrap()).await.unwrap();
        assert_eq!(value, json!({"text": "hello"}));
    }

    #[tokio::test]
    async fn test_seal_publishes_unpublished_acl() {
        let sk = sealkeep();
        let acl = Arc::new(AccessControlList::new_master(
            "later",
            Identity::generate().unwrap(),
            None,
            sk.collaborators.clone(),
            AclConfig::default(),
        ));

        let envelope = sk.seal(&acl, "text").await.unwrap();
        assert_eq!(envelope.acl_url().unwrap(), acl.public_url().unwrap());
        assert!(sk.store().contains(&acl.public_url().unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_acl_registers_master() {
        let sk = sealkeep();
        let acl = sk.create_acl("docs", None).await.unwrap();
        let envelope = sk.seal(&acl, &42u32).await.unwrap();
        let record = acl.to_master_record().unwrap();

        let other = sealkeep();
        other.restore_acl(record).unwrap();
        let value: u32 = other.open(&envelope).await.unwrap();
        assert_eq!(value, 42);
    }
}
