//! The access control list.
//!
//! An ACL owns an identity, an entry list of wrapped accesskeys, and (on the
//! master copy only) the accesskey itself. The master can grant viewers,
//! encrypt payloads and publish a secret-free projection. Any copy can
//! decrypt for an identity that holds a grant.
//!
//! All operations take `&self`, so an ACL is shared as `Arc<AccessControlList>`.
//! The entry list is the only mutable state; it is never locked across an
//! `.await`.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use sealkeep_core::{
    AccessKey, CryptoProvider, Identity, IdentityRecord, ListId, MasterAclRecord, ObjectKind,
    ObjectUrl, PublicAclRecord, PublicIdentity, StandardCrypto, StoredObject,
};
use sealkeep_store::Persistence;

use crate::config::AclConfig;
use crate::entry::AccessEntry;
use crate::error::{AclError, Result};
use crate::keychain::KeychainLookup;
use crate::list::EntryList;

/// The services an ACL consumes.
#[derive(Clone)]
pub struct Collaborators {
    /// Object and entry-log storage.
    pub persistence: Arc<dyn Persistence>,
    /// Key wrapping and payload encryption.
    pub crypto: Arc<dyn CryptoProvider>,
}

impl Collaborators {
    /// Create from explicit services.
    pub fn new(persistence: Arc<dyn Persistence>, crypto: Arc<dyn CryptoProvider>) -> Self {
        Self {
            persistence,
            crypto,
        }
    }

    /// Use [`StandardCrypto`] over the given persistence.
    pub fn standard(persistence: Arc<dyn Persistence>) -> Self {
        Self::new(persistence, Arc::new(StandardCrypto::new()))
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Collaborators")
    }
}

/// Secret material held only by the master copy.
struct MasterSecrets {
    accesskey: AccessKey,
    identity: Identity,
}

/// An access control list, master or public.
pub struct AccessControlList {
    name: String,
    public_identity: PublicIdentity,
    master: Option<MasterSecrets>,
    entries: EntryList,
    /// Urls this list is known under; the last one is the current projection.
    published: RwLock<Vec<ObjectUrl>>,
    collaborators: Collaborators,
    config: AclConfig,
}

impl AccessControlList {
    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a master ACL.
    ///
    /// Without a supplied accesskey, a random one of the provider's standard
    /// width is generated.
    pub fn new_master(
        name: impl Into<String>,
        identity: Identity,
        accesskey: Option<AccessKey>,
        collaborators: Collaborators,
        config: AclConfig,
    ) -> Self {
        let name = name.into();
        let public_identity = *identity.public();
        let list_id = ListId::derive(&public_identity.signing_key, &name);
        let accesskey = accesskey.unwrap_or_else(|| collaborators.crypto.random_key());

        Self {
            name,
            public_identity,
            master: Some(MasterSecrets {
                accesskey,
                identity,
            }),
            entries: EntryList::new(list_id, public_identity.signing_key),
            published: RwLock::new(Vec::new()),
            collaborators,
            config,
        }
    }

    /// Build a public copy from a fetched projection.
    ///
    /// The copy carries no secrets and its entries start unmaterialized.
    pub fn from_public_record(
        record: PublicAclRecord,
        collaborators: Collaborators,
        config: AclConfig,
    ) -> Result<Self> {
        let list_id = ListId::derive(&record.identity.signing_key, &record.name);
        let url = StoredObject::PublicAcl(record.clone()).url()?;

        Ok(Self {
            entries: EntryList::pending(list_id, record.identity.signing_key, record.entries),
            name: record.name,
            public_identity: record.identity,
            master: None,
            published: RwLock::new(vec![url]),
            collaborators,
            config,
        })
    }

    /// Rebuild a master from its persisted record.
    pub fn from_master_record(
        record: MasterAclRecord,
        collaborators: Collaborators,
        config: AclConfig,
    ) -> Result<Self> {
        let identity = Identity::from_secret(&record.identity.secret)?;
        if *identity.public() != record.identity.public {
            return Err(AclError::InvalidEntry(
                "master identity secret does not match its public half".into(),
            ));
        }

        let public_identity = record.identity.public;
        let list_id = ListId::derive(&public_identity.signing_key, &record.name);
        let entries = EntryList::from_records(
            list_id,
            public_identity.signing_key,
            record.entries,
            config.verify_on_materialize,
        )?;

        Ok(Self {
            name: record.name,
            public_identity,
            master: Some(MasterSecrets {
                accesskey: record.accesskey,
                identity,
            }),
            entries,
            published: RwLock::new(record.published),
            collaborators,
            config,
        })
    }

    /// Export the master for private persistence.
    pub fn to_master_record(&self) -> Result<MasterAclRecord> {
        let master = self.require_master("export a master record")?;

        Ok(MasterAclRecord {
            name: self.name.clone(),
            accesskey: master.accesskey.clone(),
            identity: IdentityRecord {
                public: self.public_identity,
                secret: master.identity.secret(),
            },
            entries: self.entries.records(),
            published: self.published_urls(),
        })
    }

    /// Fetch the public copy stored at `url`.
    ///
    /// The returned list is not materialized.
    #[tracing::instrument(skip(collaborators, config))]
    pub async fn fetch(
        url: &ObjectUrl,
        collaborators: Collaborators,
        config: AclConfig,
    ) -> Result<Self> {
        match collaborators.persistence.fetch(url).await? {
            StoredObject::PublicAcl(record) => Self::from_public_record(record, collaborators, config),
            other => Err(AclError::UnexpectedObject {
                url: *url,
                expected: ObjectKind::PublicAcl,
                found: other.kind(),
            }),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Logical label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this copy holds the accesskey and private keys.
    pub fn is_master(&self) -> bool {
        self.master.is_some()
    }

    /// Id of the live entry log.
    pub fn list_id(&self) -> ListId {
        self.entries.list_id()
    }

    /// Public half of the ACL's identity.
    pub fn public_identity(&self) -> &PublicIdentity {
        &self.public_identity
    }

    /// Full identity, on the master only.
    pub fn identity(&self) -> Option<&Identity> {
        self.master.as_ref().map(|m| &m.identity)
    }

    /// Url of the most recent public projection, if any.
    pub fn public_url(&self) -> Option<ObjectUrl> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    /// Every url this list has been published under, oldest first.
    pub fn published_urls(&self) -> Vec<ObjectUrl> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether `url` names any projection of this list.
    pub fn is_published_as(&self, url: &ObjectUrl) -> bool {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url)
    }

    /// Number of known entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether entries have been materialized.
    pub fn is_materialized(&self) -> bool {
        self.entries.is_materialized()
    }

    /// Configuration in effect.
    pub fn config(&self) -> &AclConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entries
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the live entry log and merge it into this copy.
    ///
    /// Returns the number of entries now known.
    pub async fn materialize(&self) -> Result<usize> {
        let count = self
            .entries
            .materialize(
                self.collaborators.persistence.as_ref(),
                self.config.verify_on_materialize,
            )
            .await?;
        debug!(acl = %self.name, entries = count, "materialized");
        Ok(count)
    }

    /// Grant `viewer_url` access by appending a wrapped copy of the accesskey.
    ///
    /// Repeated grants to the same viewer add further entries. Returns the
    /// viewer url.
    #[tracing::instrument(skip(self), fields(acl = %self.name))]
    pub async fn add_viewer(&self, viewer_url: &ObjectUrl) -> Result<ObjectUrl> {
        let master = self.require_master("add a viewer")?;

        let viewer = match self.collaborators.persistence.fetch(viewer_url).await? {
            StoredObject::Identity(public) => public,
            other => {
                return Err(AclError::UnexpectedObject {
                    url: *viewer_url,
                    expected: ObjectKind::Identity,
                    found: other.kind(),
                })
            }
        };

        let list_id = self.list_id();
        let token = self.collaborators.crypto.encrypt_for(
            &viewer.encryption_key,
            master.accesskey.as_bytes(),
            list_id.as_bytes(),
        )?;

        let entry = AccessEntry::new(*viewer_url, token);
        let record = entry.sign(master.identity.keypair())?;
        if self.config.verify_on_append {
            AccessEntry::open(&record, Some(&self.public_identity.signing_key))?;
        }

        let appended = self.collaborators.persistence.append(&list_id, &record).await?;
        debug!(viewer = %viewer_url, ?appended, "access entry appended");

        self.entries.push(record, entry);
        Ok(*viewer_url)
    }

    /// Tokens addressed to `viewer_url`, still wrapped.
    pub fn tokens(&self, viewer_url: &ObjectUrl) -> Result<Vec<Vec<u8>>> {
        Ok(self
            .entries
            .tokens_for(viewer_url)?
            .into_iter()
            .map(|token| token.to_vec())
            .collect())
    }

    /// Accesskeys unwrapped from every token addressed to `viewer`.
    pub fn access_keys(&self, viewer: &Identity) -> Result<Vec<AccessKey>> {
        self.entries
            .tokens_for(&viewer.url())?
            .iter()
            .map(|token| self.unwrap_token(viewer, token))
            .collect()
    }

    fn unwrap_token(&self, viewer: &Identity, token: &[u8]) -> Result<AccessKey> {
        let raw = self.collaborators.crypto.decrypt(
            viewer.encryption_secret(),
            token,
            self.list_id().as_bytes(),
        )?;
        Ok(AccessKey::from_slice(&raw)?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Payloads
    // ─────────────────────────────────────────────────────────────────────────

    /// Encrypt `data` under the accesskey.
    pub fn encrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        let master = self.require_master("encrypt")?;
        Ok(self.collaborators.crypto.sym_encrypt(data, &master.accesskey)?)
    }

    /// Decrypt with the first candidate identity holding a usable grant.
    ///
    /// Candidates are tried in order and their tokens in list order. The
    /// master's own identity also opens the ciphertext with the accesskey
    /// directly. Only a decryption failure moves on to the next candidate;
    /// any other error is returned at once.
    pub fn decrypt(&self, ciphertext: &[u8], candidates: &[Arc<Identity>]) -> Result<Vec<u8>> {
        for identity in candidates {
            if let Some(master) = self.owned_by(identity) {
                if let Some(plaintext) = self.try_key(ciphertext, &master.accesskey)? {
                    return Ok(plaintext);
                }
            }

            for token in self.entries.tokens_for(&identity.url())? {
                let key = match self.unwrap_token(identity, &token) {
                    Ok(key) => key,
                    Err(AclError::Crypto(e)) if e.is_decryption_failure() => continue,
                    Err(e) => return Err(e),
                };
                if let Some(plaintext) = self.try_key(ciphertext, &key)? {
                    return Ok(plaintext);
                }
            }
        }

        Err(AclError::Authentication)
    }

    /// Decrypt against every identity the keychain holds.
    pub fn decrypt_with(&self, ciphertext: &[u8], keychain: &dyn KeychainLookup) -> Result<Vec<u8>> {
        self.decrypt(ciphertext, &keychain.local_identities())
    }

    fn try_key(&self, ciphertext: &[u8], key: &AccessKey) -> Result<Option<Vec<u8>>> {
        match self.collaborators.crypto.sym_decrypt(ciphertext, key) {
            Ok(plaintext) => Ok(Some(plaintext)),
            Err(e) if e.is_decryption_failure() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn owned_by(&self, identity: &Identity) -> Option<&MasterSecrets> {
        self.master
            .as_ref()
            .filter(|m| m.identity.url() == identity.url())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Publication
    // ─────────────────────────────────────────────────────────────────────────

    /// The secret-free projection of this list as it stands now.
    pub fn public_record(&self) -> PublicAclRecord {
        PublicAclRecord {
            name: self.name.clone(),
            identity: self.public_identity,
            entries: self.entries.records(),
        }
    }

    /// Publish the projection and return its url immediately.
    ///
    /// The url is recorded before the store completes; the store itself runs
    /// on a background task and a failure there is only logged. Must be
    /// called within a tokio runtime.
    pub fn publish(&self) -> Result<ObjectUrl> {
        let (url, object) = self.prepare_publication()?;

        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| AclError::Misuse(format!("publish outside a tokio runtime: {}", e)))?;

        self.record_publication(url);
        let persistence = self.collaborators.persistence.clone();
        handle.spawn(async move {
            if let Err(e) = persistence.store(&object).await {
                warn!(url = %url, error = %e, "background store of public ACL failed");
            }
        });

        debug!(acl = %self.name, url = %url, "published");
        Ok(url)
    }

    /// Publish the projection and wait for the store to complete.
    pub async fn publish_and_wait(&self) -> Result<ObjectUrl> {
        let (url, object) = self.prepare_publication()?;
        self.record_publication(url);
        self.collaborators.persistence.store(&object).await?;

        debug!(acl = %self.name, url = %url, "published and stored");
        Ok(url)
    }

    fn prepare_publication(&self) -> Result<(ObjectUrl, StoredObject)> {
        self.require_master("publish")?;
        let object = StoredObject::PublicAcl(self.public_record());
        let url = object.url()?;
        Ok((url, object))
    }

    fn record_publication(&self, url: ObjectUrl) {
        let mut published = self.published.write().unwrap_or_else(PoisonError::into_inner);
        published.retain(|u| *u != url);
        published.push(url);
    }

    fn require_master(&self, operation: &str) -> Result<&MasterSecrets> {
        self.master.as_ref().ok_or_else(|| {
            AclError::Permission(format!(
                "cannot {} on public copy of {}: it holds no accesskey",
                operation, self.name
            ))
        })
    }
}

impl std::fmt::Debug for AccessControlList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessControlList")
            .field("name", &self.name)
            .field("master", &self.is_master())
            .field("list_id", &self.list_id())
            .field("entries", &self.entry_count())
            .field("public_url", &self.public_url())
            .finish()
    }
}
