//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Arc;

use sealkeep_acl::{AccessControlList, AclConfig, Collaborators};
use sealkeep_core::{AccessKey, Identity, ObjectUrl};
use sealkeep_store::{MemoryStore, Persistence};

/// A test fixture with an owner identity and a shared memory store.
pub struct TestFixture {
    pub owner: Identity,
    pub store: Arc<MemoryStore>,
}

impl TestFixture {
    /// Create a new test fixture with a random owner.
    pub fn new() -> Self {
        Self {
            owner: identity(),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Create with a deterministic owner from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            owner: identity_from_seed(seed),
            store: Arc::new(MemoryStore::new()),
        }
    }

    /// Standard collaborators over this fixture's store.
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::standard(self.store.clone())
    }

    /// A master ACL owned by this fixture's owner.
    pub fn master(&self, name: &str, accesskey: Option<AccessKey>) -> AccessControlList {
        AccessControlList::new_master(
            name,
            self.owner.clone(),
            accesskey,
            self.collaborators(),
            AclConfig::default(),
        )
    }

    /// Create a viewer identity and store its public object.
    pub async fn viewer(&self) -> Arc<Identity> {
        let viewer = identity();
        self.store
            .store(&viewer.to_object())
            .await
            .expect("memory store never fails");
        Arc::new(viewer)
    }

    /// Fetch a public copy of the ACL published at `url`, unmaterialized.
    pub async fn fetch(&self, url: &ObjectUrl) -> AccessControlList {
        AccessControlList::fetch(url, self.collaborators(), AclConfig::default())
            .await
            .expect("public ACL should be stored")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple deterministic identities for multi-party tests.
pub fn multi_party_identities(count: usize) -> Vec<Arc<Identity>> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0x5e;
            Arc::new(identity_from_seed(seed))
        })
        .collect()
}

/// A random identity.
pub fn identity() -> Identity {
    Identity::generate().expect("identity encodes")
}

/// A deterministic identity.
pub fn identity_from_seed(seed: [u8; 32]) -> Identity {
    Identity::from_seed(&seed).expect("identity encodes")
}
