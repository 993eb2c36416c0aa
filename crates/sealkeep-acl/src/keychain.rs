//! Local keychain: the identities and ACLs this process controls.
//!
//! The resolver consults a [`KeychainLookup`] instead of any global
//! registry, so which identities are tried is always explicit.

use std::sync::{Arc, PoisonError, RwLock};

use sealkeep_core::{Identity, ObjectUrl};

use crate::acl::AccessControlList;

/// Lookup of locally held identities and ACLs.
pub trait KeychainLookup: Send + Sync {
    /// Identities to try when decrypting, in preference order.
    fn local_identities(&self) -> Vec<Arc<Identity>>;

    /// A locally held ACL published under `url`, if any.
    fn find_by_public_url(&self, url: &ObjectUrl) -> Option<Arc<AccessControlList>>;
}

/// In-memory keychain.
#[derive(Debug, Default)]
pub struct Keychain {
    identities: RwLock<Vec<Arc<Identity>>>,
    acls: RwLock<Vec<Arc<AccessControlList>>>,
}

impl Keychain {
    /// Create an empty keychain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identity. Adding the same identity twice has no effect.
    pub fn add_identity(&self, identity: Arc<Identity>) {
        let mut identities = self.identities.write().unwrap_or_else(PoisonError::into_inner);
        if !identities.iter().any(|i| i.url() == identity.url()) {
            identities.push(identity);
        }
    }

    /// Add an ACL.
    ///
    /// A master's own identity is added too, so the owner can always open
    /// what the master encrypted.
    pub fn add_acl(&self, acl: Arc<AccessControlList>) {
        if let Some(identity) = acl.identity() {
            self.add_identity(Arc::new(identity.clone()));
        }

        let mut acls = self.acls.write().unwrap_or_else(PoisonError::into_inner);
        if !acls.iter().any(|a| Arc::ptr_eq(a, &acl)) {
            acls.push(acl);
        }
    }

    /// Number of ACLs held.
    pub fn acl_count(&self) -> usize {
        self.acls.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl KeychainLookup for Keychain {
    fn local_identities(&self) -> Vec<Arc<Identity>> {
        self.identities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn find_by_public_url(&self, url: &ObjectUrl) -> Option<Arc<AccessControlList>> {
        let acls = self.acls.read().unwrap_or_else(PoisonError::into_inner);
        // Prefer a master over a public copy of the same list.
        acls.iter()
            .filter(|acl| acl.is_published_as(url))
            .max_by_key(|acl| acl.is_master())
            .cloned()
    }
}
