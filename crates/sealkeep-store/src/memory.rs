//! In-memory implementation of the Persistence trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use sealkeep_core::{Ed25519Signature, ListId, ObjectUrl, SignedRecord, StoredObject};

use crate::error::{Result, StoreError};
use crate::traits::{AppendResult, Persistence};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Objects indexed by url.
    objects: HashMap<ObjectUrl, StoredObject>,

    /// Entry logs in append order.
    logs: HashMap<ListId, Vec<SignedRecord>>,

    /// Signatures already present in each log.
    seen: HashMap<ListId, HashSet<Ed25519Signature>>,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    /// Number of stored objects.
    pub fn object_count(&self) -> usize {
        self.read().map(|inner| inner.objects.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn fetch(&self, url: &ObjectUrl) -> Result<StoredObject> {
        let inner = self.read()?;
        inner
            .objects
            .get(url)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(url.to_string()))
    }

    async fn store(&self, object: &StoredObject) -> Result<ObjectUrl> {
        let url = object.url()?;
        let mut inner = self.write()?;
        inner.objects.entry(url).or_insert_with(|| object.clone());
        Ok(url)
    }

    async fn contains(&self, url: &ObjectUrl) -> Result<bool> {
        let inner = self.read()?;
        Ok(inner.objects.contains_key(url))
    }

    async fn append(&self, list_id: &ListId, record: &SignedRecord) -> Result<AppendResult> {
        let mut inner = self.write()?;

        if !inner.seen.entry(*list_id).or_default().insert(record.signature) {
            return Ok(AppendResult::AlreadyPresent);
        }
        inner.logs.entry(*list_id).or_default().push(record.clone());

        Ok(AppendResult::Appended)
    }

    async fn entries(&self, list_id: &ListId) -> Result<Vec<SignedRecord>> {
        let inner = self.read()?;
        Ok(inner.logs.get(list_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use sealkeep_core::{Identity, Keypair, PublicAclRecord};

    fn make_record(keypair: &Keypair, n: u8) -> SignedRecord {
        SignedRecord::sign(keypair, vec![n; 8])
    }

    #[tokio::test]
    async fn test_memory_store_object_roundtrip() {
        let store = MemoryStore::new();
        let identity = Identity::generate().unwrap();
        let object = identity.to_object();

        let url = store.store(&object).await.unwrap();
        assert_eq!(url, identity.url());
        assert_eq!(store.fetch(&url).await.unwrap(), object);
        assert!(store.contains(&url).await.unwrap());
    }

    #[tokio::test]
    async fn test_memory_store_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.fetch(&ObjectUrl::from_bytes([1; 32])).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_memory_store_store_is_idempotent() {
        let store = MemoryStore::new();
        let identity = Identity::generate().unwrap();
        let object = StoredObject::PublicAcl(PublicAclRecord {
            name: "docs".into(),
            identity: *identity.public(),
            entries: vec![],
        });

        let u1 = store.store(&object).await.unwrap();
        let u2 = store.store(&object).await.unwrap();
        assert_eq!(u1, u2);
        assert_eq!(store.object_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_append_dedupes_by_signature() {
        let store = MemoryStore::new();
        let keypair = Keypair::generate();
        let list = ListId::derive(&keypair.public_key(), "docs");

        let r1 = make_record(&keypair, 1);
        let r2 = make_record(&keypair, 2);

        assert_eq!(store.append(&list, &r1).await.unwrap(), AppendResult::Appended);
        assert_eq!(store.append(&list, &r2).await.unwrap(), AppendResult::Appended);
        assert_eq!(store.append(&list, &r1).await.unwrap(), AppendResult::AlreadyPresent);

        assert_eq!(store.entries(&list).await.unwrap(), vec![r1, r2]);
    }

    #[tokio::test]
    async fn test_memory_store_unknown_log_is_empty() {
        let store = MemoryStore::new();
        let list = ListId::from_bytes([9; 32]);
        assert!(store.entries(&list).await.unwrap().is_empty());
    }

    proptest! {
        // Signatures are deterministic, so equal data means an equal record.
        #[test]
        fn append_keeps_first_occurrence_order(data in prop::collection::vec(0u8..6, 0..24)) {
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let store = MemoryStore::new();
            let keypair = Keypair::from_seed(&[7; 32]);
            let list = ListId::derive(&keypair.public_key(), "docs");

            let mut expected = Vec::new();
            for n in &data {
                let record = make_record(&keypair, *n);
                let result = runtime.block_on(store.append(&list, &record)).unwrap();
                if expected.contains(&record) {
                    prop_assert_eq!(result, AppendResult::AlreadyPresent);
                } else {
                    prop_assert_eq!(result, AppendResult::Appended);
                    expected.push(record);
                }
            }

            prop_assert_eq!(runtime.block_on(store.entries(&list)).unwrap(), expected);
        }
    }
}
