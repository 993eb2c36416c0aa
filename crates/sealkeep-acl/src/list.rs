//! The signed entry list behind an ACL.
//!
//! A list is either *materialized* (every known record decoded and, when
//! configured, verified) or *pending* (holding the raw snapshot embedded in a
//! fetched public copy). Reads that need entries fail with
//! [`AclError::Misuse`] until [`EntryList::materialize`] has run.
//!
//! Materializing merges the snapshot with the live log held by the
//! persistence layer, so a stale public copy still sees entries appended
//! after it was published. Records are deduplicated by signature.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use bytes::Bytes;
use tracing::warn;

use sealkeep_core::{Ed25519PublicKey, Ed25519Signature, ListId, ObjectUrl, SignedRecord};
use sealkeep_store::Persistence;

use crate::entry::AccessEntry;
use crate::error::{AclError, Result};

/// Append-only list of signed access entries.
#[derive(Debug)]
pub struct EntryList {
    list_id: ListId,
    signer: Ed25519PublicKey,
    state: RwLock<ListState>,
}

#[derive(Debug, Default)]
struct ListState {
    materialized: bool,
    /// Raw records in the order they became known.
    records: Vec<SignedRecord>,
    /// Decoded entries, parallel to the accepted records.
    entries: Vec<AccessEntry>,
    seen: HashSet<Ed25519Signature>,
}

impl ListState {
    /// Accept a record. Returns false if it was already known.
    fn accept(&mut self, record: SignedRecord, entry: AccessEntry) -> bool {
        if !self.seen.insert(record.signature) {
            return false;
        }
        self.records.push(record);
        self.entries.push(entry);
        true
    }
}

impl EntryList {
    /// An empty, materialized list for a fresh master.
    pub fn new(list_id: ListId, signer: Ed25519PublicKey) -> Self {
        Self {
            list_id,
            signer,
            state: RwLock::new(ListState {
                materialized: true,
                ..ListState::default()
            }),
        }
    }

    /// A pending list holding an unverified snapshot.
    pub fn pending(list_id: ListId, signer: Ed25519PublicKey, snapshot: Vec<SignedRecord>) -> Self {
        let mut seen = HashSet::new();
        let records = snapshot
            .into_iter()
            .filter(|record| seen.insert(record.signature))
            .collect();

        Self {
            list_id,
            signer,
            state: RwLock::new(ListState {
                materialized: false,
                records,
                entries: Vec::new(),
                seen,
            }),
        }
    }

    /// A materialized list built from records already held locally.
    ///
    /// Unlike [`EntryList::materialize`], a bad record is an error here: the
    /// caller claims to own these records.
    pub fn from_records(
        list_id: ListId,
        signer: Ed25519PublicKey,
        records: Vec<SignedRecord>,
        verify: bool,
    ) -> Result<Self> {
        let list = Self::new(list_id, signer);
        {
            let mut state = list.write();
            for record in records {
                let entry = AccessEntry::open(&record, verify.then_some(&signer))?;
                state.accept(record, entry);
            }
        }
        Ok(list)
    }

    /// The id of the live log backing this list.
    pub fn list_id(&self) -> ListId {
        self.list_id
    }

    /// Whether entries have been materialized.
    pub fn is_materialized(&self) -> bool {
        self.read().materialized
    }

    /// Number of known records.
    pub fn len(&self) -> usize {
        self.read().records.len()
    }

    /// Whether no records are known.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the known records, in order.
    pub fn records(&self) -> Vec<SignedRecord> {
        self.read().records.clone()
    }

    /// Merge the snapshot with the live log and decode every record.
    ///
    /// Records that fail to decode, or fail verification when `verify` is set,
    /// are dropped with a warning. Returns the number of accepted entries.
    pub async fn materialize(&self, persistence: &dyn Persistence, verify: bool) -> Result<usize> {
        let live = persistence.entries(&self.list_id).await?;

        let mut state = self.write();
        let snapshot = if state.materialized {
            Vec::new()
        } else {
            std::mem::take(&mut state.records)
        };
        if !state.materialized {
            state.seen.clear();
            state.entries.clear();
        }

        let signer = verify.then_some(&self.signer);
        for record in snapshot.into_iter().chain(live) {
            if state.seen.contains(&record.signature) {
                continue;
            }
            match AccessEntry::open(&record, signer) {
                Ok(entry) => {
                    state.accept(record, entry);
                }
                Err(e) => {
                    warn!(list = %self.list_id, error = %e, "dropping access entry");
                }
            }
        }

        state.materialized = true;
        Ok(state.entries.len())
    }

    /// Record an entry that has been durably appended.
    pub fn push(&self, record: SignedRecord, entry: AccessEntry) {
        self.write().accept(record, entry);
    }

    /// Tokens addressed to `viewer`, in list order.
    pub fn tokens_for(&self, viewer: &ObjectUrl) -> Result<Vec<Bytes>> {
        let state = self.read();
        if !state.materialized {
            return Err(AclError::Misuse(format!(
                "entries of list {} read before materialization",
                self.list_id
            )));
        }

        Ok(state
            .entries
            .iter()
            .filter(|entry| entry.viewer == *viewer)
            .map(|entry| entry.token.clone())
            .collect())
    }

    fn read(&self) -> RwLockReadGuard<'_, ListState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ListState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealkeep_core::Keypair;
    use sealkeep_store::MemoryStore;

    fn setup() -> (Keypair, ListId) {
        let keypair = Keypair::generate();
        let list_id = ListId::derive(&keypair.public_key(), "docs");
        (keypair, list_id)
    }

    fn entry(viewer: u8, token: u8) -> AccessEntry {
        AccessEntry::new(ObjectUrl::from_bytes([viewer; 32]), vec![token; 4])
    }

    #[test]
    fn test_pending_list_is_misuse() {
        let (keypair, list_id) = setup();
        let record = entry(1, 1).sign(&keypair).unwrap();
        let list = EntryList::pending(list_id, keypair.public_key(), vec![record]);

        assert!(!list.is_materialized());
        let err = list.tokens_for(&ObjectUrl::from_bytes([1; 32])).unwrap_err();
        assert!(matches!(err, AclError::Misuse(_)));
    }

    #[test]
    fn test_no_match_is_empty_not_error() {
        let (keypair, list_id) = setup();
        let list = EntryList::new(list_id, keypair.public_key());
        assert!(list.tokens_for(&ObjectUrl::from_bytes([1; 32])).unwrap().is_empty());
    }

    #[test]
    fn test_tokens_in_list_order() {
        let (keypair, list_id) = setup();
        let list = EntryList::new(list_id, keypair.public_key());

        for (viewer, token) in [(1, 10), (2, 20), (1, 11)] {
            let e = entry(viewer, token);
            list.push(e.sign(&keypair).unwrap(), e);
        }

        let tokens = list.tokens_for(&ObjectUrl::from_bytes([1; 32])).unwrap();
        assert_eq!(tokens, vec![Bytes::from(vec![10; 4]), Bytes::from(vec![11; 4])]);
    }

    #[tokio::test]
    async fn test_materialize_merges_snapshot_and_live_log() {
        let (keypair, list_id) = setup();
        let store = MemoryStore::new();

        let old = entry(1, 1).sign(&keypair).unwrap();
        let new = entry(2, 2).sign(&keypair).unwrap();
        store.append(&list_id, &old).await.unwrap();
        store.append(&list_id, &new).await.unwrap();

        let list = EntryList::pending(list_id, keypair.public_key(), vec![old]);
        let count = list.materialize(&store, true).await.unwrap();

        assert_eq!(count, 2);
        assert_eq!(list.len(), 2);
        assert_eq!(list.tokens_for(&ObjectUrl::from_bytes([2; 32])).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_materialize_drops_forged_entries() {
        let (keypair, list_id) = setup();
        let forger = Keypair::generate();
        let store = MemoryStore::new();

        let forged = entry(9, 9).sign(&forger).unwrap();
        store.append(&list_id, &forged).await.unwrap();

        let list = EntryList::pending(list_id, keypair.public_key(), vec![]);
        assert_eq!(list.materialize(&store, true).await.unwrap(), 0);
        assert!(list.tokens_for(&ObjectUrl::from_bytes([9; 32])).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_materialize_without_verification_keeps_foreign_entries() {
        let (keypair, list_id) = setup();
        let other = Keypair::generate();
        let store = MemoryStore::new();

        store.append(&list_id, &entry(9, 9).sign(&other).unwrap()).await.unwrap();

        let list = EntryList::pending(list_id, keypair.public_key(), vec![]);
        assert_eq!(list.materialize(&store, false).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rematerialize_picks_up_new_entries() {
        let (keypair, list_id) = setup();
        let store = MemoryStore::new();
        let list = EntryList::new(list_id, keypair.public_key());

        store.append(&list_id, &entry(1, 1).sign(&keypair).unwrap()).await.unwrap();
        assert_eq!(list.materialize(&store, true).await.unwrap(), 1);

        store.append(&list_id, &entry(1, 2).sign(&keypair).unwrap()).await.unwrap();
        assert_eq!(list.materialize(&store, true).await.unwrap(), 2);
        assert_eq!(list.materialize(&store, true).await.unwrap(), 2);
    }

    #[test]
    fn test_from_records_rejects_forgery() {
        let (keypair, list_id) = setup();
        let forger = Keypair::generate();
        let forged = entry(1, 1).sign(&forger).unwrap();

        let err = EntryList::from_records(list_id, keypair.public_key(), vec![forged], true)
            .unwrap_err();
        assert!(matches!(err, AclError::InvalidEntry(_)));
    }
}
