//! Fault injection for the persistence layer.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use sealkeep_core::{ListId, ObjectUrl, SignedRecord, StoredObject};
use sealkeep_store::{AppendResult, Persistence, Result, StoreError};

/// Which failure to inject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Cancelled,
    Timeout,
}

impl Fault {
    fn error(self) -> StoreError {
        match self {
            Fault::Cancelled => StoreError::Cancelled,
            Fault::Timeout => StoreError::Timeout("injected".into()),
        }
    }
}

/// Wraps a persistence layer and fails operations on demand.
///
/// Writes (`store`, `append`) are never failed; reads (`fetch`, `entries`)
/// fail while armed.
pub struct FaultyStore<P> {
    inner: P,
    fault: Fault,
    armed: AtomicBool,
}

impl<P: Persistence> FaultyStore<P> {
    /// Wrap `inner`, initially disarmed.
    pub fn new(inner: P, fault: Fault) -> Self {
        Self {
            inner,
            fault,
            armed: AtomicBool::new(false),
        }
    }

    /// Start failing reads.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Stop failing reads.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.armed.load(Ordering::SeqCst) {
            Err(self.fault.error())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl<P: Persistence> Persistence for FaultyStore<P> {
    async fn fetch(&self, url: &ObjectUrl) -> Result<StoredObject> {
        self.check()?;
        self.inner.fetch(url).await
    }

    async fn store(&self, object: &StoredObject) -> Result<ObjectUrl> {
        self.inner.store(object).await
    }

    async fn contains(&self, url: &ObjectUrl) -> Result<bool> {
        self.check()?;
        self.inner.contains(url).await
    }

    async fn append(&self, list_id: &ListId, record: &SignedRecord) -> Result<AppendResult> {
        self.inner.append(list_id, record).await
    }

    async fn entries(&self, list_id: &ListId) -> Result<Vec<SignedRecord>> {
        self.check()?;
        self.inner.entries(list_id).await
    }
}
