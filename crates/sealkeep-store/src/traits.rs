//! Persistence trait: the abstract interface consumed by access control lists.
//!
//! Two kinds of state live behind it:
//!
//! - **Objects**: content addressed. `store` returns the url, which is a pure
//!   function of the object and can be computed with [`StoredObject::url`]
//!   before the store completes.
//! - **Entry logs**: append-only sets of signed records keyed by [`ListId`].
//!   An append is atomic: a record is either fully visible or absent.

use std::sync::Arc;

use async_trait::async_trait;
use sealkeep_core::{ListId, ObjectUrl, SignedRecord, StoredObject};

use crate::error::Result;

/// Result of appending a record to an entry log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendResult {
    /// Record was appended.
    Appended,
    /// The same record (by signature) is already in the log.
    AlreadyPresent,
}

/// Async interface for object and entry-log persistence.
///
/// Cancellation and timeouts are the implementation's business; they surface
/// as [`StoreError::Cancelled`](crate::StoreError::Cancelled) and
/// [`StoreError::Timeout`](crate::StoreError::Timeout) and callers must not
/// reinterpret them.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Fetch the object stored under `url`.
    ///
    /// Returns `StoreError::NotFound` when nothing is stored there.
    async fn fetch(&self, url: &ObjectUrl) -> Result<StoredObject>;

    /// Store an object, returning its content address.
    ///
    /// Storing the same object twice is a no-op.
    async fn store(&self, object: &StoredObject) -> Result<ObjectUrl>;

    /// Whether an object is stored under `url`.
    async fn contains(&self, url: &ObjectUrl) -> Result<bool>;

    /// Append a signed record to the log of `list_id`.
    async fn append(&self, list_id: &ListId, record: &SignedRecord) -> Result<AppendResult>;

    /// Every record appended to `list_id`, in append order.
    ///
    /// Unknown lists have an empty log.
    async fn entries(&self, list_id: &ListId) -> Result<Vec<SignedRecord>>;
}

#[async_trait]
impl<T: Persistence + ?Sized> Persistence for Arc<T> {
    async fn fetch(&self, url: &ObjectUrl) -> Result<StoredObject> {
        (**self).fetch(url).await
    }

    async fn store(&self, object: &StoredObject) -> Result<ObjectUrl> {
        (**self).store(object).await
    }

    async fn contains(&self, url: &ObjectUrl) -> Result<bool> {
        (**self).contains(url).await
    }

    async fn append(&self, list_id: &ListId, record: &SignedRecord) -> Result<AppendResult> {
        (**self).append(list_id, record).await
    }

    async fn entries(&self, list_id: &ListId) -> Result<Vec<SignedRecord>> {
        (**self).entries(list_id).await
    }
}
