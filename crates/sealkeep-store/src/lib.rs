//! # Sealkeep Store
//!
//! Persistence abstraction for Sealkeep. Provides a trait-based interface
//! for content-addressed objects and append-only entry logs, with SQLite and
//! in-memory implementations.
//!
//! ## Key Types
//!
//! - [`Persistence`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests
//! - [`AppendResult`] - Result of appending a record to an entry log
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sealkeep_store::{Persistence, SqliteStore};
//! use sealkeep_core::Identity;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = SqliteStore::open("sealkeep.db")?;
//!
//!     let identity = Identity::generate()?;
//!     let url = store.store(&identity.to_object()).await?;
//!     assert_eq!(url, identity.url());
//!     Ok(())
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Content addressing**: an object's url is computable before it is stored
//! - **Idempotent appends**: appending a record already in the log is a no-op
//! - **Atomic appends**: a record is never partially visible

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{AppendResult, Persistence};

/// Current time in milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
