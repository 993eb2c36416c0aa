//! SQLite implementation of the Persistence trait.
//!
//! This is the primary storage backend for Sealkeep. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use tracing::warn;

use sealkeep_core::{Ed25519Signature, ListId, ObjectUrl, SignedRecord, StoredObject};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::now_millis;
use crate::traits::{AppendResult, Persistence};

/// How long a statement waits on a locked database before giving up.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| {
            if e.is_cancelled() {
                StoreError::Cancelled
            } else {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                    Some(format!("spawn_blocking failed: {}", e)),
                ))
            }
        })?
        .map_err(classify)
    }
}

/// Report a busy database as a timeout rather than a generic database error.
fn classify(err: StoreError) -> StoreError {
    match err {
        StoreError::Database(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error {
                code: ErrorCode::DatabaseBusy,
                ..
            },
            msg,
        )) => StoreError::Timeout(msg.unwrap_or_else(|| "database busy".to_string())),
        other => other,
    }
}

// Helper to convert an entries row to a SignedRecord
fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<SignedRecord> {
    let signature_bytes: Vec<u8> = row.get("signature")?;
    let data: Vec<u8> = row.get("data")?;

    let signature = Ed25519Signature(signature_bytes.try_into().map_err(|_| {
        rusqlite::Error::InvalidColumnType(0, "signature".into(), rusqlite::types::Type::Blob)
    })?);

    Ok(SignedRecord {
        signature,
        data: Bytes::from(data),
    })
}

#[async_trait]
impl Persistence for SqliteStore {
    async fn fetch(&self, url: &ObjectUrl) -> Result<StoredObject> {
        let url = *url;

        self.run(move |conn| {
            let body: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT body FROM objects WHERE url = ?1",
                    params![url.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            let body = body.ok_or_else(|| StoreError::NotFound(url.to_string()))?;
            let object = StoredObject::from_bytes(&body)
                .map_err(|e| StoreError::Serialization(e.to_string()))?;

            if object.url()? != url {
                warn!(url = %url, "stored object does not match its url");
                return Err(StoreError::InvalidData(format!(
                    "object stored under {} does not hash to its url",
                    url
                )));
            }

            Ok(object)
        })
        .await
    }

    async fn store(&self, object: &StoredObject) -> Result<ObjectUrl> {
        let body = object.to_bytes()?;
        let url = ObjectUrl::for_canonical(&body);
        let kind = object.kind().as_str();

        self.run(move |conn| {
            conn.execute(
                "INSERT OR IGNORE INTO objects (url, kind, body, stored_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![url.as_bytes().as_slice(), kind, body, now_millis()],
            )?;
            Ok(url)
        })
        .await
    }

    async fn contains(&self, url: &ObjectUrl) -> Result<bool> {
        let url = *url;

        self.run(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM objects WHERE url = ?1",
                    params![url.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn append(&self, list_id: &ListId, record: &SignedRecord) -> Result<AppendResult> {
        let list_id = *list_id;
        let record = record.clone();

        self.run(move |conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO entries (list_id, signature, data, appended_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    list_id.as_bytes().as_slice(),
                    record.signature.as_bytes().as_slice(),
                    record.data.as_ref(),
                    now_millis(),
                ],
            )?;

            if changed == 0 {
                Ok(AppendResult::AlreadyPresent)
            } else {
                Ok(AppendResult::Appended)
            }
        })
        .await
    }

    async fn entries(&self, list_id: &ListId) -> Result<Vec<SignedRecord>> {
        let list_id = *list_id;

        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT signature, data FROM entries WHERE list_id = ?1 ORDER BY seq",
            )?;

            let records = stmt
                .query_map(params![list_id.as_bytes().as_slice()], row_to_record)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(records)
        })
        .await
    }
}
