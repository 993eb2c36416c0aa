//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::now_millis;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {} is newer than supported version {}",
            current, CURRENT_VERSION
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
            debug!(version, "applied schema migration");
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Content-addressed objects
        CREATE TABLE objects (
            url BLOB PRIMARY KEY,             -- 32 bytes, Blake3 of canonical bytes
            kind TEXT NOT NULL,               -- identity | public_acl | master_acl
            body BLOB NOT NULL,               -- canonical CBOR of the StoredObject
            stored_at INTEGER NOT NULL
        );

        -- Append-only entry logs
        CREATE TABLE entries (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            list_id BLOB NOT NULL,            -- 32 bytes
            signature BLOB NOT NULL,          -- 64 bytes, Ed25519 signature
            data BLOB NOT NULL,               -- signed canonical bytes
            appended_at INTEGER NOT NULL,

            UNIQUE(list_id, signature)
        );

        CREATE INDEX idx_objects_kind ON objects(kind);
        CREATE INDEX idx_entries_list ON entries(list_id, seq);
        "#,
    )?;

    Ok(())
}
