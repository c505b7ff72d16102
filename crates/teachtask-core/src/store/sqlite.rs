//! SQLite-backed record store.
//!
//! Runtime defaults:
//! - `journal_mode = WAL` so a reader never blocks on a writer
//! - `busy_timeout = 5s` to ride out short lock contention between processes
//!
//! Each (user, variant) pair is one row; the item array is a JSON column and
//! is always rewritten whole.

use super::{Record, RecordStore, StoreError};
use crate::model::{Item, Variant};
use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params, types::Type};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

/// Busy timeout used for store connections.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Latest schema version understood by this binary.
pub const LATEST_SCHEMA_VERSION: u32 = 1;

/// Migration v1: one row per user per variant plus store metadata.
const MIGRATION_V1_SQL: &str = r"
CREATE TABLE IF NOT EXISTS user_lists (
    user_id TEXT NOT NULL CHECK (length(trim(user_id)) > 0),
    variant TEXT NOT NULL CHECK (variant IN ('task', 'todo')),
    items_json TEXT NOT NULL DEFAULT '[]',
    item_order INTEGER NOT NULL DEFAULT 0,
    revision INTEGER NOT NULL DEFAULT 0,
    created_at_us INTEGER NOT NULL,
    updated_at_us INTEGER NOT NULL,
    PRIMARY KEY (user_id, variant)
);

CREATE TABLE IF NOT EXISTS store_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO store_meta (id, schema_version) VALUES (1, 0);
";

const MIGRATIONS: &[(u32, &str)] = &[(1, MIGRATION_V1_SQL)];

/// Read `PRAGMA user_version` as a `u32`.
///
/// # Errors
///
/// Returns an error if querying SQLite fails or the version is out of range.
pub fn current_schema_version(conn: &Connection) -> rusqlite::Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(error))
    })
}

/// Apply all pending migrations in ascending order.
///
/// # Errors
///
/// Returns an error if any migration fails.
pub fn migrate(conn: &mut Connection) -> rusqlite::Result<u32> {
    let mut current = current_schema_version(conn)?;

    for (version, sql) in MIGRATIONS {
        if *version <= current {
            continue;
        }

        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", i64::from(*version))?;
        tx.execute(
            "UPDATE store_meta SET schema_version = ?1 WHERE id = 1",
            [i64::from(*version)],
        )?;
        tx.commit()?;
        current = *version;
    }

    Ok(current)
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    let _journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;
    conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
    Ok(())
}

#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the store database, apply pragmas and migrate.
    ///
    /// # Errors
    ///
    /// Returns an error if opening, configuring or migrating the database fails.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create store directory {}", parent.display()))?;
        }

        let mut conn = Connection::open(path)
            .with_context(|| format!("open store database {}", path.display()))?;

        configure_connection(&conn).context("configure sqlite pragmas")?;
        migrate(&mut conn).context("apply store migrations")?;
        debug!(path = %path.display(), "opened sqlite record store");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory database, migrated. Used by tests.
    ///
    /// # Errors
    ///
    /// Returns an error if migration fails.
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory().context("open in-memory store")?;
        migrate(&mut conn).context("apply store migrations")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Remote("connection lock poisoned".to_string()))
    }

    fn not_found(user_id: &str, variant: Variant) -> StoreError {
        StoreError::NotFound {
            user_id: user_id.to_string(),
            variant,
        }
    }
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

fn to_u64(value: i64) -> Result<u64, StoreError> {
    u64::try_from(value).map_err(|_| StoreError::Remote(format!("negative counter {value}")))
}

fn to_i64(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::Remote(format!("counter overflow {value}")))
}

impl RecordStore for SqliteStore {
    fn ensure_record(&self, user_id: &str, variant: Variant) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let now = now_us();
        let inserted = conn.execute(
            "INSERT INTO user_lists (user_id, variant, created_at_us, updated_at_us)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT (user_id, variant) DO NOTHING",
            params![user_id, variant.to_string(), now],
        )?;
        Ok(inserted == 1)
    }

    fn fetch(&self, user_id: &str, variant: Variant) -> Result<Record, StoreError> {
        let conn = self.lock()?;
        let row: Option<(String, i64, i64)> = conn
            .query_row(
                "SELECT items_json, item_order, revision
                 FROM user_lists WHERE user_id = ?1 AND variant = ?2",
                params![user_id, variant.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()?;

        let (items_json, order, revision) = row.ok_or_else(|| Self::not_found(user_id, variant))?;
        let items: Vec<Item> = serde_json::from_str(&items_json)?;

        Ok(Record {
            user_id: user_id.to_string(),
            variant,
            items,
            order: usize::try_from(order).unwrap_or(0),
            revision: to_u64(revision)?,
        })
    }

    fn replace_all(
        &self,
        user_id: &str,
        variant: Variant,
        items: &[Item],
    ) -> Result<u64, StoreError> {
        let payload = serde_json::to_string(items)?;
        let count = to_i64(items.len() as u64)?;
        let conn = self.lock()?;
        let revision: Option<i64> = conn
            .query_row(
                "UPDATE user_lists
                 SET items_json = ?3, item_order = ?4, revision = revision + 1, updated_at_us = ?5
                 WHERE user_id = ?1 AND variant = ?2
                 RETURNING revision",
                params![user_id, variant.to_string(), payload, count, now_us()],
                |row| row.get(0),
            )
            .optional()?;

        to_u64(revision.ok_or_else(|| Self::not_found(user_id, variant))?)
    }

    fn replace_if_revision(
        &self,
        user_id: &str,
        variant: Variant,
        items: &[Item],
        expected: u64,
    ) -> Result<u64, StoreError> {
        let payload = serde_json::to_string(items)?;
        let count = to_i64(items.len() as u64)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let actual: Option<i64> = tx
            .query_row(
                "SELECT revision FROM user_lists WHERE user_id = ?1 AND variant = ?2",
                params![user_id, variant.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let actual = to_u64(actual.ok_or_else(|| Self::not_found(user_id, variant))?)?;

        if actual != expected {
            return Err(StoreError::Conflict {
                user_id: user_id.to_string(),
                variant,
                expected,
                actual,
            });
        }

        tx.execute(
            "UPDATE user_lists
             SET items_json = ?3, item_order = ?4, revision = ?5, updated_at_us = ?6
             WHERE user_id = ?1 AND variant = ?2",
            params![
                user_id,
                variant.to_string(),
                payload,
                count,
                to_i64(expected + 1)?,
                now_us()
            ],
        )?;
        tx.commit()?;

        Ok(expected + 1)
    }
}
