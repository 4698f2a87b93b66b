//! SQLite-backed record store
//!
//! The store is the single owner of container and item records. It lives in
//! one SQLite file (WAL mode) with one table per record kind and a secondary
//! index from items to their owning container.
//!
//! Every successful mutation bumps a change counter ([`Store::version`])
//! that derived views use to detect staleness. Counter values are drawn from
//! one process-wide sequence, so no two handles (including a handle reopened
//! on the same file) ever report the same version.
//! Multi-record operations run through [`Store::atomic`], which wraps them in
//! a single `IMMEDIATE` transaction: either every write lands or none does.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::Serialize;
use tracing::{debug, warn};

use super::error::{Result, StoreError};
use super::record::{Record, RecordKind};
use super::version::Versioned;
use crate::domain::{Container, Item};

/// Source of every store version handed out in this process
static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// Record counts per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub containers: usize,
    pub items: usize,
}

/// Handle to an open store
pub struct Store {
    /// Database file, `None` for in-memory stores
    path: Option<PathBuf>,

    conn: Connection,

    /// Change counter, moved forward after every committed mutation
    version: u64,
}

impl Store {
    /// Schema version stored in `PRAGMA user_version`
    const SCHEMA_VERSION: i32 = 1;

    /// Opens (creating if needed) the store at `path`
    ///
    /// Any failure here means durable storage is unusable and is reported as
    /// [`StoreError::StorageUnavailable`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::unavailable(path, e))?;
        }

        let conn = Connection::open(path).map_err(|e| StoreError::unavailable(path, e))?;
        let store = Self::init(conn, Some(path.to_path_buf()))?;
        debug!(path = %path.display(), "opened store");
        Ok(store)
    }

    /// Opens a throwaway in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::unavailable(":memory:", e))?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        let location = path.clone().unwrap_or_else(|| PathBuf::from(":memory:"));

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")
            .map_err(|e| StoreError::unavailable(&location, e))?;

        let store = Self {
            path,
            conn,
            version: next_version(),
        };

        store.ensure_schema(&location)?;

        Ok(store)
    }

    /// Creates tables on first open and refuses files from newer releases
    fn ensure_schema(&self, location: &Path) -> Result<()> {
        let current: i32 = self
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| StoreError::unavailable(location, e))?;

        if current > Self::SCHEMA_VERSION {
            return Err(StoreError::unavailable(
                location,
                format!(
                    "database schema version {} is newer than supported version {}",
                    current,
                    Self::SCHEMA_VERSION
                ),
            ));
        }

        self.create_tables()
            .map_err(|e| StoreError::unavailable(location, e))
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS containers (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL,
                archived INTEGER NOT NULL DEFAULT 0,
                extra TEXT
            );

            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                container_id TEXT NOT NULL,
                description TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                photo TEXT,
                added_at TEXT NOT NULL,
                extra TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_items_container ON items(container_id);
            ",
        )?;

        self.conn.execute(
            &format!("PRAGMA user_version = {}", Self::SCHEMA_VERSION),
            [],
        )?;

        Ok(())
    }

    /// Closes the underlying connection, flushing pending writes
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }

    /// Returns the database path, or `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the change counter
    pub fn version(&self) -> u64 {
        self.version
    }

    fn bump(&mut self) {
        self.version = next_version();
    }

    /// Returns every record of kind `R` in primary-key order
    pub fn get_all<R: Record>(&self) -> Result<Vec<R>> {
        select_all(&self.conn)
    }

    /// Returns the record with `id`, or `None` if absent
    pub fn get<R: Record>(&self, id: &str) -> Result<Option<R>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1",
            R::COLUMNS,
            R::KIND.table()
        );
        let record = self
            .conn
            .query_row(&sql, params![id], |row| R::from_row(row))
            .optional()?;
        Ok(record)
    }

    /// Returns true if a record of kind `R` with `id` exists
    pub fn contains<R: Record>(&self, id: &str) -> Result<bool> {
        exists::<R>(&self.conn, id)
    }

    /// Inserts or replaces a single record
    pub fn put<R: Record>(&mut self, record: &R) -> Result<()> {
        record.upsert(&self.conn)?;
        self.bump();
        debug!(kind = %R::KIND, id = record.id(), "put record");
        Ok(())
    }

    /// Inserts or replaces many records atomically
    pub fn put_many<R: Record>(&mut self, records: &[R]) -> Result<usize> {
        self.atomic("put_many", |batch| {
            for record in records {
                batch.upsert(record)?;
            }
            Ok(records.len())
        })
    }

    /// Deletes a record; deleting an absent ID is a no-op returning false
    ///
    /// Deleting a container always cascades to its items so no orphans are
    /// left behind.
    pub fn delete<R: Record>(&mut self, id: &str) -> Result<bool> {
        if R::KIND == RecordKind::Container {
            return Ok(self.delete_cascade(id)?.container_removed);
        }

        let removed = delete_row::<R>(&self.conn, id)?;
        self.bump();
        debug!(kind = %R::KIND, id, removed, "delete record");
        Ok(removed)
    }

    /// Counts records of kind `R`
    pub fn count<R: Record>(&self) -> Result<usize> {
        count_rows::<R>(&self.conn)
    }

    /// Counts both kinds
    pub fn counts(&self) -> Result<Counts> {
        Ok(Counts {
            containers: self.count::<Container>()?,
            items: self.count::<Item>()?,
        })
    }

    /// Returns the items stored in `container_id`, in no particular order
    pub fn items_in_container(&self, container_id: &str) -> Result<Vec<Item>> {
        select_items_in(&self.conn, container_id)
    }

    /// Returns every container ID (for ID sequencing)
    pub fn container_ids(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM containers")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Runs `f` as one atomic batch
    ///
    /// The batch commits only if `f` returns `Ok`; any error rolls back every
    /// write made through the batch and is reported as
    /// [`StoreError::TransactionAbort`]. The change counter is bumped once
    /// per committed batch.
    pub fn atomic<T, F>(&mut self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&Batch<'_>) -> Result<T>,
    {
        match self.run_transaction(f) {
            Ok(value) => {
                self.bump();
                debug!(operation, version = self.version, "batch committed");
                Ok(value)
            }
            Err(source) => {
                warn!(operation, error = %source, "batch rolled back");
                Err(StoreError::TransactionAbort {
                    operation,
                    source: Box::new(source),
                })
            }
        }
    }

    fn run_transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Batch<'_>) -> Result<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&Batch { conn: &tx })?;
        tx.commit()?;
        Ok(value)
    }

    /// Reads every container and item inside one read transaction
    pub fn snapshot(&self) -> Result<(Vec<Container>, Vec<Item>)> {
        self.read_snapshot(|conn| Ok((select_all(conn)?, select_all(conn)?)))
    }

    fn read_snapshot<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let tx = self.conn.unchecked_transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl Versioned for Store {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Write access inside an atomic batch
///
/// Obtained only through [`Store::atomic`]; all operations share the
/// batch's transaction.
pub struct Batch<'a> {
    conn: &'a Connection,
}

impl Batch<'_> {
    /// Inserts or replaces a record
    pub fn upsert<R: Record>(&self, record: &R) -> Result<()> {
        record.upsert(self.conn)
    }

    /// Inserts a record unless its ID exists; returns true if inserted
    pub fn insert_new<R: Record>(&self, record: &R) -> Result<bool> {
        record.insert_new(self.conn)
    }

    /// Deletes one record; returns true if it existed
    pub fn delete<R: Record>(&self, id: &str) -> Result<bool> {
        delete_row::<R>(self.conn, id)
    }

    /// Deletes every record of kind `R`, returning how many were removed
    pub fn clear<R: Record>(&self) -> Result<usize> {
        let removed = self
            .conn
            .execute(&format!("DELETE FROM {}", R::KIND.table()), [])?;
        Ok(removed)
    }

    /// IDs of the items stored in `container_id`
    pub fn item_ids_in(&self, container_id: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM items WHERE container_id = ?1")?;
        let ids = stmt
            .query_map(params![container_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }

    /// Deletes the items stored in `container_id`, returning how many were removed
    pub fn delete_items_in(&self, container_id: &str) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM items WHERE container_id = ?1", params![container_id])?;
        Ok(removed)
    }

    /// Counts items whose container does not exist
    pub fn orphaned_items(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items
             WHERE container_id NOT IN (SELECT id FROM containers)",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

fn select_all<R: Record>(conn: &Connection) -> Result<Vec<R>> {
    let sql = format!(
        "SELECT {} FROM {} ORDER BY id",
        R::COLUMNS,
        R::KIND.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let records = stmt
        .query_map([], |row| R::from_row(row))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(records)
}

fn select_items_in(conn: &Connection, container_id: &str) -> Result<Vec<Item>> {
    let sql = format!(
        "SELECT {} FROM items WHERE container_id = ?1",
        Item::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params![container_id], |row| Item::from_row(row))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(items)
}

fn exists<R: Record>(conn: &Connection, id: &str) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", R::KIND.table());
    let found = conn
        .query_row(&sql, params![id], |_| Ok(()))
        .optional()?
        .is_some();
    Ok(found)
}

fn delete_row<R: Record>(conn: &Connection, id: &str) -> Result<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", R::KIND.table());
    Ok(conn.execute(&sql, params![id])? > 0)
}

fn count_rows<R: Record>(conn: &Connection) -> Result<usize> {
    let sql = format!("SELECT COUNT(*) FROM {}", R::KIND.table());
    let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(count as usize)
}
