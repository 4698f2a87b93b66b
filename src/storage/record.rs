//! Mapping between domain records and SQLite rows
//!
//! Every persisted kind implements [`Record`], which lets the store expose a
//! single generic CRUD surface (`get::<Container>`, `put(&item)`, ...)
//! instead of one method per kind.

use std::fmt;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::Result;
use crate::domain::{Container, Item};

/// The two persisted record kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Container,
    Item,
}

impl RecordKind {
    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            RecordKind::Container => "containers",
            RecordKind::Item => "items",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Container => f.write_str("container"),
            RecordKind::Item => f.write_str("item"),
        }
    }
}

/// A record kind the store knows how to persist
pub trait Record: Sized {
    const KIND: RecordKind;

    /// Column list used by every SELECT, in `from_row` order
    const COLUMNS: &'static str;

    /// Primary key
    fn id(&self) -> &str;

    /// Inserts or replaces the row
    fn upsert(&self, conn: &Connection) -> Result<()>;

    /// Inserts the row unless the ID exists; returns true if inserted
    fn insert_new(&self, conn: &Connection) -> Result<bool>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl Record for Container {
    const KIND: RecordKind = RecordKind::Container;
    const COLUMNS: &'static str = "id, name, location, description, created_at, archived, extra";

    fn id(&self) -> &str {
        &self.id
    }

    fn upsert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO containers (id, name, location, description, created_at, archived, extra)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                location = excluded.location,
                description = excluded.description,
                created_at = excluded.created_at,
                archived = excluded.archived,
                extra = excluded.extra",
            params![
                self.id,
                self.name,
                self.location,
                self.description,
                self.created_at.to_rfc3339(),
                self.archived,
                extra_json(&self.extra)?,
            ],
        )?;
        Ok(())
    }

    fn insert_new(&self, conn: &Connection) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT INTO containers (id, name, location, description, created_at, archived, extra)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO NOTHING",
            params![
                self.id,
                self.name,
                self.location,
                self.description,
                self.created_at.to_rfc3339(),
                self.archived,
                extra_json(&self.extra)?,
            ],
        )?;
        Ok(inserted == 1)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Container {
            id: row.get(0)?,
            name: row.get(1)?,
            location: row.get(2)?,
            description: row.get(3)?,
            created_at: timestamp_column(row, 4)?,
            archived: row.get(5)?,
            extra: extra_column(row, 6)?,
        })
    }
}

impl Record for Item {
    const KIND: RecordKind = RecordKind::Item;
    const COLUMNS: &'static str = "id, container_id, description, tags, photo, added_at, extra";

    fn id(&self) -> &str {
        &self.id
    }

    fn upsert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO items (id, container_id, description, tags, photo, added_at, extra)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO UPDATE SET
                container_id = excluded.container_id,
                description = excluded.description,
                tags = excluded.tags,
                photo = excluded.photo,
                added_at = excluded.added_at,
                extra = excluded.extra",
            params![
                self.id,
                self.container_id,
                self.description,
                serde_json::to_string(&self.tags)?,
                self.photo,
                self.added_at.to_rfc3339(),
                extra_json(&self.extra)?,
            ],
        )?;
        Ok(())
    }

    fn insert_new(&self, conn: &Connection) -> Result<bool> {
        let inserted = conn.execute(
            "INSERT INTO items (id, container_id, description, tags, photo, added_at, extra)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO NOTHING",
            params![
                self.id,
                self.container_id,
                self.description,
                serde_json::to_string(&self.tags)?,
                self.photo,
                self.added_at.to_rfc3339(),
                extra_json(&self.extra)?,
            ],
        )?;
        Ok(inserted == 1)
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Item {
            id: row.get(0)?,
            container_id: row.get(1)?,
            description: row.get(2)?,
            tags: json_column(row, 3)?,
            photo: row.get(4)?,
            added_at: timestamp_column(row, 5)?,
            extra: extra_column(row, 6)?,
        })
    }
}

/// Empty extra maps are stored as NULL
fn extra_json(extra: &Map<String, Value>) -> Result<Option<String>> {
    if extra.is_empty() {
        Ok(None)
    } else {
        Ok(Some(serde_json::to_string(extra)?))
    }
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn extra_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Map<String, Value>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e)),
        None => Ok(Map::new()),
    }
}
