//! Import and export of the whole store
//!
//! Export writes a single JSON document:
//!
//! ```json
//! { "containers": [...], "items": [...], "exportedAt": "2024-03-01T10:00:00Z" }
//! ```
//!
//! Import accepts the same shape (either collection may be omitted), validates
//! it completely before touching the store, and then applies it in one atomic
//! batch under an [`ImportMode`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use super::error::{Result, StoreError};
use super::record::Record;
use super::store::{Batch, Store};
use crate::domain::{Container, Item};

/// Snapshot of the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub containers: Vec<Container>,
    pub items: Vec<Item>,
    pub exported_at: DateTime<Utc>,
}

/// A validated import document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportDocument {
    pub containers: Vec<Container>,
    pub items: Vec<Item>,
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown import mode '{0}' (expected replace-all, merge-keep-existing or merge-overwrite)")]
pub struct ModeParseError(String);

/// How an import reconciles with existing records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportMode {
    /// Delete everything, then insert every incoming record
    ReplaceAll,
    /// Skip incoming records whose ID already exists
    #[default]
    MergeKeepExisting,
    /// Upsert every incoming record
    MergeOverwrite,
}

impl ImportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportMode::ReplaceAll => "replace-all",
            ImportMode::MergeKeepExisting => "merge-keep-existing",
            ImportMode::MergeOverwrite => "merge-overwrite",
        }
    }
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportMode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "replace-all" => Ok(ImportMode::ReplaceAll),
            "merge-keep-existing" => Ok(ImportMode::MergeKeepExisting),
            "merge-overwrite" => Ok(ImportMode::MergeOverwrite),
            other => Err(ModeParseError(other.to_string())),
        }
    }
}

/// What an import changed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub mode: ImportMode,
    pub containers_written: usize,
    pub containers_skipped: usize,
    pub items_written: usize,
    pub items_skipped: usize,

    /// Items left pointing at a container that does not exist
    pub orphaned_items: usize,
}

impl ImportDocument {
    /// Parses and validates a JSON document
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| StoreError::Validation(format!("not valid JSON: {}", e)))?;
        Self::from_value(value)
    }

    /// Validates an already-parsed document
    pub fn from_value(value: Value) -> Result<Self> {
        validate(&value)?;

        let Value::Object(mut doc) = value else {
            return Err(invalid("document must be a JSON object"));
        };

        let mut items: Vec<Item> = take_records(&mut doc, "items")?;
        for item in &mut items {
            let tags = std::mem::take(&mut item.tags);
            item.set_tags(tags);
        }

        Ok(Self {
            containers: take_records(&mut doc, "containers")?,
            items,
        })
    }
}

impl From<ExportDocument> for ImportDocument {
    fn from(export: ExportDocument) -> Self {
        Self {
            containers: export.containers,
            items: export.items,
        }
    }
}

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::Validation(message.into())
}

/// Treats a missing or `null` collection as absent
fn collection<'a>(doc: &'a serde_json::Map<String, Value>, key: &str) -> Option<&'a Value> {
    doc.get(key).filter(|v| !v.is_null())
}

fn non_empty_str(record: &Value, field: &str) -> bool {
    record
        .get(field)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Structural checks, run before anything is decoded or written
fn validate(value: &Value) -> Result<()> {
    let doc = value
        .as_object()
        .ok_or_else(|| invalid("document must be a JSON object"))?;

    let containers = collection(doc, "containers");
    let items = collection(doc, "items");

    if containers.is_none() && items.is_none() {
        return Err(invalid("expected a \"containers\" and/or \"items\" array"));
    }

    if let Some(containers) = containers {
        let list = containers
            .as_array()
            .ok_or_else(|| invalid("\"containers\" must be an array"))?;
        for (index, record) in list.iter().enumerate() {
            if !non_empty_str(record, "id") {
                return Err(invalid(format!(
                    "container #{} is missing a non-empty string \"id\"",
                    index + 1
                )));
            }
        }
    }

    if let Some(items) = items {
        let list = items
            .as_array()
            .ok_or_else(|| invalid("\"items\" must be an array"))?;
        for (index, record) in list.iter().enumerate() {
            if !non_empty_str(record, "id") {
                return Err(invalid(format!(
                    "item #{} is missing a non-empty string \"id\"",
                    index + 1
                )));
            }
            if !non_empty_str(record, "containerId") {
                return Err(invalid(format!(
                    "item #{} is missing a non-empty string \"containerId\"",
                    index + 1
                )));
            }
        }
    }

    Ok(())
}

fn take_records<T: serde::de::DeserializeOwned>(
    doc: &mut serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<T>> {
    match doc.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(list) => serde_json::from_value(list)
            .map_err(|e| invalid(format!("\"{}\" has a malformed record: {}", key, e))),
    }
}

impl Store {
    /// Takes a consistent snapshot of every container and item
    pub fn export(&self) -> Result<ExportDocument> {
        let (containers, items) = self.snapshot()?;

        info!(
            containers = containers.len(),
            items = items.len(),
            "exported store"
        );

        Ok(ExportDocument {
            containers,
            items,
            exported_at: Utc::now(),
        })
    }

    /// Reconciles a validated document into the store as one atomic unit
    pub fn import(&mut self, doc: &ImportDocument, mode: ImportMode) -> Result<ImportReport> {
        let report = self.atomic("import", |batch| apply(batch, doc, mode))?;

        info!(
            mode = %mode,
            containers = report.containers_written,
            items = report.items_written,
            skipped = report.containers_skipped + report.items_skipped,
            "imported document"
        );
        if report.orphaned_items > 0 {
            warn!(
                orphaned = report.orphaned_items,
                "items reference containers that do not exist"
            );
        }

        Ok(report)
    }

    /// Parses, validates and imports a JSON document
    pub fn import_json(&mut self, text: &str, mode: ImportMode) -> Result<ImportReport> {
        let doc = ImportDocument::parse(text)?;
        self.import(&doc, mode)
    }
}

fn apply(batch: &Batch<'_>, doc: &ImportDocument, mode: ImportMode) -> Result<ImportReport> {
    let mut report = ImportReport {
        mode,
        containers_written: 0,
        containers_skipped: 0,
        items_written: 0,
        items_skipped: 0,
        orphaned_items: 0,
    };

    if mode == ImportMode::ReplaceAll {
        batch.clear::<Item>()?;
        batch.clear::<Container>()?;
    }

    for container in &doc.containers {
        if write(batch, container, mode)? {
            report.containers_written += 1;
        } else {
            report.containers_skipped += 1;
        }
    }

    for item in &doc.items {
        if write(batch, item, mode)? {
            report.items_written += 1;
        } else {
            report.items_skipped += 1;
        }
    }

    report.orphaned_items = batch.orphaned_items()?;
    Ok(report)
}

/// Writes one record according to `mode`; returns false if it was skipped
fn write<R: Record>(batch: &Batch<'_>, record: &R, mode: ImportMode) -> Result<bool> {
    match mode {
        ImportMode::MergeKeepExisting => batch.insert_new(record),
        ImportMode::ReplaceAll | ImportMode::MergeOverwrite => {
            batch.upsert(record)?;
            Ok(true)
        }
    }
}
