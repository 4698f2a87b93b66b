//! Export and import commands

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use super::app::Session;
use crate::storage::{ImportDocument, ImportMode};

/// Write the whole store as JSON to `path`, or stdout
pub fn export(session: &Session, path: Option<&Path>) -> Result<()> {
    let doc = session.store.export()?;
    let json = serde_json::to_string_pretty(&doc).context("Failed to serialize export")?;

    let Some(path) = path else {
        println!("{}", json);
        return Ok(());
    };

    fs::write(path, json + "\n")
        .with_context(|| format!("Failed to write export: {}", path.display()))?;

    if session.output.is_json() {
        session.output.data(&serde_json::json!({
            "path": path.display().to_string(),
            "containers": doc.containers.len(),
            "items": doc.items.len(),
            "exportedAt": doc.exported_at,
        }));
    } else {
        session.output.success(&format!(
            "Exported {} containers and {} items to {}",
            doc.containers.len(),
            doc.items.len(),
            path.display()
        ));
    }

    Ok(())
}

/// Read an export file and reconcile it into the store
pub fn import(session: &mut Session, path: &Path, mode: ImportMode, yes: bool) -> Result<()> {
    if mode == ImportMode::ReplaceAll && !yes {
        anyhow::bail!(
            "replace-all deletes every existing container and item. Re-run with --yes to confirm."
        );
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let doc = ImportDocument::parse(&text)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    session.output.verbose_ctx(
        "import",
        &format!(
            "{} containers and {} items in document, mode {}",
            doc.containers.len(),
            doc.items.len(),
            mode
        ),
    );

    let report = session
        .store
        .import(&doc, mode)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    if session.output.is_json() {
        session.output.data(&report);
        return Ok(());
    }

    session.output.success(&format!(
        "Imported {} containers and {} items ({})",
        report.containers_written, report.items_written, report.mode
    ));
    if report.containers_skipped + report.items_skipped > 0 {
        println!(
            "Skipped {} containers and {} items that already exist",
            report.containers_skipped, report.items_skipped
        );
    }
    if report.orphaned_items > 0 {
        session.output.warning(&format!(
            "{} items reference containers that do not exist",
            report.orphaned_items
        ));
    }

    Ok(())
}
