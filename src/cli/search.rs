//! Search command

use anyhow::Result;

use super::app::Session;
use crate::search::{EntryKind, SearchEngine};

pub fn run(session: &Session, query: &str, archived: bool) -> Result<()> {
    let include_archived = archived || session.config.show_archived;

    let mut engine = SearchEngine::new();
    let hits = engine.query(&session.store, query, include_archived)?;

    session
        .output
        .verbose_ctx("search", &format!("{} hits", hits.len()));

    if session.output.is_json() {
        session.output.data(&hits);
        return Ok(());
    }

    if hits.is_empty() {
        if query.trim().is_empty() {
            println!("No containers");
        } else {
            println!("No matches for '{}'", query.trim());
        }
        return Ok(());
    }

    println!("{:<10} {:<38} {:<30} CONTAINER", "KIND", "ID", "NAME");
    println!("{}", "-".repeat(90));
    for hit in &hits {
        let entry = &hit.entry;
        let kind = match entry.kind {
            EntryKind::Container => "container",
            EntryKind::Item => "item",
        };
        let name = if entry.archived {
            format!("{} (archived)", entry.name)
        } else {
            entry.name.clone()
        };
        println!(
            "{:<10} {:<38} {:<30} {}",
            kind, entry.id, name, entry.container_id
        );
    }

    Ok(())
}
