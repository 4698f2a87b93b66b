//! Status overview

use anyhow::Result;

use super::app::Session;
use crate::domain::Container;

/// Show database location and record counts
pub fn show(session: &Session) -> Result<()> {
    let store = &session.store;
    let counts = store.counts()?;
    let archived = store
        .get_all::<Container>()?
        .iter()
        .filter(|c| c.archived)
        .count();
    let path = store
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());

    if session.output.is_json() {
        session.output.data(&serde_json::json!({
            "database": path,
            "containers": {
                "total": counts.containers,
                "active": counts.containers - archived,
                "archived": archived,
            },
            "items": counts.items,
        }));
    } else {
        println!("Bin Status");
        println!("{}", "=".repeat(40));
        println!();
        println!("Database: {}", path);
        println!(
            "Containers: {} total ({} active, {} archived)",
            counts.containers,
            counts.containers - archived,
            archived
        );
        println!("Items: {}", counts.items);
    }

    Ok(())
}
