//! Scan resolution
//!
//! Turns the decoded text of a label into a container lookup. Unknown IDs
//! are reported as unclaimed so a fresh label can be put into use.

use anyhow::Result;

use super::app::Session;
use super::container::print_container;
use crate::domain::{id, Container};

pub fn run(session: &Session, text: &str) -> Result<()> {
    let id = id::scanned_id(text)?;
    session.output.verbose_ctx("scan", &format!("Resolving '{}'", id));

    let Some(container) = session.store.get::<Container>(&id)? else {
        if session.output.is_json() {
            session.output.data(&serde_json::json!({
                "id": id,
                "exists": false,
            }));
        } else {
            println!("No container with ID {}.", id);
            println!("Create it with: binman container add {}", id);
        }
        return Ok(());
    };

    let sort = session.config.item_sort;
    let mut items = session.store.items_in_container(&container.id)?;
    sort.apply(&mut items);

    if container.archived {
        session
            .output
            .warning(&format!("{} is archived", container.label()));
    }

    print_container(&session.output, &container, &items, sort);
    Ok(())
}
