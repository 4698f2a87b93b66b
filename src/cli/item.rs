//! Item CLI commands

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use clap::Subcommand;

use super::app::Session;
use crate::domain::{parse_tag_list, Container, Item};

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Add an item to a container
    ///
    /// Examples:
    ///   binman item add BIN-001 "Claw hammer" --tags tools,hand
    ///   binman item add BIN-002 "Xmas lights" --photo lights.jpg
    Add {
        /// Container ID
        container: String,

        /// What the item is
        description: String,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Image file to attach (jpg, png, gif or webp)
        #[arg(long)]
        photo: Option<std::path::PathBuf>,
    },

    /// Change an item's description, tags or photo
    Edit {
        /// Item ID
        id: String,

        #[arg(long)]
        description: Option<String>,

        /// Comma-separated tags (empty string clears them)
        #[arg(long)]
        tags: Option<String>,

        /// Replace the photo with this image file
        #[arg(long, conflicts_with = "clear_photo")]
        photo: Option<std::path::PathBuf>,

        /// Remove the photo
        #[arg(long)]
        clear_photo: bool,
    },

    /// Show item details
    Show {
        /// Item ID
        id: String,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },
}

pub fn run(cmd: ItemCommands, session: &mut Session) -> Result<()> {
    match cmd {
        ItemCommands::Add {
            container,
            description,
            tags,
            photo,
        } => add_item(session, &container, &description, tags.as_deref(), photo.as_deref()),
        ItemCommands::Edit {
            id,
            description,
            tags,
            photo,
            clear_photo,
        } => edit_item(
            session,
            &id,
            description.as_deref(),
            tags.as_deref(),
            photo.as_deref(),
            clear_photo,
        ),
        ItemCommands::Show { id } => show_item(session, &id),
        ItemCommands::Delete { id } => delete_item(session, &id),
    }
}

fn add_item(
    session: &mut Session,
    container_id: &str,
    description: &str,
    tags: Option<&str>,
    photo: Option<&Path>,
) -> Result<()> {
    let description = description.trim();
    if description.is_empty() {
        anyhow::bail!("Item description cannot be empty");
    }

    // The store does not enforce references
    if !session.store.contains::<Container>(container_id)? {
        anyhow::bail!(
            "Container not found: {}. Create it first with 'binman container add {}'.",
            container_id,
            container_id
        );
    }

    let mut item = Item::new(container_id, description);
    if let Some(tags) = tags {
        item.set_tags(parse_tag_list(tags));
    }
    if let Some(path) = photo {
        item.photo = Some(photo_data_url(path)?);
    }

    session.store.put(&item)?;

    if session.output.is_json() {
        session.output.data(&item);
    } else {
        session.output.success(&format!(
            "Added item to {}: {} ({})",
            item.container_id, item.description, item.id
        ));
    }

    Ok(())
}

fn edit_item(
    session: &mut Session,
    id: &str,
    description: Option<&str>,
    tags: Option<&str>,
    photo: Option<&Path>,
    clear_photo: bool,
) -> Result<()> {
    if description.is_none() && tags.is_none() && photo.is_none() && !clear_photo {
        anyhow::bail!("Nothing to change. Pass --description, --tags, --photo or --clear-photo.");
    }

    let photo = photo.map(photo_data_url).transpose()?;

    let mut item = require_item(session, id)?;

    if let Some(description) = description {
        let description = description.trim();
        if description.is_empty() {
            anyhow::bail!("Item description cannot be empty");
        }
        item.description = description.to_string();
    }
    if let Some(tags) = tags {
        item.set_tags(parse_tag_list(tags));
    }
    if photo.is_some() {
        item.photo = photo;
    } else if clear_photo {
        item.photo = None;
    }

    session.store.put(&item)?;

    if session.output.is_json() {
        session.output.data(&item);
    } else {
        session
            .output
            .success(&format!("Updated item: {} ({})", item.description, item.id));
    }

    Ok(())
}

fn show_item(session: &Session, id: &str) -> Result<()> {
    let item = require_item(session, id)?;
    let container = session.store.get::<Container>(&item.container_id)?;

    if session.output.is_json() {
        session.output.data(&serde_json::json!({
            "item": item,
            "container": container,
        }));
        return Ok(());
    }

    println!("Item: {}", item.id);
    println!("Description: {}", item.description);
    match &container {
        Some(c) if c.name.is_empty() => println!("Container: {}", c.id),
        Some(c) => println!("Container: {} ({})", c.id, c.name),
        None => println!("Container: {} (missing)", item.container_id),
    }
    if let Some(location) = container.as_ref().map(|c| &c.location).filter(|l| !l.is_empty()) {
        println!("Location: {}", location);
    }
    if !item.tags.is_empty() {
        println!("Tags: {}", item.tags.join(", "));
    }
    println!("Added: {}", item.added_at.format("%Y-%m-%d %H:%M"));
    if let Some(photo) = &item.photo {
        let size = photo.len();
        if item.has_inline_photo() {
            println!("Photo: inline image ({} bytes encoded)", size);
        } else {
            println!("Photo: {}", photo);
        }
    }

    Ok(())
}

fn delete_item(session: &mut Session, id: &str) -> Result<()> {
    if !session.store.delete::<Item>(id)? {
        anyhow::bail!("Item not found: {}", id);
    }

    if session.output.is_json() {
        session.output.data(&serde_json::json!({ "id": id, "deleted": true }));
    } else {
        session.output.success(&format!("Deleted item: {}", id));
    }

    Ok(())
}

fn require_item(session: &Session, id: &str) -> Result<Item> {
    session
        .store
        .get::<Item>(id)?
        .ok_or_else(|| anyhow::anyhow!("Item not found: {}", id))
}

/// Reads an image file and encodes it as a `data:` URL
fn photo_data_url(path: &Path) -> Result<String> {
    let mime = image_mime(path).ok_or_else(|| {
        anyhow::anyhow!(
            "Unsupported photo type: {} (expected jpg, png, gif or webp)",
            path.display()
        )
    })?;

    let bytes =
        fs::read(path).with_context(|| format!("Failed to read photo: {}", path.display()))?;

    Ok(format!("data:{};base64,{}", mime, STANDARD.encode(bytes)))
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
