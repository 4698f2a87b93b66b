//! Container CLI commands

use std::collections::HashMap;

use anyhow::Result;
use clap::Subcommand;

use super::app::Session;
use super::output::Output;
use crate::domain::{id, Container, Item, ItemSort};
use crate::storage::StoreError;

#[derive(Subcommand)]
pub enum ContainerCommands {
    /// Add a container with an explicit ID
    ///
    /// Examples:
    ///   binman container add BIN-001 --name Tools --location Garage
    ///   binman container add SHELF-A
    Add {
        /// Container ID (usually what is printed on the label)
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Change a container's name, location or description
    Edit {
        /// Container ID
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        location: Option<String>,

        /// New description (empty string clears it)
        #[arg(long)]
        description: Option<String>,
    },

    /// Create blank containers with the next sequential IDs
    Generate {
        /// How many containers to create
        #[arg(value_parser = clap::value_parser!(u16).range(1..=500))]
        count: u16,
    },

    /// List containers
    List {
        /// Include archived containers
        #[arg(long)]
        all: bool,
    },

    /// Show a container and its items
    Show {
        /// Container ID
        id: String,

        /// Item order: newest, oldest, az or za
        #[arg(long)]
        sort: Option<ItemSort>,
    },

    /// Archive a container, or restore it if already archived
    Archive {
        /// Container ID
        id: String,
    },

    /// Delete a container and every item in it
    Delete {
        /// Container ID
        id: String,
    },
}

pub fn run(cmd: ContainerCommands, session: &mut Session) -> Result<()> {
    match cmd {
        ContainerCommands::Add {
            id,
            name,
            location,
            description,
        } => add_container(session, &id, name, location, description),
        ContainerCommands::Edit {
            id,
            name,
            location,
            description,
        } => edit_container(session, &id, name, location, description),
        ContainerCommands::Generate { count } => generate_containers(session, usize::from(count)),
        ContainerCommands::List { all } => list_containers(session, all),
        ContainerCommands::Show { id, sort } => {
            let sort = sort.unwrap_or(session.config.item_sort);
            show_container(session, &id, sort)
        }
        ContainerCommands::Archive { id } => archive_container(session, &id),
        ContainerCommands::Delete { id } => delete_container(session, &id),
    }
}

fn add_container(
    session: &mut Session,
    raw_id: &str,
    name: Option<String>,
    location: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let id = id::container_id(raw_id)?;

    if session.store.contains::<Container>(&id)? {
        anyhow::bail!("Container already exists: {}", id);
    }

    let mut container = Container::new(&id)
        .with_name(name.unwrap_or_default().trim())
        .with_location(location.unwrap_or_default().trim());
    if let Some(description) = description {
        container.set_description(description);
    }

    session.store.put(&container)?;

    if session.output.is_json() {
        session.output.data(&container);
    } else {
        session
            .output
            .success(&format!("Created container: {}", describe(&container)));
    }

    Ok(())
}

fn edit_container(
    session: &mut Session,
    id: &str,
    name: Option<String>,
    location: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if name.is_none() && location.is_none() && description.is_none() {
        anyhow::bail!("Nothing to change. Pass --name, --location or --description.");
    }

    let mut container = require_container(session, id)?;

    if let Some(name) = name {
        container.name = name.trim().to_string();
    }
    if let Some(location) = location {
        container.location = location.trim().to_string();
    }
    if let Some(description) = description {
        container.set_description(description);
    }

    session.store.put(&container)?;

    if session.output.is_json() {
        session.output.data(&container);
    } else {
        session
            .output
            .success(&format!("Updated container: {}", describe(&container)));
    }

    Ok(())
}

fn generate_containers(session: &mut Session, count: usize) -> Result<()> {
    let prefix = session.config.ids.prefix.trim().to_string();
    let width = session.config.ids.width;

    let existing = session.store.container_ids()?;
    let ids = id::sequential_ids(&existing, &prefix, width, count)?;
    session
        .output
        .verbose_ctx("generate", &format!("Next IDs: {}", ids.join(", ")));

    let containers: Vec<Container> = ids.iter().map(Container::new).collect();
    session.store.atomic("generate", |batch| {
        for container in &containers {
            if !batch.insert_new(container)? {
                return Err(StoreError::Validation(format!(
                    "container {} already exists",
                    container.id
                )));
            }
        }
        Ok(())
    })?;

    if session.output.is_json() {
        session.output.data(&ids);
    } else {
        session.output.success(&format!(
            "Created {} container{}: {}",
            ids.len(),
            if ids.len() == 1 { "" } else { "s" },
            ids.join(", ")
        ));
    }

    Ok(())
}

fn list_containers(session: &Session, all: bool) -> Result<()> {
    let include_archived = all || session.config.show_archived;

    let containers: Vec<Container> = session
        .store
        .get_all::<Container>()?
        .into_iter()
        .filter(|c| include_archived || !c.archived)
        .collect();

    let mut item_counts: HashMap<String, usize> = HashMap::new();
    for item in session.store.get_all::<Item>()? {
        *item_counts.entry(item.container_id).or_default() += 1;
    }

    if session.output.is_json() {
        let rows: Vec<_> = containers
            .iter()
            .map(|c| {
                serde_json::json!({
                    "id": c.id,
                    "name": c.name,
                    "location": c.location,
                    "archived": c.archived,
                    "items": item_counts.get(&c.id).copied().unwrap_or(0),
                })
            })
            .collect();
        session.output.data(&rows);
    } else if containers.is_empty() {
        println!("No containers");
    } else {
        println!("{:<14} {:<24} {:<16} ITEMS", "ID", "NAME", "LOCATION");
        println!("{}", "-".repeat(64));
        for c in &containers {
            let name = if c.archived {
                format!("{} (archived)", c.name)
            } else {
                c.name.clone()
            };
            println!(
                "{:<14} {:<24} {:<16} {}",
                c.id,
                name,
                c.location,
                item_counts.get(&c.id).copied().unwrap_or(0)
            );
        }
    }

    Ok(())
}

fn show_container(session: &Session, id: &str, sort: ItemSort) -> Result<()> {
    let container = require_container(session, id)?;
    let mut items = session.store.items_in_container(&container.id)?;
    sort.apply(&mut items);

    print_container(&session.output, &container, &items, sort);
    Ok(())
}

/// Renders a container with its items (shared with `scan`)
pub(crate) fn print_container(output: &Output, container: &Container, items: &[Item], sort: ItemSort) {
    if output.is_json() {
        output.data(&serde_json::json!({
            "container": container,
            "items": items,
            "sort": sort,
        }));
        return;
    }

    println!("Container: {}", container.id);
    if !container.name.is_empty() {
        println!("Name: {}", container.name);
    }
    if !container.location.is_empty() {
        println!("Location: {}", container.location);
    }
    println!("Created: {}", container.created_at.format("%Y-%m-%d %H:%M"));
    if container.archived {
        println!("Status: ARCHIVED");
    }

    if let Some(desc) = &container.description {
        println!("\nDescription:");
        println!("{}", desc);
    }

    println!();
    if items.is_empty() {
        println!("No items");
        return;
    }

    println!("Items ({}, {}):", items.len(), sort);
    for item in items {
        let photo = if item.photo.is_some() { " [photo]" } else { "" };
        if item.tags.is_empty() {
            println!("  {}{}", item.description, photo);
        } else {
            println!("  {} [{}]{}", item.description, item.tags.join(", "), photo);
        }
        println!("    {}", item.id);
    }
}

fn archive_container(session: &mut Session, id: &str) -> Result<()> {
    let mut container = require_container(session, id)?;
    let archived = container.toggle_archived();
    session.store.put(&container)?;

    if session.output.is_json() {
        session.output.data(&serde_json::json!({
            "id": container.id,
            "archived": archived,
        }));
    } else if archived {
        session
            .output
            .success(&format!("Archived container: {}", container.id));
    } else {
        session
            .output
            .success(&format!("Restored container: {}", container.id));
    }

    Ok(())
}

fn delete_container(session: &mut Session, id: &str) -> Result<()> {
    let report = session.store.delete_cascade(id)?;

    if !report.container_removed && report.items_removed() == 0 {
        anyhow::bail!("Container not found: {}", id);
    }

    if session.output.is_json() {
        session.output.data(&report);
    } else {
        session.output.success(&format!(
            "Deleted container {} and {} item{}",
            report.container_id,
            report.items_removed(),
            if report.items_removed() == 1 { "" } else { "s" }
        ));
    }

    Ok(())
}

fn require_container(session: &Session, id: &str) -> Result<Container> {
    session
        .store
        .get::<Container>(id)?
        .ok_or_else(|| anyhow::anyhow!("Container not found: {}", id))
}

fn describe(container: &Container) -> String {
    if container.name.is_empty() {
        container.id.clone()
    } else {
        format!("{} - {}", container.id, container.name)
    }
}
