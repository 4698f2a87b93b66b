//! Search entries

use serde::Serialize;

use crate::domain::{Container, Item};

/// What a search entry points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Container,
    Item,
}

/// A flattened, searchable view of one container or item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntry {
    pub kind: EntryKind,
    pub id: String,

    /// Container name, or the item description
    pub name: String,

    pub location: String,
    pub description: String,
    pub tags: Vec<String>,

    /// The container itself, or the item's owning container
    pub container_id: String,

    /// Items inherit the flag of their owning container
    pub archived: bool,
}

impl SearchEntry {
    pub fn from_container(container: &Container) -> Self {
        Self {
            kind: EntryKind::Container,
            id: container.id.clone(),
            name: container.name.clone(),
            location: container.location.clone(),
            description: container.description.clone().unwrap_or_default(),
            tags: Vec::new(),
            container_id: container.id.clone(),
            archived: container.archived,
        }
    }

    pub fn from_item(item: &Item, container_archived: bool) -> Self {
        Self {
            kind: EntryKind::Item,
            id: item.id.clone(),
            name: item.description.clone(),
            location: String::new(),
            description: String::new(),
            tags: item.tags.clone(),
            container_id: item.container_id.clone(),
            archived: container_archived,
        }
    }

    /// Text fields matched against a query, empty ones skipped
    pub(crate) fn fields(&self) -> Vec<String> {
        let tags = self.tags.join(" ");
        [
            self.id.as_str(),
            self.name.as_str(),
            self.location.as_str(),
            self.description.as_str(),
            tags.as_str(),
        ]
        .into_iter()
        .filter(|field| !field.trim().is_empty())
        .map(str::to_string)
        .collect()
    }

    pub fn is_container(&self) -> bool {
        self.kind == EntryKind::Container
    }
}
