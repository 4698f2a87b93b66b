//! Container domain model
//!
//! A container is a physical storage unit (bin, box, shelf) identified by a
//! user-assigned ID, usually printed on a scannable label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A physical storage unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Stable, case-sensitive identifier; immutable after creation
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub archived: bool,

    /// Unrecognised fields carried through import/export untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Container {
    /// Creates an empty, unarchived container
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            location: String::new(),
            description: None,
            created_at: Utc::now(),
            archived: false,
            extra: Map::new(),
        }
    }

    /// Builder-style name setter
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder-style location setter
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the description; blank text clears it
    pub fn set_description(&mut self, description: impl Into<String>) {
        let description = description.into();
        let trimmed = description.trim();
        self.description = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// Flips the archived flag, returning the new value
    pub fn toggle_archived(&mut self) -> bool {
        self.archived = !self.archived;
        self.archived
    }

    /// Returns a label suitable for one-line listings
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}
