//! Item domain model
//!
//! Items are the tracked objects stored inside a container. Each item
//! belongs to exactly one container, referenced by the container's ID.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// A tracked object inside a container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// System-generated unique identifier
    pub id: String,

    /// ID of the owning container
    pub container_id: String,

    #[serde(default)]
    pub description: String,

    /// Normalized (trimmed, lowercase, unique) tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Encoded image, usually a `data:image/...;base64,...` URL
    #[serde(default)]
    pub photo: Option<String>,

    #[serde(default = "Utc::now")]
    pub added_at: DateTime<Utc>,

    /// Unrecognised fields carried through import/export untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Item {
    /// Creates a new item in `container_id` with a fresh ID
    pub fn new(container_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            container_id: container_id.into(),
            description: description.into(),
            tags: Vec::new(),
            photo: None,
            added_at: Utc::now(),
            extra: Map::new(),
        }
    }

    /// Replaces the tags, normalizing them
    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags = normalize_tags(tags);
    }

    /// Builder-style tag setter
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.set_tags(tags);
        self
    }

    /// Returns true if the photo looks like an inline image
    pub fn has_inline_photo(&self) -> bool {
        self.photo
            .as_deref()
            .is_some_and(|p| p.starts_with("data:image/"))
    }
}

/// Trims, lowercases and deduplicates tags, keeping first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Parses comma-separated tag input (`"Cables, usb ,USB"` → `["cables", "usb"]`)
pub fn parse_tag_list(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

#[derive(Debug, Error, PartialEq)]
#[error("Unknown sort order '{0}' (expected newest, oldest, az or za)")]
pub struct SortParseError(String);

/// Display order for the items of one container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    #[default]
    Newest,
    Oldest,
    Az,
    Za,
}

impl ItemSort {
    /// Sorts items in place
    pub fn apply(self, items: &mut [Item]) {
        match self {
            ItemSort::Newest => items.sort_by(|a, b| b.added_at.cmp(&a.added_at)),
            ItemSort::Oldest => items.sort_by(|a, b| a.added_at.cmp(&b.added_at)),
            ItemSort::Az => items.sort_by(|a, b| {
                a.description.to_lowercase().cmp(&b.description.to_lowercase())
            }),
            ItemSort::Za => items.sort_by(|a, b| {
                b.description.to_lowercase().cmp(&a.description.to_lowercase())
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemSort::Newest => "newest",
            ItemSort::Oldest => "oldest",
            ItemSort::Az => "az",
            ItemSort::Za => "za",
        }
    }
}

impl fmt::Display for ItemSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemSort {
    type Err = SortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" => Ok(ItemSort::Newest),
            "oldest" => Ok(ItemSort::Oldest),
            "az" | "a-z" => Ok(ItemSort::Az),
            "za" | "z-a" => Ok(ItemSort::Za),
            other => Err(SortParseError(other.to_string())),
        }
    }
}
