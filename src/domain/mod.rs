//! Domain models for binman
//!
//! Contains the record types and pure rules (ID sequencing, tag
//! normalization, item ordering) without any I/O concerns.

pub mod id;
mod container;
mod item;

pub use container::Container;
pub use id::IdError;
pub use item::{normalize_tags, parse_tag_list, Item, ItemSort, SortParseError};
