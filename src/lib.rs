//! binman - Keep track of what is stored in which bin
//!
//! Containers (bins, boxes, shelves) hold items. Both live in a local SQLite
//! store with atomic cascade deletes and bulk import/export, and a fuzzy
//! search index is kept in step with the store through a change counter.

pub mod domain;
pub mod storage;
pub mod search;
pub mod cli;

pub use domain::{Container, Item, ItemSort};
pub use search::{SearchEngine, SearchHit};
pub use storage::{Store, StoreError};
