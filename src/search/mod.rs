//! Fuzzy search over containers and items
//!
//! [`SearchIndex`] is a flat list of [`SearchEntry`] values built from a
//! store snapshot and matched with `nucleo`. [`SearchEngine`] owns the index
//! as a versioned derived view so it is rebuilt only when a query arrives
//! after the store changed.

mod engine;
mod entry;
mod index;

pub use engine::SearchEngine;
pub use entry::{EntryKind, SearchEntry};
pub use index::{SearchHit, SearchIndex, MIN_RELEVANCE};
