//! Query front end that keeps the index in step with the store

use nucleo::Matcher;
use tracing::debug;

use super::index::{SearchHit, SearchIndex};
use crate::storage::{Derived, Result, Store, StoreError};

/// Fuzzy search over a [`Store`]
///
/// The index is built lazily: a query first compares the store's change
/// counter with the version the index was built from and, if they differ,
/// rebuilds from a full scan before matching.
pub struct SearchEngine {
    index: Derived<SearchIndex>,
    matcher: Matcher,
    rebuilds: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    pub fn new() -> Self {
        Self {
            index: Derived::new(),
            matcher: Matcher::default(),
            rebuilds: 0,
        }
    }

    /// Queries the store, rebuilding the index first if it is stale
    pub fn query(&mut self, store: &Store, query: &str, include_archived: bool) -> Result<Vec<SearchHit>> {
        let rebuilds = &mut self.rebuilds;
        let index = self.index.get_or_rebuild_from(store, |store| {
            *rebuilds += 1;
            let index = build_index(store)?;
            debug!(
                version = store.version(),
                entries = index.len(),
                "rebuilt search index"
            );
            Ok::<_, StoreError>(index)
        })?;

        Ok(index.query(&mut self.matcher, query, include_archived))
    }

    /// Returns true if the next query will rebuild the index
    pub fn is_stale(&self, store: &Store) -> bool {
        self.index.is_stale(store.version())
    }

    /// Number of times the index has been built
    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}

fn build_index(store: &Store) -> Result<SearchIndex> {
    let (containers, items) = store.snapshot()?;
    Ok(SearchIndex::build(&containers, &items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Container, Item};

    #[test]
    fn picks_up_inserts_after_a_build() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(&Container::new("BIN-001").with_name("Tools")).unwrap();

        let mut engine = SearchEngine::new();
        assert!(engine.query(&store, "paint", false).unwrap().is_empty());
        assert_eq!(engine.rebuilds(), 1);

        store.put(&Container::new("BIN-002").with_name("Paint")).unwrap();
        assert!(engine.is_stale(&store));

        let hits = engine.query(&store, "paint", false).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.id, "BIN-002");
        assert_eq!(engine.rebuilds(), 2);
    }

    #[test]
    fn reuses_index_while_store_is_unchanged() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(&Container::new("BIN-001")).unwrap();

        let mut engine = SearchEngine::new();
        for query in ["", "bin", "tools", ""] {
            engine.query(&store, query, true).unwrap();
        }
        assert_eq!(engine.rebuilds(), 1);
        assert!(!engine.is_stale(&store));
    }

    #[test]
    fn rebuilds_for_a_reopened_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("binman.db");
        let mut engine = SearchEngine::new();

        let mut first = Store::open(&path).unwrap();
        first.put(&Container::new("BIN-001").with_name("Tools")).unwrap();
        assert!(engine.query(&first, "paint", true).unwrap().is_empty());
        first.close().unwrap();

        let mut second = Store::open(&path).unwrap();
        second.put(&Container::new("BIN-002").with_name("Paint")).unwrap();
        assert!(engine.is_stale(&second));

        let hits = engine.query(&second, "paint", true).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.id, "BIN-002");
    }

    #[test]
    fn deleted_records_drop_out() {
        let mut store = Store::open_in_memory().unwrap();
        store.put(&Container::new("BIN-001").with_name("Tools")).unwrap();
        store.put(&Item::new("BIN-001", "Hammer")).unwrap();

        let mut engine = SearchEngine::new();
        assert_eq!(engine.query(&store, "hammer", false).unwrap().len(), 1);

        store.delete_cascade("BIN-001").unwrap();
        assert!(engine.query(&store, "hammer", false).unwrap().is_empty());
        assert!(engine.query(&store, "", true).unwrap().is_empty());
    }
}
