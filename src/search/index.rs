//! In-memory fuzzy index over containers and items

use std::collections::HashMap;

use nucleo::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo::{Matcher, Utf32Str};
use serde::Serialize;

use super::entry::SearchEntry;
use crate::domain::{Container, Item};

/// Minimum relevance for an entry to qualify
///
/// Relevance is the better of the matcher score relative to the query's
/// score against itself, and the edit-distance similarity between the
/// query and the closest word of a field.
pub const MIN_RELEVANCE: f64 = 0.65;

/// One qualifying entry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    #[serde(flatten)]
    pub entry: SearchEntry,

    /// Raw matcher score of the best field, 0 for typo-only matches
    pub score: u32,

    /// How closely the best field matches, in `0.0..=1.0`
    pub relevance: f64,
}

/// Snapshot of every container and item, ready to be queried
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<SearchEntry>,
}

impl SearchIndex {
    /// Builds the index; containers first, each kind in the order given
    pub fn build(containers: &[Container], items: &[Item]) -> Self {
        let archived: HashMap<&str, bool> = containers
            .iter()
            .map(|c| (c.id.as_str(), c.archived))
            .collect();

        let mut entries = Vec::with_capacity(containers.len() + items.len());
        entries.extend(containers.iter().map(SearchEntry::from_container));
        entries.extend(items.iter().map(|item| {
            let container_archived = archived
                .get(item.container_id.as_str())
                .copied()
                .unwrap_or(false);
            SearchEntry::from_item(item, container_archived)
        }));

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Runs a query
    ///
    /// A blank query lists containers in index order. Otherwise entries are
    /// ranked by their best field relevance, highest first with ties kept in
    /// index order, and archived entries are dropped unless
    /// `include_archived` is set.
    pub fn query(&self, matcher: &mut Matcher, query: &str, include_archived: bool) -> Vec<SearchHit> {
        let query = query.trim();
        let visible = |entry: &SearchEntry| include_archived || !entry.archived;

        if query.is_empty() {
            return self
                .entries
                .iter()
                .filter(|entry| entry.is_container() && visible(entry))
                .map(|entry| SearchHit {
                    entry: entry.clone(),
                    score: 0,
                    relevance: 1.0,
                })
                .collect();
        }

        let pattern = Pattern::new(query, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy);
        let mut buf = Vec::new();
        let lowered = query.to_lowercase();

        let self_score = pattern
            .score(Utf32Str::new(query, &mut buf), matcher)
            .unwrap_or(0)
            .max(1);

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let mut best: Option<(u32, f64)> = None;

                for field in entry.fields() {
                    let score = pattern
                        .score(Utf32Str::new(&field, &mut buf), matcher)
                        .unwrap_or(0);
                    let fuzzy = (f64::from(score) / f64::from(self_score)).min(1.0);
                    let relevance = fuzzy.max(typo_similarity(&lowered, &field));

                    if best.map_or(true, |(s, r)| (relevance, score) > (r, s)) {
                        best = Some((score, relevance));
                    }
                }

                let (score, relevance) = best?;
                (relevance >= MIN_RELEVANCE).then(|| SearchHit {
                    entry: entry.clone(),
                    score,
                    relevance,
                })
            })
            .collect();

        // sort_by is stable, so equal relevance keeps index order
        hits.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then(b.score.cmp(&a.score))
        });
        hits.retain(|hit| visible(&hit.entry));
        hits
    }
}

/// Edit-distance similarity between `query` and the closest part of `field`
///
/// `query` must already be lowercase. The field is compared whole and word
/// by word, so a typo in one word of a longer name still counts.
fn typo_similarity(query: &str, field: &str) -> f64 {
    let field = field.to_lowercase();
    let words = field
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty());

    std::iter::once(field.as_str())
        .chain(words)
        .map(|part| strsim::normalized_damerau_levenshtein(query, part))
        .fold(0.0, f64::max)
}
