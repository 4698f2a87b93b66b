//! Cascading container deletion
//!
//! Removing a container also removes every item stored in it. The lookup of
//! those items and both deletes run in the same atomic batch, so an item
//! written between the lookup and the delete cannot slip through as an
//! orphan, and a failure leaves both container and items untouched.

use serde::Serialize;
use tracing::info;

use super::error::Result;
use super::store::Store;
use crate::domain::Container;

/// Outcome of a cascading delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeReport {
    pub container_id: String,

    /// False when the container did not exist (the call was a no-op for it)
    pub container_removed: bool,

    /// IDs of the items removed alongside the container
    pub removed_item_ids: Vec<String>,
}

impl CascadeReport {
    pub fn items_removed(&self) -> usize {
        self.removed_item_ids.len()
    }
}

impl Store {
    /// Deletes a container and all of its items as one atomic unit
    pub fn delete_cascade(&mut self, container_id: &str) -> Result<CascadeReport> {
        let report = self.atomic("delete_cascade", |batch| {
            let removed_item_ids = batch.item_ids_in(container_id)?;
            batch.delete_items_in(container_id)?;
            let container_removed = batch.delete::<Container>(container_id)?;

            Ok(CascadeReport {
                container_id: container_id.to_string(),
                container_removed,
                removed_item_ids,
            })
        })?;

        info!(
            container = container_id,
            removed = report.container_removed,
            items = report.items_removed(),
            "cascade delete"
        );

        Ok(report)
    }
}
