//! Error types for the store

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Durable storage could not be opened; fatal at startup
    #[error("Storage unavailable at {path}: {reason}. Check that the location is writable and has free space, then try again.")]
    StorageUnavailable { path: PathBuf, reason: String },

    /// An import document was malformed; nothing was written
    #[error("Invalid import document: {0}")]
    Validation(String),

    /// An atomic batch failed and was rolled back
    #[error("{operation} was aborted and rolled back: {source}")]
    TransactionAbort {
        operation: &'static str,
        #[source]
        source: Box<StoreError>,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Returns true for errors that leave the store untouched
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            StoreError::Validation(_) | StoreError::TransactionAbort { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
