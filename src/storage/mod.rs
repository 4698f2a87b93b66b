//! # Storage Layer
//!
//! Persistence for containers and items in a single SQLite file.
//!
//! ## Storage Format
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Containers | `containers` table | `binman.db` |
//! | Items | `items` table, indexed by `container_id` | `binman.db` |
//! | Config | TOML | `config.toml` in the platform config dir |
//! | Export | JSON document | anywhere (`binman export`) |
//!
//! ## Consistency
//!
//! - Single-record writes are one statement each
//! - [`Store::put_many`], [`Store::delete_cascade`] and [`Store::import`]
//!   run as one `IMMEDIATE` transaction through [`Store::atomic`]
//! - Every committed mutation bumps [`Store::version`]; derived views
//!   ([`Derived`]) compare against it to decide when to rebuild
//!
//! ## Key Types
//!
//! - [`Store`] - Open/close lifecycle and the generic CRUD surface
//! - [`Record`] - Row mapping implemented by each persisted kind
//! - [`CascadeReport`] - Outcome of deleting a container with its items
//! - [`ImportDocument`] / [`ExportDocument`] - Bulk transfer formats
//! - [`Config`] - User configuration

mod cascade;
mod config;
mod error;
mod record;
mod store;
mod transfer;
mod version;

pub use cascade::CascadeReport;
pub use config::{Config, ConfigError, IdConfig, OutputFormat, DATABASE_FILE};
pub use error::{Result, StoreError};
pub use record::{Record, RecordKind};
pub use store::{Batch, Counts, Store};
pub use transfer::{ExportDocument, ImportDocument, ImportMode, ImportReport, ModeParseError};
pub use version::{Derived, Versioned};
