//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Core | Overview | `status` |
//! | Container | Bin lifecycle | `container add`, `container generate`, `container archive` |
//! | Item | What is in a bin | `item add`, `item edit`, `item delete` |
//! | Lookup | Finding things | `search`, `scan` |
//! | Transfer | Backup and restore | `export`, `import --mode merge-overwrite` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output and library logs:
//! ```bash
//! binman --verbose search hammer
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod container;
mod item;
mod output;
mod scan;
mod search;
mod status;
mod transfer;

pub use app::{run, Cli, Commands, Session};
pub use output::{Output, OutputFormat};
