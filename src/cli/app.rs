//! Main CLI application structure

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use super::output::{Output, OutputFormat};
use super::{container, item, scan, search, status, transfer};
use crate::storage::{Config, ImportMode, Store};

#[derive(Parser)]
#[command(name = "binman")]
#[command(author, version, about = "Keep track of what is stored in which bin")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file (defaults to the config value, then the data directory)
    #[arg(long, global = true, env = "BINMAN_DB")]
    pub db: Option<PathBuf>,

    /// Config file (defaults to config.toml in the config directory)
    #[arg(long, global = true, env = "BINMAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format (defaults to the config value, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show database location and record counts
    Status,

    /// Manage containers (bins, boxes, shelves)
    #[command(subcommand)]
    Container(container::ContainerCommands),

    /// Manage items inside containers
    #[command(subcommand)]
    Item(item::ItemCommands),

    /// Fuzzy search containers and items
    ///
    /// Without a query, lists every container.
    Search {
        /// Search query
        query: Option<String>,

        /// Include archived containers and their items
        #[arg(long)]
        archived: bool,
    },

    /// Resolve a scanned label to its container
    Scan {
        /// Decoded text from the label
        text: String,
    },

    /// Export every container and item as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import containers and items from a JSON export
    Import {
        /// Export file to read
        file: PathBuf,

        /// replace-all, merge-keep-existing or merge-overwrite
        #[arg(long, default_value = "merge-keep-existing")]
        mode: ImportMode,

        /// Confirm a replace-all import
        #[arg(long)]
        yes: bool,
    },
}

/// Everything a command needs: output, configuration and the open store
pub struct Session {
    pub output: Output,
    pub config: Config,
    pub store: Store,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let format = cli.format.unwrap_or_else(|| config.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose("binman starting");

    let db_path = config.database_path(cli.db.as_deref())?;
    output.verbose_ctx("store", &format!("Opening database at: {}", db_path.display()));
    let store = Store::open(&db_path).context("Failed to open the bin database")?;

    let mut session = Session {
        output,
        config,
        store,
    };

    match cli.command {
        Commands::Status => status::show(&session)?,
        Commands::Container(cmd) => container::run(cmd, &mut session)?,
        Commands::Item(cmd) => item::run(cmd, &mut session)?,

        Commands::Search { query, archived } => {
            session.output.verbose_ctx(
                "search",
                &format!("Query: {:?}, include archived: {}", query, archived),
            );
            search::run(&session, query.as_deref().unwrap_or(""), archived)?
        }

        Commands::Scan { text } => scan::run(&session, &text)?,

        Commands::Export { output: path } => transfer::export(&session, path.as_deref())?,
        Commands::Import { file, mode, yes } => {
            transfer::import(&mut session, &file, mode, yes)?
        }
    }

    session.store.close().context("Failed to close the bin database")?;
    Ok(())
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the level
fn init_logging(verbose: bool) {
    let default = if verbose { "bin_manager=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
