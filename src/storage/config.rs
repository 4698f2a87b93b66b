//! Configuration handling for binman
//!
//! Configuration lives in `config.toml` under the platform config directory
//! (e.g. `~/.config/binman/config.toml`) unless a path is given explicitly.
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::id::{DEFAULT_PREFIX, DEFAULT_WIDTH};
use crate::domain::ItemSort;

/// File name of the store inside the data directory
pub const DATABASE_FILE: &str = "binman.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Container ID generation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdConfig {
    /// Prefix for generated IDs (`BIN` gives `BIN-001`)
    pub prefix: String,

    /// Minimum digits, zero padded
    pub width: usize,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            width: DEFAULT_WIDTH,
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Database file; defaults to the platform data directory
    pub database: Option<PathBuf>,

    /// Default output format (text or json)
    pub default_format: OutputFormat,

    /// Order of items when showing a container
    pub item_sort: ItemSort,

    /// Include archived containers in listings and search by default
    pub show_archived: bool,

    /// Container ID generation
    pub ids: IdConfig,
}

impl Config {
    /// Loads configuration from `path`, or from the default location
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Loads and validates a specific config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to load config: {}", path.display()))
    }

    /// Parses and validates TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), ConfigError> {
        let prefix = self.ids.prefix.trim();
        if prefix.is_empty() {
            return Err(ConfigError::Invalid("ids.prefix cannot be empty".to_string()));
        }
        if prefix.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "ids.prefix '{}' cannot contain whitespace",
                prefix
            )));
        }
        if self.ids.width == 0 || self.ids.width > 12 {
            return Err(ConfigError::Invalid(format!(
                "ids.width must be between 1 and 12, got {}",
                self.ids.width
            )));
        }
        Ok(())
    }

    fn dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "binman", "binman")
    }

    /// Returns the default config file location
    pub fn default_path() -> Option<PathBuf> {
        Self::dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolves the database file: explicit override, then config, then
    /// the platform data directory
    pub fn database_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.database {
            return Ok(path.clone());
        }

        Self::dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory. Pass --db PATH."))
    }
}
