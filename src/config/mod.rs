//! Configuration management for deskgrid.
//!
//! This module handles loading, saving, and validating the user configuration:
//! application settings, the backend server, and the listing tables.

mod settings;
mod table;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub use settings::Settings;
pub use table::{
    ActionConfig, AlternateLabel, ColumnConfig, ColumnKind, FieldCondition, FilterConfig,
    TableConfig,
};

/// Themes accepted by `settings.theme`.
pub const THEMES: &[&str] = &["dark", "light"];

/// Errors that can occur while handling configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// Failed to create the configuration directory.
    #[error("failed to create configuration directory: {0}")]
    CreateDirError(std::io::Error),

    /// Failed to read the configuration file.
    #[error("failed to read configuration file: {0}")]
    ReadError(std::io::Error),

    /// Failed to write the configuration file.
    #[error("failed to write configuration file: {0}")]
    WriteError(std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize the configuration.
    #[error("failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// The configuration is well-formed but invalid.
    #[error("invalid configuration: {0}")]
    ValidationError(String),

    /// No table with the requested name.
    #[error("table '{0}' not found")]
    TableNotFound(String),

    /// Refused to overwrite an existing file.
    #[error("configuration file already exists: {0}")]
    AlreadyExists(PathBuf),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Base URL every endpoint is relative to.
    pub base_url: String,
    /// Environment variable holding the bearer token.
    #[serde(default)]
    pub token_env: Option<String>,
}

impl ServerConfig {
    /// Read the bearer token from the configured environment variable.
    ///
    /// Missing or empty variables yield `None`.
    pub fn token(&self) -> Option<String> {
        let name = self.token_env.as_deref()?;
        std::env::var(name).ok().filter(|token| !token.trim().is_empty())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            token_env: Some("DESKGRID_TOKEN".to_string()),
        }
    }
}

/// The complete configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl Config {
    /// The default configuration file path.
    ///
    /// `~/.config/deskgrid/config.toml` on Linux.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("deskgrid").join("config.toml"))
    }

    /// Load and validate the configuration at `path`, or at the default path.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => Self::load_from(&Self::default_path()?),
        }
    }

    /// Load and validate the configuration file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config = Self::parse(&contents)?;
        info!(tables = config.tables.len(), "Configuration loaded");
        Ok(config)
    }

    /// Parse and validate configuration text.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(ConfigError::CreateDirError)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(ConfigError::WriteError)?;
        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Write the sample configuration to `path` unless a file exists there.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        Self::sample().save_to(path)
    }

    /// Validate settings, server and every table.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if !THEMES.contains(&self.settings.theme.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "unknown theme '{}', expected one of: {}",
                self.settings.theme,
                THEMES.join(", ")
            )));
        }

        if self.settings.items_per_page == 0 {
            return Err(ConfigError::ValidationError(
                "settings.items_per_page must be greater than zero".to_string(),
            ));
        }

        if crate::table::TotalItemsMode::from_name(&self.settings.total_items).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "settings.total_items must be 'page' or 'server', got '{}'",
                self.settings.total_items
            )));
        }

        let url = &self.server.base_url;
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ConfigError::ValidationError(
                "server.base_url must start with http:// or https://".to_string(),
            ));
        }

        let mut names = HashSet::new();
        for table in &self.tables {
            table.validate()?;
            if !names.insert(table.name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate table name '{}'",
                    table.name
                )));
            }
        }

        if let Some(name) = &self.settings.default_table {
            if !names.contains(name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "default table '{}' is not defined",
                    name
                )));
            }
        }

        Ok(())
    }

    /// Find a table by name.
    pub fn table(&self, name: &str) -> Result<&TableConfig> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ConfigError::TableNotFound(name.to_string()))
    }

    /// Resolve the table to open: `name`, else the default, else the first.
    pub fn select_table(&self, name: Option<&str>) -> Result<&TableConfig> {
        match name.or(self.settings.default_table.as_deref()) {
            Some(name) => self.table(name),
            None => self.tables.first().ok_or_else(|| {
                ConfigError::ValidationError("no tables are configured".to_string())
            }),
        }
    }

    /// A working example with the admin vendor and client booking listings.
    pub fn sample() -> Self {
        toml::from_str(include_str!("sample.toml")).unwrap_or_default()
    }
}
