//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `FORMDECK_*` environment overrides.

use crate::form::FormOptions;
use crate::table::TableOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub form: FormConfig,

    #[serde(default)]
    pub table: TableConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Storage key the records live under
    #[serde(default = "default_storage_key")]
    pub key: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Byte budget for everything under `data_dir`
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: usize,
}

fn default_storage_key() -> String {
    "formData".to_string()
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("formdeck").to_string_lossy().to_string())
        .unwrap_or_else(|| "./formdeck_data".to_string())
}

fn default_quota_bytes() -> usize {
    crate::storage::DEFAULT_QUOTA_BYTES
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_storage_key(),
            data_dir: default_data_dir(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

/// Form rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    #[serde(default = "default_control_class")]
    pub default_class: String,

    #[serde(default = "default_notice_duration")]
    pub notice_duration_ms: u64,
}

fn default_control_class() -> String {
    "form-control".to_string()
}

fn default_notice_duration() -> u64 {
    3000
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            default_class: default_control_class(),
            notice_duration_ms: default_notice_duration(),
        }
    }
}

/// Table rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    #[serde(default = "default_section_class")]
    pub section_class: String,

    #[serde(default = "default_max_cell_len")]
    pub max_cell_len: usize,

    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

fn default_section_class() -> String {
    "tableSection".to_string()
}

fn default_max_cell_len() -> usize {
    100
}

fn default_placeholder() -> String {
    "-".to_string()
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            section_class: default_section_class(),
            max_cell_len: default_max_cell_len(),
            placeholder: default_placeholder(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("formdeck").join("config.toml")),
            Some(PathBuf::from("./formdeck.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply `FORMDECK_*` overrides read through `lookup`
    ///
    /// Numeric values that do not parse are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("FORMDECK_STORAGE_KEY") {
            self.storage.key = key;
        }
        if let Some(data_dir) = lookup("FORMDECK_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(quota) = lookup("FORMDECK_QUOTA_BYTES") {
            match quota.parse() {
                Ok(q) => self.storage.quota_bytes = q,
                Err(_) => tracing::warn!("Ignoring FORMDECK_QUOTA_BYTES={:?}", quota),
            }
        }

        if let Some(class) = lookup("FORMDECK_DEFAULT_CLASS") {
            self.form.default_class = class;
        }
        if let Some(ms) = lookup("FORMDECK_NOTICE_MS") {
            match ms.parse() {
                Ok(v) => self.form.notice_duration_ms = v,
                Err(_) => tracing::warn!("Ignoring FORMDECK_NOTICE_MS={:?}", ms),
            }
        }

        if let Some(level) = lookup("FORMDECK_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("FORMDECK_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn form_options(&self) -> FormOptions {
        FormOptions {
            default_class: self.form.default_class.clone(),
            notice_duration_ms: self.form.notice_duration_ms,
            ..FormOptions::default()
        }
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            section_class: self.table.section_class.clone(),
            max_cell_len: self.table.max_cell_len,
            placeholder: self.table.placeholder.clone(),
        }
    }

    /// `data_dir` with a leading `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        match self.storage.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.storage.data_dir)),
            None => PathBuf::from(&self.storage.data_dir),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# formdeck configuration
#
# Environment variables override these settings:
# - FORMDECK_STORAGE_KEY
# - FORMDECK_DATA_DIR
# - FORMDECK_QUOTA_BYTES
# - FORMDECK_DEFAULT_CLASS
# - FORMDECK_NOTICE_MS
# - FORMDECK_LOG_LEVEL
# - FORMDECK_LOG_FORMAT

[storage]
# Key the record list is stored under
key = "formData"

# Directory holding one JSON file per key
data_dir = "~/.local/share/formdeck"

# Byte budget across all keys (5 MB, like browser localStorage)
quota_bytes = 5242880

[form]
# Class for controls that set none
default_class = "form-control"

# How long inline notices stay visible (ms)
notice_duration_ms = 3000

[table]
# Class of the element shown or hidden with the table
section_class = "tableSection"

# Longer cell text is truncated with "..."
max_cell_len = 100

# Text for empty cells
placeholder = "-"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/formdeck/formdeck.log"
"#
    .to_string()
}
