//! Application configuration.
//!
//! Stored as TOML with three optional sections (`[defaults]`, `[render]`,
//! `[yahoo]`). Missing keys fall back to their defaults, so an empty file is
//! a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::Interval;
use crate::table::ColumnSet;

const CONFIG_DIR: &str = "ohlcview";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub defaults: DefaultsConfig,
    pub render: RenderConfig,
    pub yahoo: YahooConfig,
}

/// Initial form values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub ticker: String,
    pub interval: Interval,
    /// `plain`, `derived`, or a comma-separated column list.
    pub columns: String,
    /// Start date offset from the end date when no start is given.
    pub lookback_days: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            ticker: "AAPL".to_string(),
            interval: Interval::default(),
            columns: "derived".to_string(),
            lookback_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
    pub precision: usize,
    pub max_col_width: usize,
    pub width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_rows: None,
            precision: 4,
            max_col_width: 20,
            width: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YahooConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Request timeout; `None` keeps the HTTP client's default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query2.finance.yahoo.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0 Safari/537.36"
                .to_string(),
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective configuration.
    ///
    /// An explicit path must exist. Without one, the per-user config file is
    /// read if present; otherwise the built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/ohlcview/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// The configured default column set.
    pub fn column_set(&self) -> Result<ColumnSet, ConfigError> {
        self.defaults
            .columns
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("defaults.columns: {e}")))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.defaults.ticker.trim().is_empty() {
            return Err(ConfigError::Invalid("defaults.ticker is empty".to_string()));
        }
        self.column_set()?;
        if self.yahoo.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("yahoo.base_url is empty".to_string()));
        }
        if self.yahoo.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "yahoo.timeout_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
