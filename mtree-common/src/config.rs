//! Configuration loading and data folder resolution
//!
//! Data folder priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `MTREE_DATA_DIR`
//! 3. TOML config file key `data_dir`
//! 4. Compiled default `./data`
//!
//! A missing or unreadable TOML file never stops a run: defaults are used and
//! a warning is logged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{Error, Result};

/// Environment variable overriding the data folder
pub const DATA_DIR_ENV: &str = "MTREE_DATA_DIR";

/// Environment variable overriding the config file location
pub const CONFIG_FILE_ENV: &str = "MTREE_CONFIG";

/// Compiled default data folder (relative to the working directory)
pub const DEFAULT_DATA_DIR: &str = "data";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Data folder holding `curated/`, `scraped/` and the build outputs
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Scraped document path, overriding `<data_dir>/scraped/huggingface.json`
    #[serde(default)]
    pub scraped_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Config file location: `$MTREE_CONFIG`, else `<config dir>/mtree/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|d| d.join("mtree").join("config.toml"))
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Cannot read {}: {}", path.display(), e)))?;
    Ok(toml::from_str(&content)?)
}

/// Load the config file if there is one, falling back to defaults
pub fn load_toml_config_or_default() -> TomlConfig {
    let Some(path) = config_file_path() else {
        return TomlConfig::default();
    };
    if !path.exists() {
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring config file {}: {}", path.display(), e);
            TomlConfig::default()
        }
    }
}

/// Resolve the data folder following the priority order above
pub fn resolve_data_dir(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(DATA_DIR_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    // Priority 3: TOML config file
    if let Some(path) = &toml_config.data_dir {
        return path.clone();
    }

    // Priority 4: Compiled default
    PathBuf::from(DEFAULT_DATA_DIR)
}

/// File layout below the data folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub root: PathBuf,
    /// Directory of curated `*.json` documents
    pub curated_dir: PathBuf,
    /// Scraped catalog document
    pub scraped_file: PathBuf,
    /// Where `models.json`, `relationships.json`, `tree.json`, `stats.json` go
    pub output_dir: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            curated_dir: root.join("curated"),
            scraped_file: root.join("scraped").join("huggingface.json"),
            output_dir: root.clone(),
            root,
        }
    }

    /// Resolve the data folder and apply TOML overrides
    pub fn resolve(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> Self {
        let mut layout = Self::new(resolve_data_dir(cli_arg, toml_config));
        if let Some(scraped) = &toml_config.scraped_file {
            layout.scraped_file = scraped.clone();
        }
        layout
    }
}
