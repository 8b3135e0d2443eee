//! Configuration file handling.
//!
//! This module provides loading and saving of govulndb configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/govulndb/config.toml`
//! - macOS: `~/Library/Application Support/govulndb/config.toml`
//! - Windows: `%APPDATA%\govulndb\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! source = "https://vuln.go.dev"
//! by_package_concurrency = 10
//! entries_concurrency = 4
//! request_timeout_secs = 30
//! default_format = "table"
//!
//! [ignore]
//! vulnerabilities = ["GO-2022-0969"]
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{
    ClientConfig, DEFAULT_BY_PACKAGE_CONCURRENCY, DEFAULT_ENTRIES_CONCURRENCY,
    DEFAULT_REQUEST_TIMEOUT,
};

/// The public Go vulnerability database.
pub const DEFAULT_SOURCE: &str = "https://vuln.go.dev";

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use govulndb::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Database: {}", config.source);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the database is read from: an `http(s)://` URL, a `file://`
    /// URL or a directory.
    ///
    /// Default: `https://vuln.go.dev`
    pub source: String,

    /// Records fetched at once when looking up a module.
    ///
    /// Default: 10
    pub by_package_concurrency: usize,

    /// Records fetched at once when listing the whole database.
    ///
    /// Default: 4
    pub entries_concurrency: usize,

    /// Timeout for a single HTTP request, in seconds. Zero is treated as 1.
    ///
    /// Default: 30
    pub request_timeout_secs: u64,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,

    /// Ignore list configuration for suppressing known issues.
    pub ignore: IgnoreConfig,
}

/// Vulnerabilities left out of lookup results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    /// Vulnerability IDs or aliases (e.g. "GO-2022-0969", "CVE-2022-27664").
    pub vulnerabilities: Vec<String>,
}

impl IgnoreConfig {
    /// Check if a vulnerability should be ignored, by ID or by alias.
    pub fn should_ignore(&self, id: &str, aliases: &[String]) -> bool {
        self.vulnerabilities
            .iter()
            .any(|ignored| ignored == id || aliases.contains(ignored))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            by_package_concurrency: DEFAULT_BY_PACKAGE_CONCURRENCY,
            entries_concurrency: DEFAULT_ENTRIES_CONCURRENCY,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            default_format: "table".to_string(),
            ignore: IgnoreConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from the config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Saves the configuration to the config file.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Returns the path to the configuration file.
    ///
    /// # Example
    ///
    /// ```
    /// use govulndb::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("govulndb/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("govulndb")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Returns the client tuning described by this configuration.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            by_package_concurrency: self.by_package_concurrency.max(1),
            entries_concurrency: self.entries_concurrency.max(1),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
        }
    }
}
