//! Configuration file handling.
//!
//! This module provides loading and saving of codesense configuration
//! from a TOML file.
//!
//! # Configuration Location
//!
//! The configuration file is stored at:
//! - Linux: `~/.config/codesense/config.toml`
//! - macOS: `~/Library/Application Support/codesense/config.toml`
//! - Windows: `%APPDATA%\codesense\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! baseline_level = "newly"
//! include = ["**/*.js", "**/*.css"]
//! exclude = ["**/node_modules/**", "**/vendor/**"]
//! remote_lookup = true
//! remote_timeout_secs = 5
//! cache_ttl_hours = 24
//! default_format = "table"
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scanner::{BaselineLevel, ScanOptions};

/// Application configuration.
///
/// # Example
///
/// ```no_run
/// use codesense::Config;
///
/// // Load from file (or use defaults if file doesn't exist)
/// let config = Config::load().unwrap();
///
/// println!("Threshold: {}", config.baseline_level);
/// println!("Remote lookup: {}", config.remote_lookup);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Reporting threshold for scans.
    ///
    /// Default: `newly` (widely available features are not reported)
    pub baseline_level: BaselineLevel,

    /// Include globs, matched against paths relative to the scan root.
    ///
    /// Default: every script, stylesheet, and markup extension
    pub include: Vec<String>,

    /// Exclude globs. Matching directories are not descended into.
    ///
    /// Default: dependency, build, and VCS directories
    pub exclude: Vec<String>,

    /// Whether to ask the remote feature-search service when the bundled
    /// data has no answer.
    ///
    /// Default: true
    pub remote_lookup: bool,

    /// Per-request timeout for remote lookups, in seconds.
    ///
    /// Default: 5
    pub remote_timeout_secs: u64,

    /// How long to cache remote answers, in hours.
    ///
    /// Default: 24 hours
    pub cache_ttl_hours: u64,

    /// Default output format when no `--format` flag is provided.
    ///
    /// Valid values: "table", "json"
    /// Default: "table"
    pub default_format: String,
}

impl Default for Config {
    fn default() -> Self {
        let options = ScanOptions::default();
        Self {
            baseline_level: BaselineLevel::Newly,
            include: options.include_patterns,
            exclude: options.exclude_patterns,
            remote_lookup: true,
            remote_timeout_secs: 5,
            cache_ttl_hours: 24,
            default_format: "table".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration from the default config file.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Loads configuration from `path`, falling back to defaults when the
    /// file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Saves the configuration to the default config file.
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
    /// use codesense::Config;
    ///
    /// let path = Config::config_path();
    /// assert!(path.ends_with("codesense/config.toml"));
    /// ```
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("codesense")
            .join("config.toml")
    }

    /// Generates a string containing the default configuration.
    pub fn generate_default_config() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }

    /// Scan options carrying this configuration's patterns and threshold.
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            include_patterns: self.include.clone(),
            exclude_patterns: self.exclude.clone(),
            baseline_level: Some(self.baseline_level),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.baseline_level, BaselineLevel::Newly);
        assert_eq!(config.cache_ttl_hours, 24);
        assert_eq!(config.remote_timeout_secs, 5);
        assert_eq!(config.default_format, "table");
        assert!(config.remote_lookup);
        assert!(config.exclude.contains(&"**/node_modules/**".to_string()));
        assert!(config.include.contains(&"**/*.tsx".to_string()));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "baseline_level = \"widely\"\nremote_lookup = false\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.baseline_level, BaselineLevel::Widely);
        assert!(!config.remote_lookup);
        assert_eq!(config.cache_ttl_hours, 24);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "baseline_level = \"sometimes\"").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.baseline_level = BaselineLevel::All;
        config.exclude.push("**/vendor/**".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_generated_default_parses() {
        let generated = Config::generate_default_config();
        assert!(generated.contains("baseline_level = \"newly\""));
        let parsed: Config = toml::from_str(&generated).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_scan_options_carry_threshold() {
        let options = Config::default().scan_options();
        assert_eq!(options.baseline_level, Some(BaselineLevel::Newly));
        assert_eq!(options.exclude_patterns, Config::default().exclude);
    }
}
