//! TOML configuration for scanning, statistics and the default table.
//!
//! # Configuration File Format
//!
//! ```toml
//! [scan]
//! include_hidden = false
//! exclude = ["*.tmp", "Thumbs.db"]
//! exclude_regex = ["^~\\$"]
//!
//! [stats]
//! largest = 3
//!
//! # Optional. Replaces the built-in default table entirely.
//! [defaults]
//! "Texts" = [".txt", ".md"]
//! "Photos" = [".png", ".jpg"]
//! ```
//!
//! Exclusion patterns are matched against file names, not full paths.

use crate::defaults::DefaultMapping;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = ".dirsortrc.toml";

/// Errors that can occur while loading or compiling configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern.
    InvalidGlobPattern(String),
    /// Invalid regex pattern with the reason reported by the regex crate.
    InvalidRegexPattern { pattern: String, reason: String },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(f, "Invalid glob pattern '{}'", pattern)
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanSettings,
    pub stats: StatsSettings,
    /// Folder to extensions table replacing the built-in defaults.
    pub defaults: Option<BTreeMap<String, Vec<String>>>,
}

/// Which files the directory scan considers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Include files whose name starts with `.`. Off by default.
    pub include_hidden: bool,
    /// Glob patterns of file names to skip.
    pub exclude: Vec<String>,
    /// Regex patterns of file names to skip.
    pub exclude_regex: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSettings {
    /// How many of the largest files to report.
    pub largest: usize,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self { largest: 1 }
    }
}

impl Config {
    /// Load configuration, falling back to defaults.
    ///
    /// Looks in this order:
    /// 1. `config_path`, if given
    /// 2. `.dirsortrc.toml` in the current directory
    /// 3. `~/.config/dirsort/config.toml`
    /// 4. built-in defaults
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any file
    /// found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// The default table to resolve custom rules against.
    pub fn default_mapping(&self) -> DefaultMapping {
        match &self.defaults {
            Some(table) => DefaultMapping::from_folders(table),
            None => DefaultMapping::builtin(),
        }
    }

    /// Compile scan settings into matchers.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.scan)
    }
}

/// Pre-compiled scan filters.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    include_hidden: bool,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(settings: &ScanSettings) -> Result<Self, ConfigError> {
        let exclude_patterns = settings
            .exclude
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = settings
            .exclude_regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_hidden: settings.include_hidden,
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Check whether a file should be scanned.
    ///
    /// Hidden files are dropped first unless enabled, then glob and regex
    /// exclusions are applied to the file name.
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if !self.include_hidden && file_name.starts_with('.') {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            include_hidden: false,
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
        }
    }
}
