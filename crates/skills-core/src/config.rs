//! Configuration for the catalog browser.
//!
//! Uses a `key=value` file format with `#` comments.
//! Precedence: CLI flags > `--config` file > `.skills/config` > user config dir > defaults.

use crate::debounce::DEFAULT_SEARCH_DEBOUNCE;
use crate::resolve::{Location, ResourceSources};
use crate::view::Links;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Project-local config file, relative to the working directory.
pub const PROJECT_CONFIG: &str = ".skills/config";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid config line: {0}")]
    InvalidLine(String),
    #[error("invalid integer value for {key}: {value}")]
    InvalidInt { key: String, value: String },
    #[error("unknown config key: {0}")]
    UnknownKey(String),
}

/// Browser configuration.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog candidates tried in order; paths or URLs.
    pub catalog_sources: Vec<String>,
    /// Flat per-skill layout: `<site_base>/<name>/<file>`.
    pub site_base: String,
    /// Repository root with the categorized layout under `skills/`.
    pub remote_base: String,
    /// Public host used in deploy instructions.
    pub public_base: String,
    /// Source browser root for the "View Source" link.
    pub source_base: String,
    /// Endpoint placeholder for the deploy command.
    pub deploy_endpoint: String,
    pub search_debounce_ms: u64,
    pub request_timeout_sec: u32,
    /// Command that reads clipboard text from stdin; autodetected when unset.
    pub clipboard_cmd: Option<String>,
}

const DEFAULT_REMOTE_BASE: &str = "https://raw.githubusercontent.com/expanso-io/expanso-skills/main";

impl Default for Config {
    fn default() -> Self {
        let links = Links::default();
        Self {
            catalog_sources: vec![
                "catalog.json".to_string(),
                "../catalog.json".to_string(),
                format!("{DEFAULT_REMOTE_BASE}/catalog.json"),
            ],
            site_base: "https://skills.expanso.io".to_string(),
            remote_base: DEFAULT_REMOTE_BASE.to_string(),
            public_base: links.public_base,
            source_base: links.source_base,
            deploy_endpoint: links.deploy_endpoint,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            request_timeout_sec: 10,
            clipboard_cmd: None,
        }
    }
}

impl Config {
    /// Load config from a file, merging with defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.load_file(path)?;
        Ok(config)
    }

    /// Picks the first config file that exists, or defaults.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn discover(explicit: Option<&Path>, workspace_root: &Path) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let mut candidates = vec![workspace_root.join(PROJECT_CONFIG)];
        if let Some(path) = Self::user_config_path() {
            candidates.push(path);
        }

        for candidate in candidates {
            if candidate.is_file() {
                debug!(path = %candidate.display(), "loading config");
                return Self::from_file(&candidate);
            }
        }

        Ok(Self::default())
    }

    /// Load and merge values from a config file.
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path)?;
        self.parse_content(&content)
    }

    /// Parse config content (key=value format).
    fn parse_content(&mut self, content: &str) -> Result<(), ConfigError> {
        for line in content.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::InvalidLine(line.to_string()));
            };

            let key = key.trim();
            let value = Self::unquote(value.trim());

            self.apply_value(key, &value)?;
        }
        Ok(())
    }

    /// Remove surrounding quotes from a value.
    fn unquote(value: &str) -> String {
        if value.len() >= 2
            && ((value.starts_with('"') && value.ends_with('"'))
                || (value.starts_with('\'') && value.ends_with('\'')))
        {
            return value[1..value.len() - 1].to_string();
        }
        value.to_string()
    }

    /// Apply a single config value.
    pub fn apply_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "catalog_sources" => {
                self.catalog_sources = value.split_whitespace().map(String::from).collect();
            }
            "site_base" => self.site_base = value.to_string(),
            "remote_base" => self.remote_base = value.to_string(),
            "public_base" => self.public_base = value.to_string(),
            "source_base" => self.source_base = value.to_string(),
            "deploy_endpoint" => self.deploy_endpoint = value.to_string(),
            "search_debounce_ms" => {
                self.search_debounce_ms = Self::parse_int(key, value)?;
            }
            "request_timeout_sec" => {
                self.request_timeout_sec = Self::parse_int(key, value)?;
            }
            "clipboard_cmd" => {
                self.clipboard_cmd = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    fn parse_int<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
        value.parse().map_err(|_| ConfigError::InvalidInt {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn catalog_locations(&self) -> Vec<Location> {
        self.catalog_sources
            .iter()
            .map(|s| Location::parse(s))
            .collect()
    }

    pub fn resource_sources(&self) -> ResourceSources {
        ResourceSources {
            site_base: Location::parse(&self.site_base),
            remote_base: Location::parse(&self.remote_base),
        }
    }

    pub fn links(&self) -> Links {
        Links {
            public_base: self.public_base.clone(),
            source_base: self.source_base.clone(),
            deploy_endpoint: self.deploy_endpoint.clone(),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout_sec))
    }

    /// Path of the user-level config file, if the platform has one.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("skillctl").join("config"))
    }
}
