//! Configuration Management
//!
//! Handles persistent configuration storage for evline.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8085";

pub const ENDPOINT_ENV: &str = "EVENTLINE_ENDPOINT";
pub const API_KEY_ENV: &str = "EVENTLINE_API_KEY";

/// API connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            key: None,
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("evline").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Ignoring configuration file {:?}: {:#}", path, err);
                Self::default()
            }
        }
    }

    /// Load configuration from a given file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Apply overrides from environment variables
    pub fn with_env(self) -> Self {
        self.with_overrides(
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(API_KEY_ENV).ok(),
        )
    }

    /// Apply explicit overrides (CLI > env > file)
    pub fn with_overrides(mut self, endpoint: Option<String>, key: Option<String>) -> Self {
        if let Some(endpoint) = endpoint.filter(|e| !e.is_empty()) {
            self.api.endpoint = endpoint;
        }
        if let Some(key) = key.filter(|k| !k.is_empty()) {
            self.api.key = Some(key);
        }
        self
    }
}
