//! Application configuration

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current version of the config format
pub const CONFIG_VERSION: u32 = 1;

/// Application-wide configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the config format
    #[serde(default = "default_version")]
    pub version: u32,
    /// Directory holding the source definition files
    #[serde(default = "default_data_sources_storage")]
    pub data_sources_storage: PathBuf,
    /// Also search subdirectories of `data_sources_storage`
    #[serde(default)]
    pub recursive_search: bool,
}

impl AppConfig {
    /// Load configuration from disk
    ///
    /// A missing config file yields the defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = project_dirs()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.json"))
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a specific file path
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            data_sources_storage: default_data_sources_storage(),
            recursive_search: false,
        }
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "scrape-widget", "scrape-widget")
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_data_sources_storage() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join("data_sources"))
        .unwrap_or_else(|| PathBuf::from("data_sources"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig {
            version: CONFIG_VERSION,
            data_sources_storage: PathBuf::from("/srv/definitions"),
            recursive_search: true,
        };
        config.save_to_path(&path).unwrap();

        assert_eq!(AppConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "data_sources_storage": "defs" }"#).unwrap();

        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.version, CONFIG_VERSION);
        assert_eq!(config.data_sources_storage, PathBuf::from("defs"));
        assert!(!config.recursive_search);
    }

    #[test]
    fn test_unreadable_config_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let err = AppConfig::load_from_path(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
