//! Configuration management for freewatch

pub mod schema;

pub use schema::{Config, SourceConfig};

use crate::error::{FreewatchError, FreewatchResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("freewatch")
            .join("config.toml")
    }

    /// Get the default state directory path
    pub fn default_state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("freewatch")
    }

    /// Get the persisted caches directory under a state directory
    pub fn caches_dir(state_dir: &Path) -> PathBuf {
        state_dir.join("caches")
    }

    /// Get the notification log path under a state directory
    pub fn notification_log_path(state_dir: &Path) -> PathBuf {
        state_dir.join("notifications.log")
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> FreewatchResult<Config> {
        let config = if self.config_path.exists() {
            self.load_from_file(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            Config::default()
        };

        config
            .validate()
            .map_err(|reason| FreewatchError::ConfigInvalid {
                path: self.config_path.clone(),
                reason,
            })?;

        Ok(config)
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> FreewatchResult<Config> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            FreewatchError::io(format!("reading config from {}", path.display()), e)
        })?;

        toml::from_str(&content).map_err(|e| FreewatchError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> FreewatchResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            FreewatchError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> FreewatchResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FreewatchError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Ensure the state directories exist
    pub async fn ensure_state_dirs(state_dir: &Path) -> FreewatchResult<()> {
        let caches = Self::caches_dir(state_dir);
        fs::create_dir_all(&caches).await.map_err(|e| {
            FreewatchError::io(format!("creating directory {}", caches.display()), e)
        })
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.cache.capacity, 250);
        assert_eq!(config.sources.len(), 2);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.cache.capacity = 42;
        config.sources = vec![SourceConfig::new("Fort Collins", "https://fortcollins.example/zip")];

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.cache.capacity, 42);
        assert_eq!(loaded.sources, config.sources);
    }

    #[tokio::test]
    async fn load_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[cache]\ncapacity = 0\n").await.unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, FreewatchError::ConfigInvalid { .. }));
    }

    #[tokio::test]
    async fn load_rejects_malformed_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[cache\n").await.unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(err.hint().is_some());
    }

    #[tokio::test]
    async fn ensure_state_dirs_creates_caches_dir() {
        let temp = TempDir::new().unwrap();
        ConfigManager::ensure_state_dirs(temp.path()).await.unwrap();
        assert!(ConfigManager::caches_dir(temp.path()).is_dir());
    }
}
