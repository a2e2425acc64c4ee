//! Configuration service implementation.
//!
//! Loads the service configuration from `config.toml`, writing the defaults
//! on first use, then applies environment overrides.

use crate::dto::create_service_config_migrator;
use std::path::PathBuf;
use version_migrate::{FileStorage, FileStorageStrategy, FormatStrategy, LoadBehavior};
use wandalf_core::config::ServiceConfig;
use wandalf_core::error::{Result, WandalfError};

const ENTITY: &str = "service_config";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn storage(&self) -> Result<FileStorage> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let strategy = FileStorageStrategy::new()
            .with_format(FormatStrategy::Toml)
            .with_load_behavior(LoadBehavior::CreateIfMissing);

        FileStorage::new(self.path.clone(), create_service_config_migrator(), strategy)
            .map_err(|e| WandalfError::config(format!("Failed to open config storage: {}", e)))
    }

    /// Reads the stored configuration, without environment overrides.
    pub fn load_stored(&self) -> Result<ServiceConfig> {
        let mut storage = self.storage()?;

        let configs: Vec<ServiceConfig> = storage
            .query(ENTITY)
            .map_err(|e| WandalfError::config(format!("Failed to query {}: {}", ENTITY, e)))?;

        match configs.into_iter().next() {
            Some(config) => Ok(config),
            None => {
                let default_config = ServiceConfig::default();
                storage
                    .update_and_save(ENTITY, vec![default_config.clone()])
                    .map_err(|e| {
                        WandalfError::config(format!("Failed to save default config: {}", e))
                    })?;
                tracing::info!(path = %self.path.display(), "Wrote default configuration");
                Ok(default_config)
            }
        }
    }

    /// Reads the configuration and applies `WANDALF_*` environment overrides.
    ///
    /// An unreadable file falls back to the defaults.
    pub fn load(&self) -> ServiceConfig {
        let stored = self.load_stored().unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), "Using default configuration: {}", e);
            ServiceConfig::default()
        });
        stored.with_env_overrides()
    }

    pub fn save(&self, config: &ServiceConfig) -> Result<()> {
        let mut storage = self.storage()?;
        storage
            .update_and_save(ENTITY, vec![config.clone()])
            .map_err(|e| WandalfError::config(format!("Failed to save config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_load_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let service = ConfigService::new(&path);

        let config = service.load_stored().unwrap();

        assert_eq!(config, ServiceConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_saved_config_round_trips() {
        let dir = TempDir::new().unwrap();
        let service = ConfigService::new(dir.path().join("config.toml"));
        let config = ServiceConfig {
            api_base: "http://localhost:8787".into(),
            public_root: Some("http://localhost:8787/public".into()),
            request_timeout_secs: 30,
        };

        service.save(&config).unwrap();

        assert_eq!(service.load_stored().unwrap(), config);
    }
}
