//! # Engine Config Repository
//!
//! Keeps the engine configuration in `engine_config.yaml` at the root of the
//! data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! habit_window_days: 14
//! goal_window_days: 14
//! trend_window_days: 7
//! data_format_version: "1.0"
//! ```
//!
//! A missing file is created with the defaults on first read. Missing keys
//! take their default values.

use anyhow::Result;
use log::{debug, info};
use std::fs;
use std::path::PathBuf;

use super::connection::CsvConnection;
use crate::domain::models::EngineConfig;
use crate::storage::traits::EngineConfigStorage;

const ENGINE_CONFIG_FILE: &str = "engine_config.yaml";

#[derive(Clone)]
pub struct EngineConfigRepository {
    connection: CsvConnection,
}

impl EngineConfigRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn config_path(&self) -> PathBuf {
        self.connection.file_path(ENGINE_CONFIG_FILE)
    }

    /// Load the config from file, creating the default one if it doesn't exist
    fn load_or_create(&self) -> Result<EngineConfig> {
        let config_path = self.config_path();

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)?;
            let config: EngineConfig = serde_yaml::from_str(&yaml_content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", config_path.display(), e))?;
            config.validate()?;
            debug!("Loaded engine config from {:?}", config_path);
            Ok(config)
        } else {
            let config = EngineConfig::default();
            self.save(&config)?;
            info!("Created default engine config at {:?}", config_path);
            Ok(config)
        }
    }

    fn save(&self, config: &EngineConfig) -> Result<()> {
        let yaml_content = serde_yaml::to_string(config)?;
        self.connection.write_atomic(ENGINE_CONFIG_FILE, yaml_content.as_bytes())
    }
}

impl EngineConfigStorage for EngineConfigRepository {
    fn get_engine_config(&self) -> Result<EngineConfig> {
        self.load_or_create()
    }

    fn update_engine_config(&self, config: &EngineConfig) -> Result<()> {
        config.validate()?;
        self.save(config)?;
        info!(
            "Updated engine config: habit window {}d, goal window {}d, trend window {}d",
            config.habit_window_days, config.goal_window_days, config.trend_window_days
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_repo() -> (EngineConfigRepository, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
        (EngineConfigRepository::new(connection), temp_dir)
    }

    #[test]
    fn test_get_engine_config_creates_default() {
        let (repo, temp_dir) = setup_test_repo();

        let config = repo.get_engine_config().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(temp_dir.path().join(ENGINE_CONFIG_FILE).exists());
    }

    #[test]
    fn test_update_persists_and_validates() {
        let (repo, _temp_dir) = setup_test_repo();

        let config = EngineConfig {
            goal_window_days: 30,
            ..EngineConfig::default()
        };
        repo.update_engine_config(&config).unwrap();
        assert_eq!(repo.get_engine_config().unwrap().goal_window_days, 30);

        let invalid = EngineConfig {
            habit_window_days: 0,
            ..EngineConfig::default()
        };
        assert!(repo.update_engine_config(&invalid).is_err());
        assert_eq!(repo.get_engine_config().unwrap().habit_window_days, 14);
    }

    #[test]
    fn test_partial_file_takes_defaults() {
        let (repo, temp_dir) = setup_test_repo();
        fs::write(temp_dir.path().join(ENGINE_CONFIG_FILE), "trend_window_days: 3\n").unwrap();

        let config = repo.get_engine_config().unwrap();
        assert_eq!(config.trend_window_days, 3);
        assert_eq!(config.habit_window_days, 14);
    }
}
