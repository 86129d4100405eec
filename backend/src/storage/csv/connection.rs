use anyhow::Result;
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use super::{
    ActivityRepository, EngineConfigRepository, GoalRepository, LogRepository, SnapshotRepository,
    VacationRepository,
};
use crate::storage::traits::Connection;

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "HABIT_ENGINE_DATA_DIR";

/// CsvConnection manages the data directory and serializes writes to it
#[derive(Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl CsvConnection {
    /// Create a new connection over `base_directory`, creating it if needed
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Create a connection in the default data directory: `$HABIT_ENGINE_DATA_DIR`
    /// if set, otherwise `~/Documents/Habit Engine`
    pub fn new_default() -> Result<Self> {
        Self::new(Self::default_data_directory()?)
    }

    pub fn default_data_directory() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            if !dir.trim().is_empty() {
                info!("Using data directory from {}: {}", DATA_DIR_ENV, dir);
                return Ok(PathBuf::from(dir.trim()));
            }
            warn!("{} is set but empty, using default", DATA_DIR_ENV);
        }

        let documents_dir = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

        Ok(documents_dir.join("Habit Engine"))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.base_directory.join(file_name)
    }

    /// Hold this guard across a read-modify-write cycle
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Read a YAML list, treating a missing file as empty
    pub fn read_yaml_list<T: DeserializeOwned>(&self, file_name: &str) -> Result<Vec<T>> {
        let path = self.file_path(file_name);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<T> = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        debug!("Loaded {} entries from {:?}", items.len(), path);
        Ok(items)
    }

    /// Write a YAML list atomically
    pub fn write_yaml_list<T: Serialize>(&self, file_name: &str, items: &[T]) -> Result<()> {
        let content = serde_yaml::to_string(items)?;
        self.write_atomic(file_name, content.as_bytes())
    }

    /// Write `content` to a temp file and rename it over `file_name`
    pub fn write_atomic(&self, file_name: &str, content: &[u8]) -> Result<()> {
        let path = self.file_path(file_name);
        let temp_path = path.with_extension("tmp");

        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &path)?;

        debug!("Wrote {} bytes to {:?}", content.len(), path);
        Ok(())
    }
}

impl Connection for CsvConnection {
    type ActivityRepository = ActivityRepository;
    type SnapshotRepository = SnapshotRepository;
    type LogRepository = LogRepository;
    type VacationRepository = VacationRepository;
    type GoalRepository = GoalRepository;
    type EngineConfigRepository = EngineConfigRepository;

    fn create_activity_repository(&self) -> Self::ActivityRepository {
        ActivityRepository::new(self.clone())
    }

    fn create_snapshot_repository(&self) -> Self::SnapshotRepository {
        SnapshotRepository::new(self.clone())
    }

    fn create_log_repository(&self) -> Self::LogRepository {
        LogRepository::new(self.clone())
    }

    fn create_vacation_repository(&self) -> Self::VacationRepository {
        VacationRepository::new(self.clone())
    }

    fn create_goal_repository(&self) -> Self::GoalRepository {
        GoalRepository::new(self.clone())
    }

    fn create_engine_config_repository(&self) -> Self::EngineConfigRepository {
        EngineConfigRepository::new(self.clone())
    }
}
