/// Test utilities for repository tests.
///
/// Every environment lives in its own temporary directory that is removed
/// when the environment is dropped, even if the test panics.

use anyhow::Result;
use chrono::NaiveDate;
use shared::{Activity, ActivityKind, Schedule};
use tempfile::TempDir;

use super::{
    ActivityRepository, CsvConnection, EngineConfigRepository, GoalRepository, LogRepository,
    SnapshotRepository, VacationRepository,
};
use crate::storage::traits::ActivityStorage;

/// Temporary directory plus a connection over it
pub struct TestEnvironment {
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: std::path::PathBuf,
    _temp_dir: TempDir, // Keep alive to prevent cleanup
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let connection = CsvConnection::new(temp_dir.path())?;
        Ok(Self {
            connection,
            base_path: temp_dir.path().to_path_buf(),
            _temp_dir: temp_dir,
        })
    }
}

/// Repository instances over one test environment
pub struct RepositoryTestHelper {
    pub env: TestEnvironment,
    pub activity_repo: ActivityRepository,
    pub snapshot_repo: SnapshotRepository,
    pub log_repo: LogRepository,
    pub vacation_repo: VacationRepository,
    pub goal_repo: GoalRepository,
    pub config_repo: EngineConfigRepository,
}

impl RepositoryTestHelper {
    pub async fn new() -> Result<Self> {
        let env = TestEnvironment::new()?;
        let connection = env.connection.clone();

        Ok(Self {
            activity_repo: ActivityRepository::new(connection.clone()),
            snapshot_repo: SnapshotRepository::new(connection.clone()),
            log_repo: LogRepository::new(connection.clone()),
            vacation_repo: VacationRepository::new(connection.clone()),
            goal_repo: GoalRepository::new(connection.clone()),
            config_repo: EngineConfigRepository::new(connection),
            env,
        })
    }

    /// Store a daily activity created on 2024-01-01
    pub async fn create_test_activity(&self, id: &str, kind: ActivityKind) -> Result<Activity> {
        let activity = Activity::new(id, &format!("Test {}", id), kind, Schedule::daily(), date(2024, 1, 1));
        self.activity_repo.store_activity(&activity).await?;
        Ok(activity)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
