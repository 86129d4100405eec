//! # Storage Traits
//!
//! Storage abstraction traits that let different backends be used
//! interchangeably by the domain services.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{Activity, ActivityConfigSnapshot, ActivityLog, Goal, VacationDay};

use crate::domain::models::EngineConfig;

/// Trait defining the interface for activity storage operations
#[async_trait]
pub trait ActivityStorage: Send + Sync {
    /// Insert an activity, replacing any activity with the same ID
    async fn store_activity(&self, activity: &Activity) -> Result<()>;

    /// Insert or replace several activities in one write
    async fn store_activities(&self, activities: &[Activity]) -> Result<()>;

    /// Retrieve a specific activity by ID
    async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>>;

    /// List all activities in insertion order
    async fn list_activities(&self) -> Result<Vec<Activity>>;

    /// Activities whose parent is `container_id`
    async fn list_children(&self, container_id: &str) -> Result<Vec<Activity>>;

    /// Delete an activity. Returns true if it existed.
    async fn delete_activity(&self, activity_id: &str) -> Result<bool>;
}

/// Trait defining the interface for config snapshot storage.
///
/// Snapshots are append-only; they disappear only with their activity.
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Append a snapshot. Fails if its range overlaps an existing snapshot of
    /// the same activity or is empty.
    async fn append_snapshot(&self, snapshot: &ActivityConfigSnapshot) -> Result<()>;

    /// Snapshots of one activity ordered by `effective_from`
    async fn list_snapshots_for(&self, activity_id: &str) -> Result<Vec<ActivityConfigSnapshot>>;

    /// All snapshots
    async fn list_snapshots(&self) -> Result<Vec<ActivityConfigSnapshot>>;

    /// Remove every snapshot of an activity. Returns how many were removed.
    async fn delete_snapshots_for(&self, activity_id: &str) -> Result<usize>;
}

/// Trait defining the interface for activity log storage
#[async_trait]
pub trait LogStorage: Send + Sync {
    /// Store a log, overwriting any log of the same activity on the same day
    async fn store_log(&self, log: &ActivityLog) -> Result<()>;

    async fn get_log(&self, activity_id: &str, date: NaiveDate) -> Result<Option<ActivityLog>>;

    /// Logs of one activity ordered by date
    async fn list_logs_for(&self, activity_id: &str) -> Result<Vec<ActivityLog>>;

    /// All logs
    async fn list_logs(&self) -> Result<Vec<ActivityLog>>;

    /// Delete one day's log. Returns true if it existed.
    async fn delete_log(&self, activity_id: &str, date: NaiveDate) -> Result<bool>;

    /// Remove every log of an activity. Returns how many were removed.
    async fn delete_logs_for(&self, activity_id: &str) -> Result<usize>;
}

/// Trait defining the interface for vacation day storage
#[async_trait]
pub trait VacationStorage: Send + Sync {
    /// Mark a day as vacation; marking it again replaces the note
    async fn add_vacation_day(&self, day: &VacationDay) -> Result<()>;

    /// Returns true if the day was a vacation day
    async fn remove_vacation_day(&self, date: NaiveDate) -> Result<bool>;

    /// All vacation days ordered by date
    async fn list_vacation_days(&self) -> Result<Vec<VacationDay>>;
}

/// Trait defining the interface for goal storage
#[async_trait]
pub trait GoalStorage: Send + Sync {
    /// Insert a goal, replacing any goal with the same ID
    async fn store_goal(&self, goal: &Goal) -> Result<()>;

    async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>>;

    async fn list_goals(&self) -> Result<Vec<Goal>>;

    /// Returns true if the goal existed
    async fn delete_goal(&self, goal_id: &str) -> Result<bool>;
}

/// Trait defining the interface for engine configuration storage
pub trait EngineConfigStorage: Send + Sync {
    /// Get the configuration, creating the default one if none exists
    fn get_engine_config(&self) -> Result<EngineConfig>;

    /// Validate and persist the configuration
    fn update_engine_config(&self, config: &EngineConfig) -> Result<()>;
}

/// Trait defining the interface for storage connections
///
/// A connection is a factory for repositories over one data source, so the
/// services can work with any storage backend.
pub trait Connection: Send + Sync + Clone {
    type ActivityRepository: ActivityStorage;
    type SnapshotRepository: SnapshotStorage;
    type LogRepository: LogStorage;
    type VacationRepository: VacationStorage;
    type GoalRepository: GoalStorage;
    type EngineConfigRepository: EngineConfigStorage;

    fn create_activity_repository(&self) -> Self::ActivityRepository;
    fn create_snapshot_repository(&self) -> Self::SnapshotRepository;
    fn create_log_repository(&self) -> Self::LogRepository;
    fn create_vacation_repository(&self) -> Self::VacationRepository;
    fn create_goal_repository(&self) -> Self::GoalRepository;
    fn create_engine_config_repository(&self) -> Self::EngineConfigRepository;
}
