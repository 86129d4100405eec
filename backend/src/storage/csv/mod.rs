//! # File Storage
//!
//! File-based storage under a single data directory.
//!
//! ## File Structure
//!
//! ```text
//! data/
//! ├── engine_config.yaml
//! ├── activities.yaml
//! ├── snapshots.yaml
//! ├── goals.yaml
//! ├── logs.csv
//! └── vacation_days.csv
//! ```
//!
//! Every rewrite goes to a temp file that is then renamed over the original.

pub mod connection;
pub mod activity_repository;
pub mod snapshot_repository;
pub mod log_repository;
pub mod vacation_repository;
pub mod goal_repository;
pub mod engine_config_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use activity_repository::ActivityRepository;
pub use snapshot_repository::SnapshotRepository;
pub use log_repository::LogRepository;
pub use vacation_repository::VacationRepository;
pub use goal_repository::GoalRepository;
pub use engine_config_repository::EngineConfigRepository;
