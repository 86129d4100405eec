//! # Habit Engine
//!
//! Contains all non-UI logic for tracking activities and scoring goals.
//!
//! The crate brings together:
//! - **Domain**: temporal configuration resolution, schedule evaluation,
//!   container aggregation, completion rates and goal scoring
//! - **Storage**: persistence of activities, snapshots, logs, vacation days,
//!   goals and engine configuration
//!
//! ## Architecture
//!
//! ```text
//! Services (StructureService, ConsistencyService, GoalLinkService)
//!     ↓ load a StoreView once per call
//! Pure engine (resolver → evaluator/aggregator → rates → goal scores)
//!     ↑
//! Storage Layer (CSV / YAML files)
//! ```
//!
//! The pure engine never performs I/O and never fails. Services sit on top
//! of the storage traits and return `anyhow::Result`.

pub mod domain;
pub mod storage;

pub use domain::*;
pub use storage::*;
