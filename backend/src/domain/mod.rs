//! # Domain Module
//!
//! Contains the scheduling and scoring rules of the habit engine.
//!
//! ## Module Organization
//!
//! - **store_view**: consistent in-memory read view over the store
//! - **config_resolver**: which configuration applied to an activity on a date
//! - **schedule_evaluator**: day-level due-ness and lifetime/vacation exemptions
//! - **container_aggregator**: date-appropriate children and container day status
//! - **completion_rate**: trailing-window completion rates and day history
//! - **goal_scoring**: weighted consistency score and metric progress
//! - **structure_service**: leaf/container conversions that append snapshots
//! - **goal_link_service**: validation of goal links at creation time
//! - **consistency_service**: storage-backed reports for activities and goals
//!
//! ## Business Rules
//!
//! - A vacation day, a day before creation and a day after stopping are never due
//! - Snapshots are append-only and never overlap for one activity
//! - Skipped and missed days both lower a rate
//! - An activity that was never due in a window has a rate of zero

pub mod store_view;
pub mod config_resolver;
pub mod schedule_evaluator;
pub mod container_aggregator;
pub mod completion_rate;
pub mod goal_scoring;
pub mod structure_service;
pub mod goal_link_service;
pub mod consistency_service;
pub mod commands;
pub mod models;

pub use store_view::*;
pub use completion_rate::{CompletionRate, DayOutcome, DayRecord};
pub use goal_scoring::{GoalReport, MetricTrend};
pub use structure_service::*;
pub use goal_link_service::*;
pub use consistency_service::*;
