//! Domain models that are not part of the shared data model: engine
//! configuration and the validation errors of the write-side services.

pub mod engine_config;
pub mod goal_link;
pub mod structure;

pub use engine_config::EngineConfig;
pub use goal_link::GoalLinkError;
pub use structure::{ChildDisposition, StructureChangeError};
