//! Engine configuration persisted next to the data.
use serde::{Deserialize, Serialize};

use crate::domain::completion_rate::MAX_WINDOW_DAYS;

pub const DEFAULT_HABIT_WINDOW_DAYS: u32 = 14;
pub const DEFAULT_GOAL_WINDOW_DAYS: u32 = 14;
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 7;
pub const DATA_FORMAT_VERSION: &str = "1.0";

/// Default windows used by the services. Every engine call still takes its
/// window explicitly; these values only choose what the services pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_habit_window_days")]
    pub habit_window_days: u32,
    #[serde(default = "default_goal_window_days")]
    pub goal_window_days: u32,
    #[serde(default = "default_trend_window_days")]
    pub trend_window_days: u32,
    #[serde(default = "default_data_format_version")]
    pub data_format_version: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            habit_window_days: DEFAULT_HABIT_WINDOW_DAYS,
            goal_window_days: DEFAULT_GOAL_WINDOW_DAYS,
            trend_window_days: DEFAULT_TREND_WINDOW_DAYS,
            data_format_version: DATA_FORMAT_VERSION.to_string(),
        }
    }
}

impl EngineConfig {
    /// Reject windows that cannot produce a rate or exceed the engine's limit
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("habit_window_days", self.habit_window_days),
            ("goal_window_days", self.goal_window_days),
            ("trend_window_days", self.trend_window_days),
        ] {
            if value == 0 {
                return Err(anyhow::anyhow!("{} must be at least 1", name));
            }
            if value > MAX_WINDOW_DAYS {
                return Err(anyhow::anyhow!("{} must be at most {}", name, MAX_WINDOW_DAYS));
            }
        }
        Ok(())
    }
}

fn default_habit_window_days() -> u32 {
    DEFAULT_HABIT_WINDOW_DAYS
}

fn default_goal_window_days() -> u32 {
    DEFAULT_GOAL_WINDOW_DAYS
}

fn default_trend_window_days() -> u32 {
    DEFAULT_TREND_WINDOW_DAYS
}

fn default_data_format_version() -> String {
    DATA_FORMAT_VERSION.to_string()
}
