//! Errors raised when linking activities to goals.

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GoalLinkError {
    #[error("Goal not found: {0}")]
    GoalNotFound(String),
    #[error("Activity not found: {0}")]
    ActivityNotFound(String),
    #[error("Activity {0} is already linked to this goal")]
    AlreadyLinked(String),
    #[error("Activity {activity_id} is already covered by linked container {container_id}")]
    CoveredByContainer {
        activity_id: String,
        container_id: String,
    },
    #[error("Container {container_id} has children already linked individually: {child_ids:?}")]
    ChildrenAlreadyLinked {
        container_id: String,
        child_ids: Vec<String>,
    },
    #[error("Containers cannot be tracked as metrics: {0}")]
    MetricOnContainer(String),
    #[error("Habit weight must be a positive number")]
    NonPositiveWeight,
}
