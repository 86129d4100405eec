//! Structural changes of activities (leaf ↔ container).

/// What happens to the children of a dissolved container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildDisposition {
    /// Children stay active as top-level activities
    MakeTopLevel,
    /// Children are detached and stopped on the day before the change
    Stop,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StructureChangeError {
    #[error("Activity not found: {0}")]
    ActivityNotFound(String),
    #[error("Activity {0} is already a container")]
    AlreadyContainer(String),
    #[error("Activity {0} is not a container")]
    NotContainer(String),
    #[error("Activity {0} belongs to a container and cannot become one")]
    NestedContainer(String),
    #[error("A container cannot be dissolved into another container")]
    DissolveIntoContainer,
    #[error("Change date {change_date} is before the activity was created ({created_date})")]
    BeforeCreation {
        change_date: chrono::NaiveDate,
        created_date: chrono::NaiveDate,
    },
    #[error("Change date {change_date} is covered by an existing snapshot ending {last_until}")]
    OverlapsHistory {
        change_date: chrono::NaiveDate,
        last_until: chrono::NaiveDate,
    },
}
