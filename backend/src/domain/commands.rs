//! Domain-level command and query types.
//!
//! These structs are the inputs of the storage-backed services. Every query
//! names its `today` explicitly so results never depend on the wall clock.

pub mod structure {
    use chrono::NaiveDate;
    use shared::{Activity, ActivityConfigSnapshot, ActivityKind, MetricKind, Schedule};

    use crate::domain::models::ChildDisposition;

    /// Turn a leaf activity into a container starting on `change_date`
    #[derive(Debug, Clone)]
    pub struct ConvertToContainerCommand {
        pub activity_id: String,
        pub change_date: NaiveDate,
    }

    /// Turn a container back into a leaf starting on `change_date`
    #[derive(Debug, Clone)]
    pub struct DissolveContainerCommand {
        pub activity_id: String,
        pub change_date: NaiveDate,
        pub new_kind: ActivityKind,
        pub new_schedule: Schedule,
        pub metric_kind: Option<MetricKind>,
        pub target_value: Option<f64>,
        pub unit: Option<String>,
        pub child_disposition: ChildDisposition,
    }

    /// Attach a leaf to a container. Membership changes are not versioned.
    #[derive(Debug, Clone)]
    pub struct MoveIntoContainerCommand {
        pub activity_id: String,
        pub container_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct StopActivityCommand {
        pub activity_id: String,
        pub stopped_at: NaiveDate,
    }

    /// Delete an activity with its logs and snapshots. `deleted_on` only
    /// matters when children are stopped.
    #[derive(Debug, Clone)]
    pub struct DeleteActivityCommand {
        pub activity_id: String,
        pub deleted_on: NaiveDate,
        pub child_disposition: ChildDisposition,
    }

    /// Outcome of a structural change
    #[derive(Debug, Clone, PartialEq)]
    pub struct StructureChangeResult {
        pub activity: Activity,
        pub snapshot: Option<ActivityConfigSnapshot>,
        pub updated_children: Vec<Activity>,
    }
}

pub mod goal {
    use shared::GoalActivity;

    /// Add a link to an existing goal
    #[derive(Debug, Clone)]
    pub struct LinkActivityCommand {
        pub goal_id: String,
        pub link: GoalActivity,
    }
}

pub mod report {
    use chrono::NaiveDate;

    /// Rate of one activity. `window_days` falls back to the configured
    /// habit window.
    #[derive(Debug, Clone)]
    pub struct ActivityRateQuery {
        pub activity_id: String,
        pub window_days: Option<u32>,
        pub today: NaiveDate,
    }

    /// Report for one goal. `window_days` falls back to the configured goal
    /// window.
    #[derive(Debug, Clone)]
    pub struct GoalReportQuery {
        pub goal_id: String,
        pub window_days: Option<u32>,
        pub today: NaiveDate,
    }
}
