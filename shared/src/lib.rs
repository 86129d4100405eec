use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of trackable activity. Containers group other activities; every
/// other kind is a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Checkbox,
    Value,
    Cumulative,
    Metric,
    Container,
}

impl ActivityKind {
    pub fn is_container(&self) -> bool {
        matches!(self, ActivityKind::Container)
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActivityKind::Checkbox => "checkbox",
            ActivityKind::Value => "value",
            ActivityKind::Cumulative => "cumulative",
            ActivityKind::Metric => "metric",
            ActivityKind::Container => "container",
        };
        write!(f, "{}", name)
    }
}

/// What a metric activity records. Only meaningful for `ActivityKind::Metric`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Value,
    Checkbox,
    Photo,
}

/// Part of the day an activity (or one of its sessions) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Morning,
    Afternoon,
    Evening,
    AllDay,
}

/// Calendar recurrence of an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recurrence {
    /// Due every day
    Daily,
    /// Due on the listed weekdays
    Weekly { active_weekdays: Vec<Weekday> },
    /// Due every `every_n_days` days counted from `anchor_date`
    Interval { every_n_days: u32, anchor_date: NaiveDate },
    /// Due every day until the activity is stopped
    Sticky,
    /// Due once, on `specific_date`
    Adhoc { specific_date: NaiveDate },
}

/// Schedule of an activity: the day-level recurrence plus optional
/// within-day placement.
///
/// `time_window` and `time_slots` only describe *when within a day* the
/// activity happens. They never change whether a day is scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub recurrence: Recurrence,
    #[serde(default)]
    pub time_window: Option<TimeSlot>,
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
}

impl Schedule {
    pub fn new(recurrence: Recurrence) -> Self {
        Self {
            recurrence,
            time_window: None,
            time_slots: Vec::new(),
        }
    }

    pub fn daily() -> Self {
        Self::new(Recurrence::Daily)
    }

    pub fn weekly(active_weekdays: Vec<Weekday>) -> Self {
        Self::new(Recurrence::Weekly { active_weekdays })
    }

    pub fn interval(every_n_days: u32, anchor_date: NaiveDate) -> Self {
        Self::new(Recurrence::Interval {
            every_n_days,
            anchor_date,
        })
    }

    pub fn sticky() -> Self {
        Self::new(Recurrence::Sticky)
    }

    pub fn adhoc(specific_date: NaiveDate) -> Self {
        Self::new(Recurrence::Adhoc { specific_date })
    }

    pub fn with_time_window(mut self, slot: TimeSlot) -> Self {
        self.time_window = Some(slot);
        self
    }

    pub fn with_time_slots(mut self, slots: Vec<TimeSlot>) -> Self {
        self.time_slots = slots;
        self
    }

    /// Number of sessions per scheduled day (at least one)
    pub fn sessions_per_day(&self) -> usize {
        self.time_slots.len().max(1)
    }
}

/// A trackable activity with its *current* configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub kind: ActivityKind,
    pub schedule: Schedule,
    #[serde(default)]
    pub metric_kind: Option<MetricKind>,
    #[serde(default)]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    /// First day the activity is eligible for scheduling
    pub created_date: NaiveDate,
    /// Last active day; `None` while the activity is running
    #[serde(default)]
    pub stopped_at: Option<NaiveDate>,
    /// Owning container, if any
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
}

impl Activity {
    /// Create an active, top-level activity with no kind-specific fields
    pub fn new(id: &str, name: &str, kind: ActivityKind, schedule: Schedule, created_date: NaiveDate) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            schedule,
            metric_kind: None,
            target_value: None,
            unit: None,
            created_date,
            stopped_at: None,
            parent_id: None,
            category_id: None,
        }
    }

    /// Generate an activity ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("activity::{}", epoch_millis)
    }

    /// Parse an activity ID to extract the timestamp
    pub fn parse_id(id: &str) -> Result<u64, IdError> {
        parse_prefixed_id(id, "activity")
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    /// The configuration currently attached to the activity
    pub fn current_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            kind: self.kind,
            schedule: self.schedule.clone(),
            metric_kind: self.metric_kind,
            target_value: self.target_value,
            unit: self.unit.clone(),
        }
    }
}

/// The kind-dependent configuration in effect for an activity on some day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    pub kind: ActivityKind,
    pub schedule: Schedule,
    pub metric_kind: Option<MetricKind>,
    pub target_value: Option<f64>,
    pub unit: Option<String>,
}

/// Immutable record of an activity's configuration before a structural change.
///
/// Both range bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfigSnapshot {
    pub id: String,
    pub activity_id: String,
    pub effective_from: NaiveDate,
    pub effective_until: NaiveDate,
    pub kind: ActivityKind,
    pub schedule: Schedule,
    #[serde(default)]
    pub metric_kind: Option<MetricKind>,
    #[serde(default)]
    pub target_value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl ActivityConfigSnapshot {
    /// Capture `config` for `activity_id` over `[effective_from, effective_until]`
    pub fn capture(
        activity_id: &str,
        effective_from: NaiveDate,
        effective_until: NaiveDate,
        config: EffectiveConfig,
    ) -> Self {
        Self {
            id: Self::generate_id(activity_id, effective_from),
            activity_id: activity_id.to_string(),
            effective_from,
            effective_until,
            kind: config.kind,
            schedule: config.schedule,
            metric_kind: config.metric_kind,
            target_value: config.target_value,
            unit: config.unit,
        }
    }

    pub fn generate_id(activity_id: &str, effective_from: NaiveDate) -> String {
        format!("snapshot::{}::{}", activity_id, effective_from.format("%Y-%m-%d"))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.effective_from <= date && date <= self.effective_until
    }

    pub fn config(&self) -> EffectiveConfig {
        EffectiveConfig {
            kind: self.kind,
            schedule: self.schedule.clone(),
            metric_kind: self.metric_kind,
            target_value: self.target_value,
            unit: self.unit.clone(),
        }
    }
}

/// Outcome recorded by the user for one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogStatus {
    Completed,
    Skipped,
}

impl fmt::Display for LogStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogStatus::Completed => write!(f, "completed"),
            LogStatus::Skipped => write!(f, "skipped"),
        }
    }
}

impl LogStatus {
    pub fn from_string(value: &str) -> Result<Self, String> {
        match value {
            "completed" => Ok(LogStatus::Completed),
            "skipped" => Ok(LogStatus::Skipped),
            other => Err(format!("Unknown log status: {}", other)),
        }
    }
}

/// One recorded outcome for an activity on a calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityLog {
    pub activity_id: String,
    pub date: NaiveDate,
    pub status: LogStatus,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub media_ref: Option<String>,
}

impl ActivityLog {
    pub fn completed(activity_id: &str, date: NaiveDate) -> Self {
        Self {
            activity_id: activity_id.to_string(),
            date,
            status: LogStatus::Completed,
            value: None,
            media_ref: None,
        }
    }

    pub fn skipped(activity_id: &str, date: NaiveDate) -> Self {
        Self {
            status: LogStatus::Skipped,
            ..Self::completed(activity_id, date)
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == LogStatus::Completed
    }
}

/// A day on which no activity counts as scheduled
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacationDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub note: Option<String>,
}

impl VacationDay {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, note: None }
    }
}

/// Which way a metric should move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    Increase,
    Decrease,
}

/// Role of an activity inside a goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum GoalRole {
    /// Contributes its completion rate to the weighted consistency score
    Habit {
        #[serde(default = "default_weight")]
        weight: f64,
    },
    /// Tracked for progress from `baseline` toward `target`
    Metric {
        #[serde(default)]
        baseline: Option<f64>,
        #[serde(default)]
        target: Option<f64>,
        #[serde(default)]
        direction: Option<MetricDirection>,
    },
}

fn default_weight() -> f64 {
    1.0
}

/// Link from a goal to one activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalActivity {
    pub activity_id: String,
    #[serde(flatten)]
    pub role: GoalRole,
}

impl GoalActivity {
    pub fn habit(activity_id: &str, weight: f64) -> Self {
        Self {
            activity_id: activity_id.to_string(),
            role: GoalRole::Habit { weight },
        }
    }

    pub fn metric(
        activity_id: &str,
        baseline: Option<f64>,
        target: Option<f64>,
        direction: Option<MetricDirection>,
    ) -> Self {
        Self {
            activity_id: activity_id.to_string(),
            role: GoalRole::Metric {
                baseline,
                target,
                direction,
            },
        }
    }

    pub fn is_habit(&self) -> bool {
        matches!(self.role, GoalRole::Habit { .. })
    }

    pub fn is_metric(&self) -> bool {
        matches!(self.role, GoalRole::Metric { .. })
    }
}

/// A weighted aggregation target over activities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub is_manually_paused: bool,
    /// Ordered links to activities
    #[serde(default)]
    pub links: Vec<GoalActivity>,
}

impl Goal {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            deadline: None,
            is_manually_paused: false,
            links: Vec::new(),
        }
    }

    /// Generate a goal ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("goal::{}", epoch_millis)
    }

    pub fn parse_id(id: &str) -> Result<u64, IdError> {
        parse_prefixed_id(id, "goal")
    }

    pub fn habit_links(&self) -> impl Iterator<Item = &GoalActivity> {
        self.links.iter().filter(|link| link.is_habit())
    }

    pub fn metric_links(&self) -> impl Iterator<Item = &GoalActivity> {
        self.links.iter().filter(|link| link.is_metric())
    }
}

fn parse_prefixed_id(id: &str, prefix: &str) -> Result<u64, IdError> {
    let parts: Vec<&str> = id.split("::").collect();
    if parts.len() != 2 || parts[0] != prefix {
        return Err(IdError::InvalidFormat);
    }

    parts[1].parse::<u64>().map_err(|_| IdError::InvalidTimestamp)
}

#[derive(Debug, Clone, PartialEq)]
pub enum IdError {
    InvalidFormat,
    InvalidTimestamp,
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdError::InvalidFormat => write!(f, "Invalid ID format"),
            IdError::InvalidTimestamp => write!(f, "Invalid timestamp in ID"),
        }
    }
}

impl std::error::Error for IdError {}
