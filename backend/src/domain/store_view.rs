//! Consistent read view over the entity store.
//!
//! Services load one `StoreView` per call and hand it to the pure engine so
//! that every score in that call is computed against the same point in time.

use chrono::NaiveDate;
use shared::{Activity, ActivityConfigSnapshot, ActivityLog, EffectiveConfig, VacationDay};
use std::collections::{HashMap, HashSet};

use super::config_resolver;

#[derive(Debug, Clone, Default)]
pub struct StoreView {
    activities: Vec<Activity>,
    snapshots: Vec<ActivityConfigSnapshot>,
    logs: Vec<ActivityLog>,
    vacation_days: HashSet<NaiveDate>,
    activity_index: HashMap<String, usize>,
    /// Latest log position per (activity, day); later logs overwrite earlier ones
    log_index: HashMap<(String, NaiveDate), usize>,
}

impl StoreView {
    pub fn new(
        activities: Vec<Activity>,
        snapshots: Vec<ActivityConfigSnapshot>,
        logs: Vec<ActivityLog>,
        vacation_days: Vec<VacationDay>,
    ) -> Self {
        let activity_index = activities
            .iter()
            .enumerate()
            .map(|(position, activity)| (activity.id.clone(), position))
            .collect();

        let mut log_index = HashMap::new();
        for (position, log) in logs.iter().enumerate() {
            log_index.insert((log.activity_id.clone(), log.date), position);
        }

        Self {
            activities,
            snapshots,
            logs,
            vacation_days: vacation_days.into_iter().map(|day| day.date).collect(),
            activity_index,
            log_index,
        }
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn snapshots(&self) -> &[ActivityConfigSnapshot] {
        &self.snapshots
    }

    pub fn logs(&self) -> &[ActivityLog] {
        &self.logs
    }

    /// Look up an activity; `None` when it was deleted
    pub fn activity(&self, activity_id: &str) -> Option<&Activity> {
        self.activity_index
            .get(activity_id)
            .map(|&position| &self.activities[position])
    }

    pub fn snapshots_for<'a>(&'a self, activity_id: &'a str) -> impl Iterator<Item = &'a ActivityConfigSnapshot> + 'a {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.activity_id == activity_id)
    }

    /// The log recorded for an activity on a day, if any
    pub fn log_for(&self, activity_id: &str, date: NaiveDate) -> Option<&ActivityLog> {
        self.log_index
            .get(&(activity_id.to_string(), date))
            .map(|&position| &self.logs[position])
    }

    /// Every effective log of an activity, one per day, ordered by date
    pub fn logs_for(&self, activity_id: &str) -> Vec<&ActivityLog> {
        let mut logs: Vec<&ActivityLog> = self
            .log_index
            .iter()
            .filter(|((id, _), _)| id == activity_id)
            .map(|(_, &position)| &self.logs[position])
            .collect();
        logs.sort_by_key(|log| log.date);
        logs
    }

    pub fn is_vacation(&self, date: NaiveDate) -> bool {
        self.vacation_days.contains(&date)
    }

    /// Configuration of `activity` that was in effect on `date`
    pub fn resolve(&self, activity: &Activity, date: NaiveDate) -> EffectiveConfig {
        config_resolver::resolve(activity, &self.snapshots, date)
    }
}
