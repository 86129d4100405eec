//! Storage-backed consistency reports.
//!
//! Each call loads one `StoreView` and runs the pure engine over it. Windows
//! left open by a query fall back to the stored `EngineConfig`.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use log::{debug, info};
use std::sync::Arc;

use crate::domain::commands::report::{ActivityRateQuery, GoalReportQuery};
use crate::domain::completion_rate::{self, CompletionRate, DayRecord, MAX_WINDOW_DAYS};
use crate::domain::goal_scoring::{self, GoalReport};
use crate::domain::models::EngineConfig;
use crate::domain::store_view::StoreView;
use crate::storage::{
    ActivityStorage, Connection, EngineConfigStorage, GoalStorage, LogStorage, SnapshotStorage, VacationStorage,
};

pub struct ConsistencyService<C: Connection> {
    activity_repository: C::ActivityRepository,
    snapshot_repository: C::SnapshotRepository,
    log_repository: C::LogRepository,
    vacation_repository: C::VacationRepository,
    goal_repository: C::GoalRepository,
    config_repository: C::EngineConfigRepository,
}

impl<C: Connection> ConsistencyService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            activity_repository: connection.create_activity_repository(),
            snapshot_repository: connection.create_snapshot_repository(),
            log_repository: connection.create_log_repository(),
            vacation_repository: connection.create_vacation_repository(),
            goal_repository: connection.create_goal_repository(),
            config_repository: connection.create_engine_config_repository(),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        self.config_repository.get_engine_config()
    }

    /// Read every entity the engine needs into one view
    pub async fn load_view(&self) -> Result<StoreView> {
        let activities = self.activity_repository.list_activities().await?;
        let snapshots = self.snapshot_repository.list_snapshots().await?;
        let logs = self.log_repository.list_logs().await?;
        let vacation_days = self.vacation_repository.list_vacation_days().await?;

        debug!(
            "Loaded view: {} activities, {} snapshots, {} logs, {} vacation days",
            activities.len(),
            snapshots.len(),
            logs.len(),
            vacation_days.len()
        );
        Ok(StoreView::new(activities, snapshots, logs, vacation_days))
    }

    fn window_or_default(window_days: Option<u32>, default: u32) -> Result<u32> {
        match window_days {
            Some(0) => Err(anyhow!("Window must be at least one day")),
            Some(days) if days > MAX_WINDOW_DAYS => Err(anyhow!("Window must be at most {} days", MAX_WINDOW_DAYS)),
            Some(days) => Ok(days),
            None => Ok(default),
        }
    }

    pub async fn activity_rate(&self, query: ActivityRateQuery) -> Result<CompletionRate> {
        let window_days = Self::window_or_default(query.window_days, self.engine_config()?.habit_window_days)?;
        let view = self.load_view().await?;
        let activity = view
            .activity(&query.activity_id)
            .ok_or_else(|| anyhow!("Activity not found: {}", query.activity_id))?;

        let rate = completion_rate::rate(activity, window_days, query.today, &view);
        debug!("Rate of {} over {} days: {:?}", activity.id, window_days, rate);
        Ok(rate)
    }

    /// Day-by-day outcomes over the same window as `activity_rate`
    pub async fn activity_history(&self, query: ActivityRateQuery) -> Result<Vec<DayRecord>> {
        let window_days = Self::window_or_default(query.window_days, self.engine_config()?.habit_window_days)?;
        let view = self.load_view().await?;
        let activity = view
            .activity(&query.activity_id)
            .ok_or_else(|| anyhow!("Activity not found: {}", query.activity_id))?;

        Ok(completion_rate::daily_history(activity, window_days, query.today, &view))
    }

    pub async fn goal_report(&self, query: GoalReportQuery) -> Result<GoalReport> {
        let config = self.engine_config()?;
        let window_days = Self::window_or_default(query.window_days, config.goal_window_days)?;
        let goal = self
            .goal_repository
            .get_goal(&query.goal_id)
            .await?
            .ok_or_else(|| anyhow!("Goal not found: {}", query.goal_id))?;
        let view = self.load_view().await?;

        Ok(goal_scoring::goal_report(
            &goal,
            window_days,
            config.trend_window_days,
            query.today,
            &view,
        ))
    }

    /// Reports for every goal, computed against a single view
    pub async fn all_goal_reports(&self, today: NaiveDate) -> Result<Vec<GoalReport>> {
        let config = self.engine_config()?;
        let goals = self.goal_repository.list_goals().await?;
        let view = self.load_view().await?;

        let reports: Vec<GoalReport> = goals
            .iter()
            .map(|goal| {
                goal_scoring::goal_report(goal, config.goal_window_days, config.trend_window_days, today, &view)
            })
            .collect();

        info!("Computed {} goal reports as of {}", reports.len(), today);
        Ok(reports)
    }
}
