//! Goal scoring.
//!
//! A goal's consistency score is the weighted mean of the completion rates of
//! its habit links. Metric links are scored separately as normalized progress
//! from a baseline toward a target.

use chrono::NaiveDate;
use serde::Serialize;
use shared::{Goal, GoalActivity, GoalRole, MetricDirection};

use super::completion_rate::{self, CompletionRate};
use super::store_view::StoreView;

/// Rate of one habit link in a goal report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitScore {
    pub activity_id: String,
    pub weight: f64,
    pub rate: CompletionRate,
}

/// Progress of one metric link in a goal report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub activity_id: String,
    pub latest_value: Option<f64>,
    pub progress: Option<f64>,
    pub trend: Option<MetricTrend>,
}

/// Average change of a metric per day and whether it moves the right way
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricTrend {
    pub average_change_per_day: f64,
    pub is_improving: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalReport {
    pub goal_id: String,
    pub title: String,
    pub as_of: NaiveDate,
    pub window_days: u32,
    pub is_paused: bool,
    pub consistency_score: f64,
    pub habits: Vec<HabitScore>,
    pub metrics: Vec<MetricScore>,
}

/// Weighted mean of habit-link rates over the window ending at `today`.
///
/// Links to deleted activities and links whose rate is not applicable are
/// left out entirely. Negative weights count as zero. With no eligible weight
/// the score is zero.
pub fn consistency_score(goal: &Goal, window_days: u32, today: NaiveDate, view: &StoreView) -> f64 {
    weighted_mean(&habit_scores(goal, window_days, today, view))
}

fn habit_scores(goal: &Goal, window_days: u32, today: NaiveDate, view: &StoreView) -> Vec<HabitScore> {
    goal.links
        .iter()
        .filter_map(|link| match link.role {
            GoalRole::Habit { weight } => {
                let activity = view.activity(&link.activity_id)?;
                Some(HabitScore {
                    activity_id: link.activity_id.clone(),
                    weight,
                    rate: completion_rate::rate(activity, window_days, today, view),
                })
            }
            GoalRole::Metric { .. } => None,
        })
        .collect()
}

fn weighted_mean(scores: &[HabitScore]) -> f64 {
    let (weighted_sum, total_weight) = scores
        .iter()
        .filter_map(|score| score.rate.value().map(|rate| (rate, score.weight.max(0.0))))
        .fold((0.0, 0.0), |(sum, total), (rate, weight)| (sum + rate * weight, total + weight));

    if total_weight <= 0.0 {
        return 0.0;
    }
    (weighted_sum / total_weight).clamp(0.0, 1.0)
}

/// Most recent finite value from a completed log of the activity
pub fn latest_metric_value(activity_id: &str, view: &StoreView) -> Option<f64> {
    view.logs_for(activity_id)
        .into_iter()
        .rev()
        .filter(|log| log.is_completed())
        .find_map(|log| log.value.filter(|value| value.is_finite()))
}

/// Normalized progress of a metric link in `[0, 1]`.
///
/// `None` for habit links, when baseline or target is missing, or when the
/// activity has no numeric completed log. `target == baseline` yields zero.
/// Direction does not change the formula: a decreasing goal has its target
/// below its baseline.
pub fn metric_progress(link: &GoalActivity, view: &StoreView) -> Option<f64> {
    let GoalRole::Metric {
        baseline: Some(baseline),
        target: Some(target),
        ..
    } = link.role
    else {
        return None;
    };

    let latest = latest_metric_value(&link.activity_id, view)?;
    Some(normalize_progress(latest, baseline, target))
}

fn normalize_progress(latest: f64, baseline: f64, target: f64) -> f64 {
    let span = target - baseline;
    if span == 0.0 {
        return 0.0;
    }
    ((latest - baseline) / span).clamp(0.0, 1.0)
}

/// Mean of the per-day rates of change between consecutive numeric completed
/// logs inside the window ending at `today`.
///
/// Needs at least two numeric logs on different days. Non-finite values are
/// ignored. Whether the change is an improvement follows the link's direction,
/// or the sign of `target - baseline` when no direction is set.
pub fn metric_trend(link: &GoalActivity, window_days: u32, today: NaiveDate, view: &StoreView) -> Option<MetricTrend> {
    let GoalRole::Metric {
        baseline,
        target,
        direction,
    } = link.role
    else {
        return None;
    };

    let first_day = completion_rate::window_dates(window_days, today).next()?;
    let points: Vec<(NaiveDate, f64)> = view
        .logs_for(&link.activity_id)
        .into_iter()
        .filter(|log| log.is_completed() && log.date >= first_day && log.date <= today)
        .filter_map(|log| log.value.filter(|value| value.is_finite()).map(|value| (log.date, value)))
        .collect();

    let rates: Vec<f64> = points
        .windows(2)
        .filter_map(|pair| {
            let (from_date, from_value) = pair[0];
            let (to_date, to_value) = pair[1];
            let days = (to_date - from_date).num_days();
            (days > 0).then(|| (to_value - from_value) / days as f64)
        })
        .collect();
    if rates.is_empty() {
        return None;
    }

    let average_change_per_day = rates.iter().sum::<f64>() / rates.len() as f64;
    let direction = direction.or_else(|| match (baseline, target) {
        (Some(baseline), Some(target)) if target < baseline => Some(MetricDirection::Decrease),
        (Some(_), Some(_)) => Some(MetricDirection::Increase),
        _ => None,
    })?;

    let is_improving = match direction {
        MetricDirection::Increase => average_change_per_day > 0.0,
        MetricDirection::Decrease => average_change_per_day < 0.0,
    };

    Some(MetricTrend {
        average_change_per_day,
        is_improving,
    })
}

/// A goal is paused when paused by hand, or when it links activities and all
/// of them are deleted or stopped before `today`. `stopped_at` is the last
/// active day, so an activity stopped today still counts.
pub fn is_goal_paused(goal: &Goal, today: NaiveDate, view: &StoreView) -> bool {
    if goal.is_manually_paused {
        return true;
    }
    if goal.links.is_empty() {
        return false;
    }

    goal.links.iter().all(|link| match view.activity(&link.activity_id) {
        Some(activity) => activity.stopped_at.map_or(false, |stopped_at| stopped_at < today),
        None => true,
    })
}

/// Score, habit rates, metric progress and pause state of a goal
pub fn goal_report(
    goal: &Goal,
    window_days: u32,
    trend_window_days: u32,
    today: NaiveDate,
    view: &StoreView,
) -> GoalReport {
    let habits = habit_scores(goal, window_days, today, view);
    let consistency_score = weighted_mean(&habits);

    let metrics = goal
        .metric_links()
        .filter(|link| view.activity(&link.activity_id).is_some())
        .map(|link| MetricScore {
            activity_id: link.activity_id.clone(),
            latest_value: latest_metric_value(&link.activity_id, view),
            progress: metric_progress(link, view),
            trend: metric_trend(link, trend_window_days, today, view),
        })
        .collect();

    GoalReport {
        goal_id: goal.id.clone(),
        title: goal.title.clone(),
        as_of: today,
        window_days,
        is_paused: is_goal_paused(goal, today, view),
        consistency_score,
        habits,
        metrics,
    }
}
