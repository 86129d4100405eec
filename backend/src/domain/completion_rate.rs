//! Completion rates over a trailing window of calendar days.
//!
//! For every day of the window the activity's configuration is resolved for
//! that day, exemptions are applied, and the day is classified. Days that are
//! not due count neither way. Due days go into the denominator and completed
//! days into the numerator; skipped and missed days both lower the rate.

use chrono::{Days, NaiveDate};
use serde::Serialize;
use shared::{Activity, ActivityKind, ActivityLog};

use super::container_aggregator;
use super::schedule_evaluator::{self, Exemption};
use super::store_view::StoreView;

/// Classification of one calendar day for one activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOutcome {
    Vacation,
    /// Before creation or after the activity was stopped
    Inactive,
    NotDue,
    Completed,
    Skipped,
    Missed,
}

impl DayOutcome {
    pub fn is_due(&self) -> bool {
        matches!(self, DayOutcome::Completed | DayOutcome::Skipped | DayOutcome::Missed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRecord {
    pub date: NaiveDate,
    pub outcome: DayOutcome,
}

/// Result of a rate calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum CompletionRate {
    Rate(f64),
    /// Sticky and ad-hoc activities have no rate
    NotApplicable,
}

impl CompletionRate {
    pub fn value(&self) -> Option<f64> {
        match self {
            CompletionRate::Rate(value) => Some(*value),
            CompletionRate::NotApplicable => None,
        }
    }
}

/// Due and completed day counts over a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WindowTally {
    pub due_days: u32,
    pub completed_days: u32,
    pub skipped_days: u32,
}

impl WindowTally {
    /// Completed over due, or zero when nothing was due
    pub fn ratio(&self) -> f64 {
        if self.due_days == 0 {
            return 0.0;
        }
        f64::from(self.completed_days) / f64::from(self.due_days)
    }
}

/// Longest window the engine evaluates; longer requests are clamped
pub const MAX_WINDOW_DAYS: u32 = 36_600;

/// The `window_days` calendar days ending at `today`, oldest first.
///
/// A window reaching past the earliest representable date starts there.
pub fn window_dates(window_days: u32, today: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let window_days = window_days.min(MAX_WINDOW_DAYS);
    let first = today
        .checked_sub_days(Days::new(u64::from(window_days.saturating_sub(1))))
        .unwrap_or(NaiveDate::MIN);

    std::iter::successors(Some(first), |date| date.succ_opt())
        .take_while(move |date| *date <= today)
        .take(window_days as usize)
}

/// Classify `date` for `activity`
pub fn evaluate_day(activity: &Activity, date: NaiveDate, view: &StoreView) -> DayOutcome {
    match schedule_evaluator::exemption(activity, date, view.is_vacation(date)) {
        Some(Exemption::Vacation) => return DayOutcome::Vacation,
        Some(Exemption::BeforeCreation) | Some(Exemption::AfterStop) => return DayOutcome::Inactive,
        None => {}
    }

    let config = view.resolve(activity, date);
    match config.kind {
        ActivityKind::Container => {
            let status = container_aggregator::container_day_status(activity, date, view);
            if !status.scheduled {
                DayOutcome::NotDue
            } else if status.completed {
                DayOutcome::Completed
            } else if status.skipped {
                DayOutcome::Skipped
            } else {
                DayOutcome::Missed
            }
        }
        kind => {
            if !schedule_evaluator::is_due(&config.schedule, date) {
                return DayOutcome::NotDue;
            }
            leaf_outcome(kind, view.log_for(&activity.id, date))
        }
    }
}

fn leaf_outcome(kind: ActivityKind, log: Option<&ActivityLog>) -> DayOutcome {
    let Some(log) = log else {
        return DayOutcome::Missed;
    };
    if !log.is_completed() {
        return DayOutcome::Skipped;
    }

    match kind {
        ActivityKind::Checkbox | ActivityKind::Value | ActivityKind::Cumulative | ActivityKind::Metric => {
            DayOutcome::Completed
        }
        // Containers are aggregated from their children, never from their own log
        ActivityKind::Container => DayOutcome::Missed,
    }
}

/// Per-day outcomes over the window, oldest first
pub fn daily_history(activity: &Activity, window_days: u32, today: NaiveDate, view: &StoreView) -> Vec<DayRecord> {
    window_dates(window_days, today)
        .map(|date| DayRecord {
            date,
            outcome: evaluate_day(activity, date, view),
        })
        .collect()
}

/// Due/completed/skipped counts over the window
pub fn tally(activity: &Activity, window_days: u32, today: NaiveDate, view: &StoreView) -> WindowTally {
    window_dates(window_days, today).fold(WindowTally::default(), |mut tally, date| {
        match evaluate_day(activity, date, view) {
            DayOutcome::Completed => {
                tally.due_days += 1;
                tally.completed_days += 1;
            }
            DayOutcome::Skipped => {
                tally.due_days += 1;
                tally.skipped_days += 1;
            }
            DayOutcome::Missed => tally.due_days += 1,
            DayOutcome::Vacation | DayOutcome::Inactive | DayOutcome::NotDue => {}
        }
        tally
    })
}

/// Completion rate of `activity` over the `window_days` days ending at `today`.
///
/// Returns `NotApplicable` when the configuration in effect on `today` is a
/// sticky or ad-hoc leaf. A window with no due days yields `Rate(0.0)`.
pub fn rate(activity: &Activity, window_days: u32, today: NaiveDate, view: &StoreView) -> CompletionRate {
    let config = view.resolve(activity, today);
    if !config.kind.is_container() && schedule_evaluator::is_window_excluded(&config.schedule) {
        return CompletionRate::NotApplicable;
    }

    CompletionRate::Rate(tally(activity, window_days, today, view).ratio())
}
