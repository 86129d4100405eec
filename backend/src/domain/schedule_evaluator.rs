//! Day-level schedule evaluation.
//!
//! `is_due` classifies a calendar day against a schedule and knows nothing
//! about the activity that owns it. Callers apply `exemption` first: vacation
//! days, days before creation and days after stopping are never due, whatever
//! the schedule says.

use chrono::{Datelike, NaiveDate};
use shared::{Activity, Recurrence, Schedule, VacationDay};

/// Why a day does not count for an activity regardless of its schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exemption {
    Vacation,
    BeforeCreation,
    AfterStop,
}

/// Whether `schedule` expects the activity on `date`
pub fn is_due(schedule: &Schedule, date: NaiveDate) -> bool {
    match &schedule.recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekly { active_weekdays } => active_weekdays.contains(&date.weekday()),
        Recurrence::Interval {
            every_n_days,
            anchor_date,
        } => {
            if *every_n_days == 0 || date < *anchor_date {
                return false;
            }
            (date - *anchor_date).num_days() % i64::from(*every_n_days) == 0
        }
        // Stays due until the activity is stopped; the stop boundary is an exemption
        Recurrence::Sticky => true,
        Recurrence::Adhoc { specific_date } => date == *specific_date,
    }
}

/// The exemption that applies to `activity` on `date`, checked in order:
/// vacation, before creation, after stop.
pub fn exemption(activity: &Activity, date: NaiveDate, is_vacation: bool) -> Option<Exemption> {
    if is_vacation {
        return Some(Exemption::Vacation);
    }
    if date < activity.created_date {
        return Some(Exemption::BeforeCreation);
    }
    match activity.stopped_at {
        Some(stopped_at) if date > stopped_at => Some(Exemption::AfterStop),
        _ => None,
    }
}

/// Whether any exemption applies to `activity` on `date`
pub fn is_exempt(activity: &Activity, date: NaiveDate, vacation_days: &[VacationDay]) -> bool {
    let is_vacation = vacation_days.iter().any(|day| day.date == date);
    exemption(activity, date, is_vacation).is_some()
}

/// Sticky and ad-hoc schedules describe one-off tasks and have no rate
pub fn is_window_excluded(schedule: &Schedule) -> bool {
    matches!(
        schedule.recurrence,
        Recurrence::Sticky | Recurrence::Adhoc { .. }
    )
}
