//! Temporal configuration resolution.
//!
//! An activity's kind and schedule can change over its lifetime. Each
//! structural change archives the previous configuration as a snapshot with an
//! inclusive date range. Resolving a date consults those snapshots first and
//! falls back to the activity's current configuration.

use chrono::NaiveDate;
use log::warn;
use shared::{Activity, ActivityConfigSnapshot, EffectiveConfig};

/// Configuration of `activity` in effect on `date`.
///
/// `snapshots` may contain snapshots of other activities; they are ignored.
/// If more than one snapshot covers `date` the snapshot table is malformed and
/// the current configuration is returned.
pub fn resolve(activity: &Activity, snapshots: &[ActivityConfigSnapshot], date: NaiveDate) -> EffectiveConfig {
    let mut covering = snapshots
        .iter()
        .filter(|snapshot| snapshot.activity_id == activity.id && snapshot.contains(date));

    match (covering.next(), covering.next()) {
        (Some(snapshot), None) => snapshot.config(),
        (None, _) => activity.current_config(),
        (Some(_), Some(_)) => {
            warn!(
                "Overlapping snapshots for activity {} on {}, using current configuration",
                activity.id, date
            );
            activity.current_config()
        }
    }
}

/// Check that an activity's snapshots are well-formed: every range is
/// non-empty and, ordered by start, no range overlaps the next.
pub fn snapshot_ranges_valid<'a, I>(snapshots: I) -> bool
where
    I: IntoIterator<Item = &'a ActivityConfigSnapshot>,
{
    let mut ranges: Vec<(NaiveDate, NaiveDate)> = snapshots
        .into_iter()
        .map(|snapshot| (snapshot.effective_from, snapshot.effective_until))
        .collect();
    ranges.sort();

    ranges.iter().all(|(from, until)| from <= until)
        && ranges.windows(2).all(|pair| pair[0].1 < pair[1].0)
}

/// Last day covered by any snapshot of the activity
pub fn last_snapshot_until<'a, I>(snapshots: I) -> Option<NaiveDate>
where
    I: IntoIterator<Item = &'a ActivityConfigSnapshot>,
{
    snapshots
        .into_iter()
        .map(|snapshot| snapshot.effective_until)
        .max()
}
