//! Container aggregation.
//!
//! A container has no schedule of its own for scoring purposes: its day status
//! is derived from the children that belong to it on that day.
//!
//! Membership on a past date is approximated from the children's *current*
//! parent pointer, filtered by each child's own lifetime. Reparenting is not
//! versioned, so a child moved into a container today is attributed to it on
//! earlier dates as well, and a child moved out is not.

use chrono::NaiveDate;
use shared::{Activity, ActivityKind};

use super::schedule_evaluator;
use super::store_view::StoreView;

/// Containers nested deeper than this are treated as empty
pub const MAX_CONTAINER_DEPTH: usize = 4;

/// Derived status of a container on one day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerDayStatus {
    pub scheduled: bool,
    pub completed: bool,
    pub skipped: bool,
}

/// State of one member activity on one day, as seen by its container
#[derive(Debug, Clone, Copy, Default)]
struct MemberState {
    due: bool,
    completed: bool,
    skipped: bool,
}

/// Activities treated as children of `container` when evaluating `date`
pub fn children_as_of<'a>(container: &Activity, date: NaiveDate, all_activities: &'a [Activity]) -> Vec<&'a Activity> {
    all_activities
        .iter()
        .filter(|activity| activity.id != container.id)
        .filter(|activity| activity.parent_id.as_deref() == Some(container.id.as_str()))
        .filter(|activity| activity.created_date <= date)
        .filter(|activity| activity.stopped_at.map_or(true, |stopped_at| stopped_at > date))
        .collect()
}

/// Scheduled, completed and skipped status of `container` on `date`.
///
/// The container's own exemptions (vacation, lifetime) are applied by the
/// caller. An empty child set is never scheduled, completed or skipped.
pub fn container_day_status(container: &Activity, date: NaiveDate, view: &StoreView) -> ContainerDayStatus {
    container_day_status_at_depth(container, date, view, 0)
}

fn container_day_status_at_depth(
    container: &Activity,
    date: NaiveDate,
    view: &StoreView,
    depth: usize,
) -> ContainerDayStatus {
    if depth >= MAX_CONTAINER_DEPTH {
        return ContainerDayStatus::default();
    }

    let members: Vec<MemberState> = children_as_of(container, date, view.activities())
        .into_iter()
        .map(|child| member_state(child, date, view, depth + 1))
        .collect();

    if members.is_empty() {
        return ContainerDayStatus::default();
    }

    let scheduled = members.iter().any(|member| member.due);
    let completed = members.iter().all(|member| member.completed);
    let skipped = !completed && members.iter().all(|member| member.skipped);

    ContainerDayStatus {
        scheduled,
        completed,
        skipped,
    }
}

fn member_state(child: &Activity, date: NaiveDate, view: &StoreView, depth: usize) -> MemberState {
    if schedule_evaluator::exemption(child, date, view.is_vacation(date)).is_some() {
        return MemberState::default();
    }

    let config = view.resolve(child, date);
    match config.kind {
        ActivityKind::Container => {
            let nested = container_day_status_at_depth(child, date, view, depth);
            MemberState {
                due: nested.scheduled,
                completed: nested.completed,
                skipped: nested.skipped,
            }
        }
        ActivityKind::Checkbox | ActivityKind::Value | ActivityKind::Cumulative | ActivityKind::Metric => {
            let log = view.log_for(&child.id, date);
            MemberState {
                due: schedule_evaluator::is_due(&config.schedule, date),
                completed: log.map_or(false, |log| log.is_completed()),
                skipped: log.map_or(false, |log| !log.is_completed()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use shared::{ActivityLog, Schedule, VacationDay};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn container() -> Activity {
        Activity::new("activity::c", "Evening", ActivityKind::Container, Schedule::daily(), date(2024, 1, 1))
    }

    fn child(id: &str, schedule: Schedule, created: NaiveDate) -> Activity {
        let mut activity = Activity::new(id, id, ActivityKind::Checkbox, schedule, created);
        activity.parent_id = Some("activity::c".to_string());
        activity
    }

    fn view_with(activities: Vec<Activity>, logs: Vec<ActivityLog>) -> StoreView {
        StoreView::new(activities, Vec::new(), logs, Vec::new())
    }

    #[test]
    fn test_children_filtered_by_lifetime_and_parent() {
        let mut stopped = child("activity::stopped", Schedule::daily(), date(2024, 1, 1));
        stopped.stopped_at = Some(date(2024, 1, 10));
        let late = child("activity::late", Schedule::daily(), date(2024, 1, 15));
        let mut elsewhere = child("activity::elsewhere", Schedule::daily(), date(2024, 1, 1));
        elsewhere.parent_id = Some("activity::other".to_string());
        let current = child("activity::x", Schedule::daily(), date(2024, 1, 1));

        let all = vec![container(), stopped, late, elsewhere, current];

        let ids = |d: NaiveDate| -> Vec<String> {
            children_as_of(&all[0], d, &all).iter().map(|a| a.id.clone()).collect()
        };

        assert_eq!(ids(date(2024, 1, 5)), vec!["activity::stopped", "activity::x"]);
        // Stopped on the 10th: no longer a member that day
        assert_eq!(ids(date(2024, 1, 10)), vec!["activity::x"]);
        assert_eq!(ids(date(2024, 1, 15)), vec!["activity::late", "activity::x"]);
    }

    #[test]
    fn test_completion_requires_every_child() {
        let d = date(2024, 1, 5);
        let x = child("activity::x", Schedule::daily(), date(2024, 1, 1));
        let y = child("activity::y", Schedule::daily(), date(2024, 1, 1));

        let partial = view_with(
            vec![container(), x.clone(), y.clone()],
            vec![ActivityLog::completed("activity::x", d)],
        );
        let status = container_day_status(&container(), d, &partial);
        assert!(status.scheduled);
        assert!(!status.completed);
        assert!(!status.skipped);

        let full = view_with(
            vec![container(), x, y],
            vec![
                ActivityLog::completed("activity::x", d),
                ActivityLog::completed("activity::y", d),
            ],
        );
        let status = container_day_status(&container(), d, &full);
        assert!(status.scheduled);
        assert!(status.completed);
    }

    #[test]
    fn test_skipped_requires_every_child_skipped() {
        let d = date(2024, 1, 5);
        let x = child("activity::x", Schedule::daily(), date(2024, 1, 1));
        let y = child("activity::y", Schedule::daily(), date(2024, 1, 1));

        let view = view_with(
            vec![container(), x.clone(), y.clone()],
            vec![ActivityLog::skipped("activity::x", d), ActivityLog::skipped("activity::y", d)],
        );
        assert!(container_day_status(&container(), d, &view).skipped);

        let mixed = view_with(
            vec![container(), x, y],
            vec![ActivityLog::skipped("activity::x", d), ActivityLog::completed("activity::y", d)],
        );
        let status = container_day_status(&container(), d, &mixed);
        assert!(!status.skipped);
        assert!(!status.completed);
    }

    #[test]
    fn test_empty_child_set_is_never_due() {
        let view = view_with(vec![container()], Vec::new());
        assert_eq!(container_day_status(&container(), date(2024, 1, 5), &view), ContainerDayStatus::default());
    }

    #[test]
    fn test_not_scheduled_when_no_child_is_due() {
        // 2024-01-02 is a Tuesday
        let x = child("activity::x", Schedule::weekly(vec![Weekday::Mon]), date(2024, 1, 1));
        let view = view_with(vec![container(), x], Vec::new());

        assert!(!container_day_status(&container(), date(2024, 1, 2), &view).scheduled);
        assert!(container_day_status(&container(), date(2024, 1, 8), &view).scheduled);
    }

    #[test]
    fn test_vacation_exempts_children() {
        let d = date(2024, 1, 5);
        let x = child("activity::x", Schedule::daily(), date(2024, 1, 1));
        let view = StoreView::new(vec![container(), x], Vec::new(), Vec::new(), vec![VacationDay::new(d)]);
        assert!(!container_day_status(&container(), d, &view).scheduled);
    }

    #[test]
    fn test_self_parented_container_is_bounded() {
        let mut looping = container();
        looping.parent_id = Some(looping.id.clone());
        let mut inner = Activity::new("activity::inner", "Inner", ActivityKind::Container, Schedule::daily(), date(2024, 1, 1));
        inner.parent_id = Some("activity::c".to_string());
        let mut back = container();
        back.id = "activity::back".to_string();
        back.parent_id = Some("activity::inner".to_string());

        let view = view_with(vec![looping.clone(), inner, back], Vec::new());
        let status = container_day_status(&looping, date(2024, 1, 5), &view);
        assert!(!status.scheduled);
    }
}
