//! Structural changes of activities.
//!
//! Converting a leaf into a container, or dissolving a container back into a
//! leaf, changes how every past day of the activity is evaluated. Before the
//! change is applied the outgoing configuration is archived as a snapshot
//! covering the days since the previous snapshot (or since creation) up to the
//! day before the change. Successive changes therefore produce contiguous,
//! non-overlapping ranges.
//!
//! The pure functions here compute the new state; `StructureService` loads
//! and persists it through the storage traits.

use anyhow::Result;
use chrono::NaiveDate;
use log::info;
use shared::{Activity, ActivityConfigSnapshot, ActivityKind};
use std::sync::Arc;

use crate::domain::commands::structure::{
    ConvertToContainerCommand, DeleteActivityCommand, DissolveContainerCommand, MoveIntoContainerCommand,
    StopActivityCommand, StructureChangeResult,
};
use crate::domain::config_resolver::last_snapshot_until;
use crate::domain::models::{ChildDisposition, StructureChangeError};
use crate::storage::{ActivityStorage, Connection, LogStorage, SnapshotStorage};

/// Range to archive when `activity` changes structure on `change_date`, or
/// `None` when the outgoing configuration was never in effect.
fn archived_range(
    activity: &Activity,
    existing_snapshots: &[ActivityConfigSnapshot],
    change_date: NaiveDate,
) -> Result<Option<(NaiveDate, NaiveDate)>, StructureChangeError> {
    if change_date < activity.created_date {
        return Err(StructureChangeError::BeforeCreation {
            change_date,
            created_date: activity.created_date,
        });
    }

    let last_until = last_snapshot_until(
        existing_snapshots
            .iter()
            .filter(|snapshot| snapshot.activity_id == activity.id),
    );
    if let Some(last_until) = last_until {
        if change_date <= last_until {
            return Err(StructureChangeError::OverlapsHistory {
                change_date,
                last_until,
            });
        }
    }

    let from = match last_until {
        Some(last_until) => last_until.succ_opt(),
        None => Some(activity.created_date),
    };
    match (from, change_date.pred_opt()) {
        (Some(from), Some(until)) if from <= until => Ok(Some((from, until))),
        _ => Ok(None),
    }
}

fn archive(
    activity: &Activity,
    existing_snapshots: &[ActivityConfigSnapshot],
    change_date: NaiveDate,
) -> Result<Option<ActivityConfigSnapshot>, StructureChangeError> {
    Ok(archived_range(activity, existing_snapshots, change_date)?
        .map(|(from, until)| ActivityConfigSnapshot::capture(&activity.id, from, until, activity.current_config())))
}

/// Detach `children` from their container
fn detach_children(children: &[Activity], disposition: ChildDisposition, change_date: NaiveDate) -> Vec<Activity> {
    let last_day = change_date.pred_opt().unwrap_or(change_date);
    children
        .iter()
        .map(|child| {
            let mut child = child.clone();
            child.parent_id = None;
            if disposition == ChildDisposition::Stop {
                // An earlier stop date stays
                child.stopped_at = Some(child.stopped_at.map_or(last_day, |stopped_at| stopped_at.min(last_day)));
            }
            child
        })
        .collect()
}

/// Turn a leaf into a container from `change_date` on.
///
/// Kind-specific fields are cleared; containers carry no target, unit or
/// metric kind.
pub fn convert_to_container(
    activity: &Activity,
    existing_snapshots: &[ActivityConfigSnapshot],
    change_date: NaiveDate,
) -> Result<StructureChangeResult, StructureChangeError> {
    if activity.is_container() {
        return Err(StructureChangeError::AlreadyContainer(activity.id.clone()));
    }
    if activity.parent_id.is_some() {
        return Err(StructureChangeError::NestedContainer(activity.id.clone()));
    }

    let snapshot = archive(activity, existing_snapshots, change_date)?;

    let mut updated = activity.clone();
    updated.kind = ActivityKind::Container;
    updated.metric_kind = None;
    updated.target_value = None;
    updated.unit = None;

    Ok(StructureChangeResult {
        activity: updated,
        snapshot,
        updated_children: Vec::new(),
    })
}

/// Turn a container back into a leaf from `change_date` on.
///
/// `children` may contain unrelated activities; only those whose parent is
/// the container are detached.
pub fn dissolve_container(
    container: &Activity,
    existing_snapshots: &[ActivityConfigSnapshot],
    children: &[Activity],
    command: &DissolveContainerCommand,
) -> Result<StructureChangeResult, StructureChangeError> {
    if !container.is_container() {
        return Err(StructureChangeError::NotContainer(container.id.clone()));
    }
    if command.new_kind.is_container() {
        return Err(StructureChangeError::DissolveIntoContainer);
    }

    let snapshot = archive(container, existing_snapshots, command.change_date)?;

    let mut updated = container.clone();
    updated.kind = command.new_kind;
    updated.schedule = command.new_schedule.clone();
    updated.metric_kind = command.metric_kind;
    updated.target_value = command.target_value;
    updated.unit = command.unit.clone();

    let own_children: Vec<Activity> = children
        .iter()
        .filter(|child| child.parent_id.as_deref() == Some(container.id.as_str()))
        .cloned()
        .collect();

    Ok(StructureChangeResult {
        activity: updated,
        snapshot,
        updated_children: detach_children(&own_children, command.child_disposition, command.change_date),
    })
}

/// Attach a leaf to a container. Only leaves can be members.
pub fn move_into_container(activity: &Activity, container: &Activity) -> Result<Activity, StructureChangeError> {
    if !container.is_container() {
        return Err(StructureChangeError::NotContainer(container.id.clone()));
    }
    if activity.is_container() || activity.id == container.id {
        return Err(StructureChangeError::NestedContainer(activity.id.clone()));
    }

    let mut updated = activity.clone();
    updated.parent_id = Some(container.id.clone());
    Ok(updated)
}

/// Mark `stopped_at` as the last active day of the activity
pub fn stop_activity(activity: &Activity, stopped_at: NaiveDate) -> Result<Activity, StructureChangeError> {
    if stopped_at < activity.created_date {
        return Err(StructureChangeError::BeforeCreation {
            change_date: stopped_at,
            created_date: activity.created_date,
        });
    }

    let mut updated = activity.clone();
    updated.stopped_at = Some(stopped_at);
    Ok(updated)
}

/// Applies structural changes through storage
pub struct StructureService<C: Connection> {
    activity_repository: C::ActivityRepository,
    snapshot_repository: C::SnapshotRepository,
    log_repository: C::LogRepository,
}

impl<C: Connection> StructureService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            activity_repository: connection.create_activity_repository(),
            snapshot_repository: connection.create_snapshot_repository(),
            log_repository: connection.create_log_repository(),
        }
    }

    async fn require_activity(&self, activity_id: &str) -> Result<Activity> {
        self.activity_repository
            .get_activity(activity_id)
            .await?
            .ok_or_else(|| StructureChangeError::ActivityNotFound(activity_id.to_string()).into())
    }

    pub async fn convert_to_container(&self, command: ConvertToContainerCommand) -> Result<StructureChangeResult> {
        info!("Converting {} to a container on {}", command.activity_id, command.change_date);

        let activity = self.require_activity(&command.activity_id).await?;
        let snapshots = self.snapshot_repository.list_snapshots_for(&activity.id).await?;
        let result = convert_to_container(&activity, &snapshots, command.change_date)?;

        if let Some(snapshot) = &result.snapshot {
            self.snapshot_repository.append_snapshot(snapshot).await?;
        }
        self.activity_repository.store_activity(&result.activity).await?;

        Ok(result)
    }

    pub async fn dissolve_container(&self, command: DissolveContainerCommand) -> Result<StructureChangeResult> {
        info!(
            "Dissolving container {} into {} on {}",
            command.activity_id, command.new_kind, command.change_date
        );

        let container = self.require_activity(&command.activity_id).await?;
        let snapshots = self.snapshot_repository.list_snapshots_for(&container.id).await?;
        let children = self.activity_repository.list_children(&container.id).await?;
        let result = dissolve_container(&container, &snapshots, &children, &command)?;

        if let Some(snapshot) = &result.snapshot {
            self.snapshot_repository.append_snapshot(snapshot).await?;
        }
        let mut changed = vec![result.activity.clone()];
        changed.extend(result.updated_children.iter().cloned());
        self.activity_repository.store_activities(&changed).await?;

        info!(
            "Container {} dissolved, {} children detached",
            container.id,
            result.updated_children.len()
        );
        Ok(result)
    }

    pub async fn move_into_container(&self, command: MoveIntoContainerCommand) -> Result<Activity> {
        let activity = self.require_activity(&command.activity_id).await?;
        let container = self.require_activity(&command.container_id).await?;

        let updated = move_into_container(&activity, &container)?;
        self.activity_repository.store_activity(&updated).await?;

        info!("Moved {} into container {}", updated.id, container.id);
        Ok(updated)
    }

    pub async fn stop_activity(&self, command: StopActivityCommand) -> Result<Activity> {
        let activity = self.require_activity(&command.activity_id).await?;

        let updated = stop_activity(&activity, command.stopped_at)?;
        self.activity_repository.store_activity(&updated).await?;

        info!("Stopped {} after {}", updated.id, command.stopped_at);
        Ok(updated)
    }

    /// Delete the activity, its logs and its snapshots. Children of a deleted
    /// container are detached according to the disposition.
    pub async fn delete_activity(&self, command: DeleteActivityCommand) -> Result<Vec<Activity>> {
        let activity = self.require_activity(&command.activity_id).await?;

        let children = self.activity_repository.list_children(&activity.id).await?;
        let detached = detach_children(&children, command.child_disposition, command.deleted_on);
        self.activity_repository.store_activities(&detached).await?;

        let logs = self.log_repository.delete_logs_for(&activity.id).await?;
        let snapshots = self.snapshot_repository.delete_snapshots_for(&activity.id).await?;
        self.activity_repository.delete_activity(&activity.id).await?;

        info!(
            "Deleted {} with {} logs, {} snapshots, {} children detached",
            activity.id,
            logs,
            snapshots,
            detached.len()
        );
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::completion_rate::{rate, CompletionRate};
    use crate::domain::store_view::StoreView;
    use crate::storage::csv::test_utils::{date, RepositoryTestHelper};
    use crate::storage::csv::CsvConnection;
    use shared::{ActivityLog, MetricKind, Schedule};

    fn leaf(id: &str) -> Activity {
        let mut activity = Activity::new(id, "Morning routine", ActivityKind::Value, Schedule::daily(), date(2024, 1, 1));
        activity.target_value = Some(20.0);
        activity.unit = Some("min".to_string());
        activity
    }

    fn dissolve_command(id: &str, change_date: NaiveDate, disposition: ChildDisposition) -> DissolveContainerCommand {
        DissolveContainerCommand {
            activity_id: id.to_string(),
            change_date,
            new_kind: ActivityKind::Checkbox,
            new_schedule: Schedule::daily(),
            metric_kind: None,
            target_value: None,
            unit: None,
            child_disposition: disposition,
        }
    }

    fn child_of(id: &str, container_id: &str) -> Activity {
        let mut child = Activity::new(id, id, ActivityKind::Checkbox, Schedule::daily(), date(2024, 1, 1));
        child.parent_id = Some(container_id.to_string());
        child
    }

    #[test]
    fn test_convert_archives_previous_config() {
        let activity = leaf("activity::1");
        let result = convert_to_container(&activity, &[], date(2024, 2, 1)).unwrap();

        assert_eq!(result.activity.kind, ActivityKind::Container);
        assert_eq!(result.activity.target_value, None);
        assert_eq!(result.activity.unit, None);

        let snapshot = result.snapshot.unwrap();
        assert_eq!(snapshot.effective_from, date(2024, 1, 1));
        assert_eq!(snapshot.effective_until, date(2024, 1, 31));
        assert_eq!(snapshot.kind, ActivityKind::Value);
        assert_eq!(snapshot.target_value, Some(20.0));
    }

    #[test]
    fn test_convert_on_creation_day_has_no_snapshot() {
        let result = convert_to_container(&leaf("activity::1"), &[], date(2024, 1, 1)).unwrap();
        assert!(result.snapshot.is_none());
        assert!(result.activity.is_container());
    }

    #[test]
    fn test_convert_rejections() {
        let activity = leaf("activity::1");
        assert_eq!(
            convert_to_container(&activity, &[], date(2023, 12, 31)),
            Err(StructureChangeError::BeforeCreation {
                change_date: date(2023, 12, 31),
                created_date: date(2024, 1, 1),
            })
        );

        let container = convert_to_container(&activity, &[], date(2024, 2, 1)).unwrap().activity;
        assert_eq!(
            convert_to_container(&container, &[], date(2024, 3, 1)),
            Err(StructureChangeError::AlreadyContainer("activity::1".to_string()))
        );

        let nested = child_of("activity::2", "activity::c");
        assert_eq!(
            convert_to_container(&nested, &[], date(2024, 3, 1)),
            Err(StructureChangeError::NestedContainer("activity::2".to_string()))
        );
    }

    #[test]
    fn test_round_trip_ranges_are_contiguous() {
        let activity = leaf("activity::1");
        let converted = convert_to_container(&activity, &[], date(2024, 2, 1)).unwrap();
        let first = converted.snapshot.clone().unwrap();

        let dissolved = dissolve_container(
            &converted.activity,
            &[first.clone()],
            &[],
            &dissolve_command("activity::1", date(2024, 3, 1), ChildDisposition::MakeTopLevel),
        )
        .unwrap();
        let second = dissolved.snapshot.unwrap();

        assert_eq!((first.effective_from, first.effective_until), (date(2024, 1, 1), date(2024, 1, 31)));
        assert_eq!((second.effective_from, second.effective_until), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(second.kind, ActivityKind::Container);
        assert!(crate::domain::config_resolver::snapshot_ranges_valid([&first, &second]));
        assert_eq!(dissolved.activity.kind, ActivityKind::Checkbox);
    }

    #[test]
    fn test_change_inside_archived_history_is_rejected() {
        let activity = leaf("activity::1");
        let converted = convert_to_container(&activity, &[], date(2024, 2, 1)).unwrap();
        let snapshots = vec![converted.snapshot.unwrap()];

        let result = dissolve_container(
            &converted.activity,
            &snapshots,
            &[],
            &dissolve_command("activity::1", date(2024, 1, 20), ChildDisposition::MakeTopLevel),
        );
        assert_eq!(
            result,
            Err(StructureChangeError::OverlapsHistory {
                change_date: date(2024, 1, 20),
                last_until: date(2024, 1, 31),
            })
        );
    }

    #[test]
    fn test_dissolve_detaches_children() {
        let mut container = leaf("activity::c");
        container.kind = ActivityKind::Container;
        let mut already_stopped = child_of("activity::y", "activity::c");
        already_stopped.stopped_at = Some(date(2024, 1, 10));
        let children = vec![
            child_of("activity::x", "activity::c"),
            already_stopped,
            child_of("activity::other", "activity::elsewhere"),
        ];

        let stopped = dissolve_container(
            &container,
            &[],
            &children,
            &dissolve_command("activity::c", date(2024, 2, 1), ChildDisposition::Stop),
        )
        .unwrap();
        assert_eq!(stopped.updated_children.len(), 2);
        assert!(stopped.updated_children.iter().all(|child| child.parent_id.is_none()));
        assert_eq!(stopped.updated_children[0].stopped_at, Some(date(2024, 1, 31)));
        assert_eq!(stopped.updated_children[1].stopped_at, Some(date(2024, 1, 10)));

        let kept = dissolve_container(
            &container,
            &[],
            &children,
            &dissolve_command("activity::c", date(2024, 2, 1), ChildDisposition::MakeTopLevel),
        )
        .unwrap();
        assert_eq!(kept.updated_children[0].stopped_at, None);
    }

    #[test]
    fn test_dissolve_rejections() {
        let activity = leaf("activity::1");
        assert_eq!(
            dissolve_container(&activity, &[], &[], &dissolve_command("activity::1", date(2024, 2, 1), ChildDisposition::Stop)),
            Err(StructureChangeError::NotContainer("activity::1".to_string()))
        );

        let mut container = activity.clone();
        container.kind = ActivityKind::Container;
        let mut command = dissolve_command("activity::1", date(2024, 2, 1), ChildDisposition::Stop);
        command.new_kind = ActivityKind::Container;
        assert_eq!(
            dissolve_container(&container, &[], &[], &command),
            Err(StructureChangeError::DissolveIntoContainer)
        );
    }

    #[test]
    fn test_move_and_stop_rules() {
        let mut container = leaf("activity::c");
        container.kind = ActivityKind::Container;
        let activity = leaf("activity::1");

        let moved = move_into_container(&activity, &container).unwrap();
        assert_eq!(moved.parent_id.as_deref(), Some("activity::c"));
        assert!(move_into_container(&activity, &activity).is_err());
        assert!(move_into_container(&container, &container).is_err());

        assert_eq!(stop_activity(&activity, date(2024, 3, 1)).unwrap().stopped_at, Some(date(2024, 3, 1)));
        assert!(stop_activity(&activity, date(2023, 1, 1)).is_err());
    }

    fn service(helper: &RepositoryTestHelper) -> StructureService<CsvConnection> {
        StructureService::new(Arc::new(helper.env.connection.clone()))
    }

    #[tokio::test]
    async fn test_service_round_trip_preserves_history() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        let service = service(&helper);
        helper.create_test_activity("activity::1", ActivityKind::Checkbox).await?;

        service
            .convert_to_container(ConvertToContainerCommand {
                activity_id: "activity::1".to_string(),
                change_date: date(2024, 2, 1),
            })
            .await?;
        let mut command = dissolve_command("activity::1", date(2024, 3, 1), ChildDisposition::MakeTopLevel);
        command.new_kind = ActivityKind::Metric;
        command.metric_kind = Some(MetricKind::Value);
        service.dissolve_container(command).await?;

        let snapshots = helper.snapshot_repo.list_snapshots_for("activity::1").await?;
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].effective_until.succ_opt(), Some(snapshots[1].effective_from));

        let activity = helper.activity_repo.get_activity("activity::1").await?.unwrap();
        assert_eq!(activity.kind, ActivityKind::Metric);

        let view = StoreView::new(vec![activity.clone()], snapshots, Vec::new(), Vec::new());
        assert_eq!(view.resolve(&activity, date(2024, 1, 15)).kind, ActivityKind::Checkbox);
        assert_eq!(view.resolve(&activity, date(2024, 2, 15)).kind, ActivityKind::Container);
        assert_eq!(view.resolve(&activity, date(2024, 3, 15)).kind, ActivityKind::Metric);
        Ok(())
    }

    #[tokio::test]
    async fn test_service_dissolve_persists_children() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        let service = service(&helper);
        helper.create_test_activity("activity::c", ActivityKind::Container).await?;
        helper.create_test_activity("activity::x", ActivityKind::Checkbox).await?;

        service
            .move_into_container(MoveIntoContainerCommand {
                activity_id: "activity::x".to_string(),
                container_id: "activity::c".to_string(),
            })
            .await?;
        assert_eq!(helper.activity_repo.list_children("activity::c").await?.len(), 1);

        let result = service
            .dissolve_container(dissolve_command("activity::c", date(2024, 2, 1), ChildDisposition::Stop))
            .await?;
        assert_eq!(result.updated_children.len(), 1);

        let child = helper.activity_repo.get_activity("activity::x").await?.unwrap();
        assert_eq!(child.parent_id, None);
        assert_eq!(child.stopped_at, Some(date(2024, 1, 31)));
        Ok(())
    }

    #[tokio::test]
    async fn test_service_stop_changes_rate() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        let service = service(&helper);
        helper.create_test_activity("activity::1", ActivityKind::Checkbox).await?;
        helper.log_repo.store_log(&ActivityLog::completed("activity::1", date(2024, 1, 1))).await?;

        let stopped = service
            .stop_activity(StopActivityCommand {
                activity_id: "activity::1".to_string(),
                stopped_at: date(2024, 1, 2),
            })
            .await?;

        let view = StoreView::new(vec![stopped.clone()], Vec::new(), helper.log_repo.list_logs().await?, Vec::new());
        // Due on the 1st and 2nd only
        assert_eq!(rate(&stopped, 14, date(2024, 1, 14), &view), CompletionRate::Rate(0.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_service_delete_cascades() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        let service = service(&helper);
        helper.create_test_activity("activity::c", ActivityKind::Checkbox).await?;
        helper.log_repo.store_log(&ActivityLog::completed("activity::c", date(2024, 1, 3))).await?;
        service
            .convert_to_container(ConvertToContainerCommand {
                activity_id: "activity::c".to_string(),
                change_date: date(2024, 1, 10),
            })
            .await?;
        let mut child = helper.create_test_activity("activity::x", ActivityKind::Checkbox).await?;
        child.parent_id = Some("activity::c".to_string());
        helper.activity_repo.store_activity(&child).await?;

        let detached = service
            .delete_activity(DeleteActivityCommand {
                activity_id: "activity::c".to_string(),
                deleted_on: date(2024, 2, 1),
                child_disposition: ChildDisposition::MakeTopLevel,
            })
            .await?;

        assert_eq!(detached.len(), 1);
        assert!(helper.activity_repo.get_activity("activity::c").await?.is_none());
        assert!(helper.log_repo.list_logs_for("activity::c").await?.is_empty());
        assert!(helper.snapshot_repo.list_snapshots_for("activity::c").await?.is_empty());
        let child = helper.activity_repo.get_activity("activity::x").await?.unwrap();
        assert_eq!(child.parent_id, None);
        assert_eq!(child.stopped_at, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_service_missing_activity() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        let service = service(&helper);

        let err = service
            .convert_to_container(ConvertToContainerCommand {
                activity_id: "activity::missing".to_string(),
                change_date: date(2024, 2, 1),
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<StructureChangeError>(),
            Some(&StructureChangeError::ActivityNotFound("activity::missing".to_string()))
        );
        Ok(())
    }
}
