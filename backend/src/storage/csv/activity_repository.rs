//! # Activity Repository
//!
//! Stores activities as a YAML list in `activities.yaml`.

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, info};
use shared::Activity;

use super::connection::CsvConnection;
use crate::storage::traits::ActivityStorage;

const ACTIVITIES_FILE: &str = "activities.yaml";

#[derive(Clone)]
pub struct ActivityRepository {
    connection: CsvConnection,
}

impl ActivityRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_activities(&self) -> Result<Vec<Activity>> {
        self.connection.read_yaml_list(ACTIVITIES_FILE)
    }

    fn write_activities(&self, activities: &[Activity]) -> Result<()> {
        self.connection.write_yaml_list(ACTIVITIES_FILE, activities)
    }

    fn upsert(activities: &mut Vec<Activity>, activity: &Activity) {
        match activities.iter_mut().find(|existing| existing.id == activity.id) {
            Some(existing) => *existing = activity.clone(),
            None => activities.push(activity.clone()),
        }
    }
}

#[async_trait]
impl ActivityStorage for ActivityRepository {
    async fn store_activity(&self, activity: &Activity) -> Result<()> {
        let _guard = self.connection.lock_writes().await;

        let mut activities = self.read_activities()?;
        Self::upsert(&mut activities, activity);
        self.write_activities(&activities)?;

        info!("Stored activity {} ({})", activity.id, activity.kind);
        Ok(())
    }

    async fn store_activities(&self, batch: &[Activity]) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let _guard = self.connection.lock_writes().await;

        let mut activities = self.read_activities()?;
        for activity in batch {
            Self::upsert(&mut activities, activity);
        }
        self.write_activities(&activities)?;

        info!("Stored {} activities", batch.len());
        Ok(())
    }

    async fn get_activity(&self, activity_id: &str) -> Result<Option<Activity>> {
        let activities = self.read_activities()?;
        Ok(activities.into_iter().find(|activity| activity.id == activity_id))
    }

    async fn list_activities(&self) -> Result<Vec<Activity>> {
        self.read_activities()
    }

    async fn list_children(&self, container_id: &str) -> Result<Vec<Activity>> {
        let children: Vec<Activity> = self
            .read_activities()?
            .into_iter()
            .filter(|activity| activity.parent_id.as_deref() == Some(container_id))
            .collect();
        debug!("Container {} has {} children", container_id, children.len());
        Ok(children)
    }

    async fn delete_activity(&self, activity_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_writes().await;

        let mut activities = self.read_activities()?;
        let before = activities.len();
        activities.retain(|activity| activity.id != activity_id);
        if activities.len() == before {
            return Ok(false);
        }

        self.write_activities(&activities)?;
        info!("Deleted activity {}", activity_id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::{date, RepositoryTestHelper};
    use shared::{ActivityKind, Schedule};

    #[tokio::test]
    async fn test_store_get_and_replace() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        let mut activity = helper.create_test_activity("activity::1", ActivityKind::Checkbox).await?;

        let stored = helper.activity_repo.get_activity("activity::1").await?;
        assert_eq!(stored.as_ref(), Some(&activity));

        activity.name = "Renamed".to_string();
        activity.schedule = Schedule::interval(2, date(2024, 1, 1));
        helper.activity_repo.store_activity(&activity).await?;

        let all = helper.activity_repo.list_activities().await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Renamed");
        assert_eq!(all[0].schedule, Schedule::interval(2, date(2024, 1, 1)));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_children_and_delete() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        helper.create_test_activity("activity::c", ActivityKind::Container).await?;
        let mut child = helper.create_test_activity("activity::x", ActivityKind::Checkbox).await?;
        child.parent_id = Some("activity::c".to_string());
        helper.activity_repo.store_activities(&[child]).await?;

        let children = helper.activity_repo.list_children("activity::c").await?;
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].id, "activity::x");

        assert!(helper.activity_repo.delete_activity("activity::x").await?);
        assert!(!helper.activity_repo.delete_activity("activity::x").await?);
        assert!(helper.activity_repo.list_children("activity::c").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file_lists_nothing() -> Result<()> {
        let helper = RepositoryTestHelper::new().await?;
        assert!(helper.activity_repo.list_activities().await?.is_empty());
        assert!(helper.activity_repo.get_activity("activity::1").await?.is_none());
        Ok(())
    }
}
