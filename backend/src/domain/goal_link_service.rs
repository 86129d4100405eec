//! Goal link validation.
//!
//! A goal must not count the same work twice. A habit link to a container
//! already covers every child of that container, so a child cannot also be
//! linked as a habit while its container is, and the reverse. Metrics read
//! numeric logs, which containers never have.

use anyhow::Result;
use log::info;
use shared::{Activity, Goal, GoalActivity, GoalRole};
use std::sync::Arc;

use crate::domain::commands::goal::LinkActivityCommand;
use crate::domain::models::GoalLinkError;
use crate::storage::{ActivityStorage, Connection, GoalStorage};

fn same_role(a: &GoalActivity, b: &GoalActivity) -> bool {
    a.is_habit() == b.is_habit()
}

/// Check that `link` can be added to `goal`
pub fn validate_link(goal: &Goal, link: &GoalActivity, activities: &[Activity]) -> Result<(), GoalLinkError> {
    let activity = activities
        .iter()
        .find(|activity| activity.id == link.activity_id)
        .ok_or_else(|| GoalLinkError::ActivityNotFound(link.activity_id.clone()))?;

    if goal
        .links
        .iter()
        .any(|existing| existing.activity_id == link.activity_id && same_role(existing, link))
    {
        return Err(GoalLinkError::AlreadyLinked(link.activity_id.clone()));
    }

    match &link.role {
        GoalRole::Metric { .. } => {
            if activity.is_container() {
                return Err(GoalLinkError::MetricOnContainer(activity.id.clone()));
            }
        }
        GoalRole::Habit { weight } => {
            if !(*weight > 0.0) {
                return Err(GoalLinkError::NonPositiveWeight);
            }

            if let Some(parent_id) = &activity.parent_id {
                if goal
                    .habit_links()
                    .any(|existing| &existing.activity_id == parent_id)
                {
                    return Err(GoalLinkError::CoveredByContainer {
                        activity_id: activity.id.clone(),
                        container_id: parent_id.clone(),
                    });
                }
            }

            if activity.is_container() {
                let child_ids: Vec<String> = goal
                    .habit_links()
                    .filter(|existing| {
                        activities.iter().any(|candidate| {
                            candidate.id == existing.activity_id
                                && candidate.parent_id.as_deref() == Some(activity.id.as_str())
                        })
                    })
                    .map(|existing| existing.activity_id.clone())
                    .collect();
                if !child_ids.is_empty() {
                    return Err(GoalLinkError::ChildrenAlreadyLinked {
                        container_id: activity.id.clone(),
                        child_ids,
                    });
                }
            }
        }
    }

    Ok(())
}

/// Adds and removes goal links through storage
pub struct GoalLinkService<C: Connection> {
    activity_repository: C::ActivityRepository,
    goal_repository: C::GoalRepository,
}

impl<C: Connection> GoalLinkService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            activity_repository: connection.create_activity_repository(),
            goal_repository: connection.create_goal_repository(),
        }
    }

    async fn require_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goal_repository
            .get_goal(goal_id)
            .await?
            .ok_or_else(|| GoalLinkError::GoalNotFound(goal_id.to_string()).into())
    }

    pub async fn link_activity(&self, command: LinkActivityCommand) -> Result<Goal> {
        let mut goal = self.require_goal(&command.goal_id).await?;
        let activities = self.activity_repository.list_activities().await?;

        validate_link(&goal, &command.link, &activities)?;

        goal.links.push(command.link.clone());
        self.goal_repository.store_goal(&goal).await?;

        info!("Linked {} to goal {}", command.link.activity_id, goal.id);
        Ok(goal)
    }

    /// Remove every link of `activity_id` from the goal. Returns the updated goal.
    pub async fn unlink_activity(&self, goal_id: &str, activity_id: &str) -> Result<Goal> {
        let mut goal = self.require_goal(goal_id).await?;

        let before = goal.links.len();
        goal.links.retain(|link| link.activity_id != activity_id);
        if goal.links.len() != before {
            self.goal_repository.store_goal(&goal).await?;
            info!("Unlinked {} from goal {}", activity_id, goal.id);
        }
        Ok(goal)
    }
}
