//! # Goal Repository
//!
//! Stores goals with their links as a YAML list in `goals.yaml`.

use anyhow::Result;
use async_trait::async_trait;
use log::info;
use shared::Goal;

use super::connection::CsvConnection;
use crate::storage::traits::GoalStorage;

const GOALS_FILE: &str = "goals.yaml";

#[derive(Clone)]
pub struct GoalRepository {
    connection: CsvConnection,
}

impl GoalRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_goals(&self) -> Result<Vec<Goal>> {
        self.connection.read_yaml_list(GOALS_FILE)
    }
}

#[async_trait]
impl GoalStorage for GoalRepository {
    async fn store_goal(&self, goal: &Goal) -> Result<()> {
        let _guard = self.connection.lock_writes().await;

        let mut goals = self.read_goals()?;
        match goals.iter_mut().find(|existing| existing.id == goal.id) {
            Some(existing) => *existing = goal.clone(),
            None => goals.push(goal.clone()),
        }
        self.connection.write_yaml_list(GOALS_FILE, &goals)?;

        info!("Stored goal {} with {} links", goal.id, goal.links.len());
        Ok(())
    }

    async fn get_goal(&self, goal_id: &str) -> Result<Option<Goal>> {
        Ok(self.read_goals()?.into_iter().find(|goal| goal.id == goal_id))
    }

    async fn list_goals(&self) -> Result<Vec<Goal>> {
        self.read_goals()
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<bool> {
        let _guard = self.connection.lock_writes().await;

        let mut goals = self.read_goals()?;
        let before = goals.len();
        goals.retain(|goal| goal.id != goal_id);
        if goals.len() == before {
            return Ok(false);
        }

        self.connection.write_yaml_list(GOALS_FILE, &goals)?;
        info!("Deleted goal {}", goal_id);
        Ok(true)
    }
}
