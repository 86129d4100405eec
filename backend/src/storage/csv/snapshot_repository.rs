//! # Snapshot Repository
//!
//! Append-only store of activity config snapshots in `snapshots.yaml`.
//! An append that would leave an activity with an empty or overlapping range
//! is rejected, so the resolver never has to pick between two snapshots.

use anyhow::Result;
use async_trait::async_trait;
use log::{info, warn};
use shared::ActivityConfigSnapshot;

use super::connection::CsvConnection;
use crate::domain::config_resolver::snapshot_ranges_valid;
use crate::storage::traits::SnapshotStorage;

const SNAPSHOTS_FILE: &str = "snapshots.yaml";

#[derive(Clone)]
pub struct SnapshotRepository {
    connection: CsvConnection,
}

impl SnapshotRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_snapshots(&self) -> Result<Vec<ActivityConfigSnapshot>> {
        self.connection.read_yaml_list(SNAPSHOTS_FILE)
    }
}

#[async_trait]
impl SnapshotStorage for SnapshotRepository {
    async fn append_snapshot(&self, snapshot: &ActivityConfigSnapshot) -> Result<()> {
        let _guard = self.connection.lock_writes().await;

        let mut snapshots = self.read_snapshots()?;
        let candidate = snapshots
            .iter()
            .filter(|existing| existing.activity_id == snapshot.activity_id)
            .chain(std::iter::once(snapshot));
        if !snapshot_ranges_valid(candidate) {
            warn!(
                "Rejected snapshot {} for activity {}: range {}..={} is empty or overlaps",
                snapshot.id, snapshot.activity_id, snapshot.effective_from, snapshot.effective_until
            );
            return Err(anyhow::anyhow!(
                "Snapshot range {}..={} for activity {} is empty or overlaps existing history",
                snapshot.effective_from,
                snapshot.effective_until,
                snapshot.activity_id
            ));
        }

        snapshots.push(snapshot.clone());
        self.connection.write_yaml_list(SNAPSHOTS_FILE, &snapshots)?;

        info!(
            "Archived {} config of activity {} for {}..={}",
            snapshot.kind, snapshot.activity_id, snapshot.effective_from, snapshot.effective_until
        );
        Ok(())
    }

    async fn list_snapshots_for(&self, activity_id: &str) -> Result<Vec<ActivityConfigSnapshot>> {
        let mut snapshots: Vec<ActivityConfigSnapshot> = self
            .read_snapshots()?
            .into_iter()
            .filter(|snapshot| snapshot.activity_id == activity_id)
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.effective_from);
        Ok(snapshots)
    }

    async fn list_snapshots(&self) -> Result<Vec<ActivityConfigSnapshot>> {
        self.read_snapshots()
    }

    async fn delete_snapshots_for(&self, activity_id: &str) -> Result<usize> {
        let _guard = self.connection.lock_writes().await;

        let mut snapshots = self.read_snapshots()?;
        let before = snapshots.len();
        snapshots.retain(|snapshot| snapshot.activity_id != activity_id);
        let removed = before - snapshots.len();

        if removed > 0 {
            self.connection.write_yaml_list(SNAPSHOTS_FILE, &snapshots)?;
            info!("Deleted {} snapshots of activity {}", removed, activity_id);
        }
        Ok(removed)
    }
}
