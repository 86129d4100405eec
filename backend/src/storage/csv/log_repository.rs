//! # Log Repository
//!
//! Stores activity logs in `logs.csv`, one row per activity and day.
//!
//! ## CSV Format
//!
//! ```text
//! activity_id,date,status,value,media_ref
//! activity::1702516122000,2024-01-05,completed,12.5,
//! activity::1702516122000,2024-01-06,skipped,,
//! ```

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, Writer};
use log::{debug, info, warn};
use shared::{ActivityLog, LogStatus};
use std::fs::File;
use std::io::BufReader;

use super::connection::CsvConnection;
use crate::storage::traits::LogStorage;

const LOGS_FILE: &str = "logs.csv";
const HEADER: [&str; 5] = ["activity_id", "date", "status", "value", "media_ref"];

#[derive(Clone)]
pub struct LogRepository {
    connection: CsvConnection,
}

impl LogRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read every log row. A missing file holds no logs.
    fn read_logs(&self) -> Result<Vec<ActivityLog>> {
        let file_path = self.connection.file_path(LOGS_FILE);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&file_path)?;
        let mut csv_reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(BufReader::new(file));

        let mut logs = Vec::new();
        for (index, result) in csv_reader.records().enumerate() {
            let record = result?;
            match Self::parse_record(&record) {
                Ok(log) => logs.push(log),
                // Row 1 is the header
                Err(e) => warn!("Skipping malformed row {} in {}: {}", index + 2, LOGS_FILE, e),
            }
        }

        debug!("Loaded {} logs", logs.len());
        Ok(logs)
    }

    fn parse_record(record: &csv::StringRecord) -> Result<ActivityLog> {
        let field = |index: usize| record.get(index).unwrap_or("").trim();

        let activity_id = field(0);
        if activity_id.is_empty() {
            return Err(anyhow::anyhow!("missing activity_id"));
        }
        let date = NaiveDate::parse_from_str(field(1), "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("invalid date '{}': {}", field(1), e))?;
        let status = LogStatus::from_string(field(2)).map_err(|e| anyhow::anyhow!(e))?;
        let value = match field(3) {
            "" => None,
            raw => {
                let value = raw
                    .parse::<f64>()
                    .map_err(|e| anyhow::anyhow!("invalid value '{}': {}", raw, e))?;
                if !value.is_finite() {
                    return Err(anyhow::anyhow!("non-finite value '{}'", raw));
                }
                Some(value)
            }
        };
        let media_ref = match field(4) {
            "" => None,
            raw => Some(raw.to_string()),
        };

        Ok(ActivityLog {
            activity_id: activity_id.to_string(),
            date,
            status,
            value,
            media_ref,
        })
    }

    fn write_logs(&self, logs: &[ActivityLog]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        csv_writer.write_record(HEADER)?;

        for log in logs {
            csv_writer.write_record([
                log.activity_id.clone(),
                log.date.format("%Y-%m-%d").to_string(),
                log.status.to_string(),
                log.value.map(|value| value.to_string()).unwrap_or_default(),
                log.media_ref.clone().unwrap_or_default(),
            ])?;
        }

        let content = csv_writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush log rows: {}", e))?;
        self.connection.write_atomic(LOGS_FILE, &content)
    }
}

#[async_trait]
impl LogStorage for LogRepository {
    async fn store_log(&self, log: &ActivityLog) -> Result<()> {
        if let Some(value) = log.value.filter(|value| !value.is_finite()) {
            return Err(anyhow::anyhow!("Log value must be finite, got {}", value));
        }
        let _guard = self.connection.lock_writes().await;

        let mut logs = self.read_logs()?;
        match logs
            .iter_mut()
            .find(|existing| existing.activity_id == log.activity_id && existing.date == log.date)
        {
            Some(existing) => *existing = log.clone(),
            None => logs.push(log.clone()),
        }
        self.write_logs(&logs)?;

        info!("Logged {} for {} on {}", log.status, log.activity_id, log.date);
        Ok(())
    }

    async fn get_log(&self, activity_id: &str, date: NaiveDate) -> Result<Option<ActivityLog>> {
        // Last row wins if the file was edited by hand
        Ok(self
            .read_logs()?
            .into_iter()
            .filter(|log| log.activity_id == activity_id && log.date == date)
            .last())
    }

    async fn list_logs_for(&self, activity_id: &str) -> Result<Vec<ActivityLog>> {
        let mut logs: Vec<ActivityLog> = self
            .read_logs()?
            .into_iter()
            .filter(|log| log.activity_id == activity_id)
            .collect();
        logs.sort_by_key(|log| log.date);
        Ok(logs)
    }

    async fn list_logs(&self) -> Result<Vec<ActivityLog>> {
        self.read_logs()
    }

    async fn delete_log(&self, activity_id: &str, date: NaiveDate) -> Result<bool> {
        let _guard = self.connection.lock_writes().await;

        let mut logs = self.read_logs()?;
        let before = logs.len();
        logs.retain(|log| !(log.activity_id == activity_id && log.date == date));
        if logs.len() == before {
            return Ok(false);
        }

        self.write_logs(&logs)?;
        info!("Deleted log of {} on {}", activity_id, date);
        Ok(true)
    }

    async fn delete_logs_for(&self, activity_id: &str) -> Result<usize> {
        let _guard = self.connection.lock_writes().await;

        let mut logs = self.read_logs()?;
        let before = logs.len();
        logs.retain(|log| log.activity_id != activity_id);
        let removed = before - logs.len();

        if removed > 0 {
            self.write_logs(&logs)?;
            info!("Deleted {} logs of activity {}", removed, activity_id);
        }
        Ok(removed)
    }
}
