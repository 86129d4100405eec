//! # Vacation Repository
//!
//! Stores vacation days in `vacation_days.csv` with columns `date,note`.
//! A vacation day is global: it exempts every activity on that date.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{Reader, Writer};
use log::info;
use shared::VacationDay;

use super::connection::CsvConnection;
use crate::storage::traits::VacationStorage;

const VACATION_FILE: &str = "vacation_days.csv";

#[derive(Clone)]
pub struct VacationRepository {
    connection: CsvConnection,
}

impl VacationRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn read_days(&self) -> Result<Vec<VacationDay>> {
        let file_path = self.connection.file_path(VACATION_FILE);
        if !file_path.exists() {
            return Ok(Vec::new());
        }

        let mut csv_reader = Reader::from_path(&file_path)?;
        let mut days = Vec::new();
        for result in csv_reader.deserialize() {
            let day: VacationDay = result
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", file_path.display(), e))?;
            days.push(day);
        }
        Ok(days)
    }

    fn write_days(&self, days: &[VacationDay]) -> Result<()> {
        let mut csv_writer = Writer::from_writer(Vec::new());
        for day in days {
            csv_writer.serialize(day)?;
        }
        let content = csv_writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush vacation rows: {}", e))?;
        self.connection.write_atomic(VACATION_FILE, &content)
    }
}

#[async_trait]
impl VacationStorage for VacationRepository {
    async fn add_vacation_day(&self, day: &VacationDay) -> Result<()> {
        let _guard = self.connection.lock_writes().await;

        let mut days = self.read_days()?;
        days.retain(|existing| existing.date != day.date);
        days.push(day.clone());
        days.sort_by_key(|existing| existing.date);
        self.write_days(&days)?;

        info!("Marked {} as vacation", day.date);
        Ok(())
    }

    async fn remove_vacation_day(&self, date: NaiveDate) -> Result<bool> {
        let _guard = self.connection.lock_writes().await;

        let mut days = self.read_days()?;
        let before = days.len();
        days.retain(|existing| existing.date != date);
        if days.len() == before {
            return Ok(false);
        }

        self.write_days(&days)?;
        info!("Removed vacation day {}", date);
        Ok(true)
    }

    async fn list_vacation_days(&self) -> Result<Vec<VacationDay>> {
        let mut days = self.read_days()?;
        days.sort_by_key(|day| day.date);
        Ok(days)
    }
}
