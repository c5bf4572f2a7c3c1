use serde::{Deserialize, Serialize};

use super::reading::{ReadingRecord, format_clock, format_timestamp};

/// Store-wide statistics. Every field is `None` while the store is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AggregateStats {
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
    pub avg_temperature: Option<f64>,
    pub min_humidity: Option<f64>,
    pub max_humidity: Option<f64>,
    pub avg_humidity: Option<f64>,
}

/// The most recent readings, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecentWindow {
    records: Vec<ReadingRecord>,
}

impl RecentWindow {
    pub const DEFAULT_SIZE: usize = 10;

    /// Orders `records` by arrival and keeps the newest `size` of them,
    /// whatever order the store returned them in.
    pub fn new(mut records: Vec<ReadingRecord>, size: usize) -> Self {
        records.sort_by_key(|record| record.id);

        if records.len() > size {
            records.drain(..records.len() - size);
        }

        Self { records }
    }

    pub fn records(&self) -> &[ReadingRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn latest(&self) -> Option<&ReadingRecord> {
        self.records.last()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.temperature).collect()
    }

    pub fn humidities(&self) -> Vec<f64> {
        self.records.iter().map(|record| record.humidity).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.records.iter().map(|record| format_clock(record.time)).collect()
    }

    /// `<timestamp> | <temperature>°C | <humidity>%` of the newest entry.
    pub fn latest_summary(&self) -> Option<String> {
        self.latest().map(|record| {
            format!(
                "{} | {:.1}°C | {:.1}%",
                format_timestamp(record.time),
                record.temperature,
                record.humidity
            )
        })
    }
}
