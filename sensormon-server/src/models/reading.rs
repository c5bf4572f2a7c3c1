use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use super::Table;

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const CLOCK_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");

/// One sample as received, stamped by the server.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Receipt time
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    /// Temperature in Celsius
    pub temperature: f64,
    /// Relative humidity %
    pub humidity: f64,
}

/// A persisted reading. `id` follows arrival order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ReadingRecord {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub temperature: f64,
    pub humidity: f64,
}

#[derive(Clone)]
pub struct ReadingTable;

impl Table for ReadingTable {
    fn name(&self) -> &'static str {
        "readings"
    }

    fn create(&self) -> String {
        String::from(
            r#"
            CREATE TABLE IF NOT EXISTS readings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                time TIMESTAMP NOT NULL,
                temperature REAL NOT NULL,
                humidity REAL NOT NULL
            );
            "#,
        )
    }

    fn dispose(&self) -> String {
        String::from("DROP TABLE IF EXISTS readings;")
    }
}

/// Wall clock in the local offset, falling back to UTC when the offset
/// cannot be determined.
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `yyyy-MM-dd HH:mm:ss`
pub fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| time.to_string())
}

/// `HH:mm:ss`
pub fn format_clock(time: OffsetDateTime) -> String {
    time.format(CLOCK_FORMAT).unwrap_or_else(|_| time.to_string())
}
