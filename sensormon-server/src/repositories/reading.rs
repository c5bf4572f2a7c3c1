use std::sync::Arc;

use async_trait::async_trait;

use crate::configs::Storage;
use crate::errors::PersistenceError;
use crate::models::{AggregateStats, Reading, ReadingRecord};

/// Persistence gateway for readings. Implementations must be safe to call
/// from many connection tasks at once.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Persist one reading, returning its arrival sequence number.
    async fn insert(&self, reading: &Reading) -> Result<i64, PersistenceError>;

    async fn query_aggregates(&self) -> Result<AggregateStats, PersistenceError>;

    /// The newest `limit` readings by arrival, oldest first.
    async fn query_recent(&self, limit: usize) -> Result<Vec<ReadingRecord>, PersistenceError>;
}

pub struct ReadingRepository {
    storage: Arc<Storage>,
}

impl ReadingRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl ReadingStore for ReadingRepository {
    async fn insert(&self, reading: &Reading) -> Result<i64, PersistenceError> {
        let id = sqlx::query(
            r#"
            INSERT INTO readings (time, temperature, humidity)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(reading.time)
        .bind(reading.temperature)
        .bind(reading.humidity)
        .execute(self.storage.get_pool())
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn query_aggregates(&self) -> Result<AggregateStats, PersistenceError> {
        let stats: AggregateStats = sqlx::query_as(
            r#"
            SELECT
                MIN(temperature) AS min_temperature,
                MAX(temperature) AS max_temperature,
                AVG(temperature) AS avg_temperature,
                MIN(humidity) AS min_humidity,
                MAX(humidity) AS max_humidity,
                AVG(humidity) AS avg_humidity
            FROM readings
            "#,
        )
        .fetch_one(self.storage.get_pool())
        .await?;

        Ok(stats)
    }

    async fn query_recent(&self, limit: usize) -> Result<Vec<ReadingRecord>, PersistenceError> {
        let records: Vec<ReadingRecord> = sqlx::query_as(
            r#"
            SELECT * FROM (
                SELECT * FROM readings
                ORDER BY id DESC
                LIMIT $1
            )
            ORDER BY id ASC
            "#,
        )
        .bind(limit as i64)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }
}
