use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Error, SqlitePool};

use crate::configs::schema::SchemaManager;
use crate::configs::settings::Database;

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(database: Database, schema_manager: SchemaManager) -> Result<Self, Error> {
        let pool = SqlitePoolOptions::new()
            .min_connections(1) // in memory db might drop connection when 0
            .max_connections(database.max_connections.max(1))
            .connect(&database.url)
            .await?;

        Self::create_schema(&pool, &schema_manager, &database).await?;

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn create_schema(pool: &SqlitePool, schema: &SchemaManager, database: &Database) -> Result<(), Error> {
        if database.clean_start {
            sqlx::query(&schema.dispose_schema().join("\n"))
                .execute(pool)
                .await?;

            tracing::warn!("perform a clean boot: drop {:?}", schema.table_names());
        }

        sqlx::query(&schema.create_schema().join("\n"))
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_schema_created_on_start() {
        let storage = Storage::new(
            Database {
                url: String::from("sqlite::memory:"),
                clean_start: true,
                max_connections: 1,
            },
            SchemaManager::default(),
        )
        .await
        .unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM readings")
            .fetch_one(storage.get_pool())
            .await
            .unwrap();

        assert_eq!(count, 0);
    }
}
