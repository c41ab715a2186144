use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};

use crate::domain::repositories::{Expected, KeyValueStore, StoreError};

/// SQLite-backed key-value store. One table, keys as TEXT, record bytes
/// as BLOB.
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

fn db_error(e: sqlx::Error) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

impl SqliteKeyValueStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the backing table when it does not exist yet.
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS kv_records (key TEXT PRIMARY KEY, value BLOB NOT NULL)",
        )
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let row = sqlx::query("SELECT value FROM kv_records WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_records (key, value) VALUES (?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn set_if(
        &self,
        key: &str,
        value: &[u8],
        expected: Expected<'_>,
    ) -> Result<bool, StoreError> {
        // Single statement per case, so the compare and the write are
        // atomic on the backend.
        let result = match expected {
            Expected::Absent => {
                sqlx::query("INSERT INTO kv_records (key, value) VALUES (?, ?) ON CONFLICT(key) DO NOTHING")
                    .bind(key)
                    .bind(value)
                    .execute(&self.pool)
                    .await
                    .map_err(db_error)?
            }
            Expected::Bytes(prior) => {
                sqlx::query("UPDATE kv_records SET value = ? WHERE key = ? AND value = ?")
                    .bind(value)
                    .bind(key)
                    .bind(prior)
                    .execute(&self.pool)
                    .await
                    .map_err(db_error)?
            }
        };

        Ok(result.rows_affected() > 0)
    }

    async fn scan(&self, prefix: &str, limit: u32) -> Result<Vec<String>, StoreError> {
        let rows = sqlx::query("SELECT key FROM kv_records WHERE key LIKE ? LIMIT ?")
            .bind(format!("{prefix}%"))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.iter().map(|r| r.get("key")).collect())
    }

    async fn multi_get(&self, keys: &[String]) -> Result<Vec<Option<Vec<u8>>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        // Single round trip via an IN clause, then re-ordered to match
        // the requested keys.
        let placeholders: Vec<&str> = keys.iter().map(|_| "?").collect();
        let query = format!(
            "SELECT key, value FROM kv_records WHERE key IN ({})",
            placeholders.join(", ")
        );

        let mut query_builder = sqlx::query(&query);
        for key in keys {
            query_builder = query_builder.bind(key);
        }

        let rows = query_builder
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let mut found: HashMap<String, Vec<u8>> = rows
            .iter()
            .map(|r| (r.get("key"), r.get("value")))
            .collect();

        Ok(keys.iter().map(|key| found.remove(key)).collect())
    }
}
