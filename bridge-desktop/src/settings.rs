//! Durable settings storage using SQLite.
//!
//! Volume preferences and the loop toggle must survive the session, so they
//! live in a small type-tagged key-value table.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    storage::SettingsStore,
};
use sqlx::{sqlite::SqlitePool, Row};
use std::path::PathBuf;
use tracing::{debug, error};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    value_type TEXT NOT NULL,
    updated_at INTEGER NOT NULL
)
"#;

/// SQLite-backed settings store.
pub struct SqliteSettingsStore {
    pool: SqlitePool,
}

impl SqliteSettingsStore {
    /// Open (creating if needed) the settings database at the given path.
    pub async fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(BridgeError::Io)?;
        }

        let path_str = db_path.to_string_lossy().replace('\\', "/");
        let db_url = format!("sqlite://{}?mode=rwc", path_str);

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {e}")))?;

        Self::with_pool(pool).await
    }

    /// Create an in-memory settings store (for testing).
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to connect to DB: {e}")))?;

        Self::with_pool(pool).await
    }

    async fn with_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to create table: {e}")))?;

        debug!("initialized settings store");
        Ok(Self { pool })
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }

    async fn set_value(&self, key: &str, value: &str, value_type: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, value_type, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                value_type = excluded.value_type,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(value_type)
        .bind(Self::now())
        .execute(&self.pool)
        .await
        .map_err(|e| BridgeError::OperationFailed(format!("Failed to set setting: {e}")))?;

        Ok(())
    }

    async fn get_value(&self, key: &str, expected_type: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value, value_type FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to get setting: {e}")))?;

        match row {
            Some(row) => {
                let value: String = row.get(0);
                let value_type: String = row.get(1);

                if value_type != expected_type {
                    error!(key, expected = expected_type, actual = %value_type, "type mismatch");
                    return Err(BridgeError::OperationFailed(format!(
                        "Type mismatch for {key}: expected {expected_type}, got {value_type}"
                    )));
                }

                Ok(Some(value))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SettingsStore for SqliteSettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value, "string").await
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        self.get_value(key, "string").await
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.set_value(key, &value.to_string(), "bool").await
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.get_value(key, "bool").await? {
            Some(s) => Ok(Some(s.parse().map_err(|e| {
                BridgeError::OperationFailed(format!("Parse error: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn set_f64(&self, key: &str, value: f64) -> Result<()> {
        self.set_value(key, &value.to_string(), "f64").await
    }

    async fn get_f64(&self, key: &str) -> Result<Option<f64>> {
        match self.get_value(key, "f64").await? {
            Some(s) => Ok(Some(s.parse().map_err(|e| {
                BridgeError::OperationFailed(format!("Parse error: {e}"))
            })?)),
            None => Ok(None),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to delete setting: {e}")))?;

        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to check key: {e}")))?;

        Ok(row.is_some())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to list keys: {e}")))?;

        Ok(rows.into_iter().map(|row| row.get(0)).collect())
    }

    async fn clear_all(&self) -> Result<()> {
        sqlx::query("DELETE FROM settings")
            .execute(&self.pool)
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Failed to clear settings: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::storage::keys;

    #[tokio::test]
    async fn volume_preferences_round_trip() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();

        store.set_f64(keys::VOLUME, 0.7).await.unwrap();
        store.set_f64(keys::PREVIOUS_VOLUME, 0.4).await.unwrap();

        assert_eq!(store.get_f64(keys::VOLUME).await.unwrap(), Some(0.7));
        assert_eq!(store.get_f64(keys::PREVIOUS_VOLUME).await.unwrap(), Some(0.4));
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        assert_eq!(store.get_f64("nope").await.unwrap(), None);
        assert!(!store.has_key("nope").await.unwrap());
    }

    #[tokio::test]
    async fn type_mismatch_is_an_error() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        store.set_string("k", "hello").await.unwrap();
        assert!(store.get_f64("k").await.is_err());
    }

    #[tokio::test]
    async fn bool_toggle_round_trip() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        store.set_bool(keys::LOOP_PLAYBACK, true).await.unwrap();
        assert_eq!(store.get_bool(keys::LOOP_PLAYBACK).await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn delete_and_list() {
        let store = SqliteSettingsStore::in_memory().await.unwrap();
        store.set_string("a", "1").await.unwrap();
        store.set_string("b", "2").await.unwrap();
        assert_eq!(store.list_keys().await.unwrap(), vec!["a", "b"]);

        store.delete("a").await.unwrap();
        assert_eq!(store.list_keys().await.unwrap(), vec!["b"]);

        store.clear_all().await.unwrap();
        assert!(store.list_keys().await.unwrap().is_empty());
    }
}
