//! SQLite state store implementation.
//!
//! Implements `StateStore` from `canvas-core` using sqlx with split
//! read/write pools. Each namespace maps to one row in `app_state`; the
//! blob is stored as JSON text and deserialized on read.

use chrono::{DateTime, Utc};
use sqlx::Row;

use canvas_core::store::StateStore;
use canvas_types::error::StoreError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `StateStore`.
pub struct SqliteStateStore {
    pool: DatabasePool,
}

impl SqliteStateStore {
    /// Create a new state store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

impl StateStore for SqliteStateStore {
    async fn load(&self, namespace: &str) -> Result<Option<serde_json::Value>, StoreError> {
        let row = sqlx::query("SELECT value FROM app_state WHERE namespace = ?")
            .bind(namespace)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some(row) => {
                let value_str: String = row
                    .try_get("value")
                    .map_err(|e| StoreError::Backend(e.to_string()))?;
                let value: serde_json::Value = serde_json::from_str(&value_str)
                    .map_err(|e| StoreError::Serialization(format!("invalid JSON blob: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, namespace: &str, value: &serde_json::Value) -> Result<(), StoreError> {
        let now = format_datetime(&Utc::now());
        let value_str = serde_json::to_string(value)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO app_state (namespace, value, created_at, updated_at)
               VALUES (?, ?, ?, ?)
               ON CONFLICT (namespace) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(namespace)
        .bind(&value_str)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use canvas_core::store::{BLOCKS_NAMESPACE, PROJECTS_NAMESPACE};

    use super::*;

    async fn test_store() -> (SqliteStateStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteStateStore::new(pool), dir)
    }

    #[tokio::test]
    async fn test_load_missing_namespace_is_none() {
        let (store, _dir) = test_store().await;
        assert!(store.load(PROJECTS_NAMESPACE).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let (store, _dir) = test_store().await;
        let blob = serde_json::json!({"projects": [], "currentProjectId": null});

        store.save(PROJECTS_NAMESPACE, &blob).await.unwrap();
        assert_eq!(store.load(PROJECTS_NAMESPACE).await.unwrap(), Some(blob));
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_blob() {
        let (store, _dir) = test_store().await;

        store
            .save(PROJECTS_NAMESPACE, &serde_json::json!({"v": 1}))
            .await
            .unwrap();
        store
            .save(PROJECTS_NAMESPACE, &serde_json::json!({"v": 2}))
            .await
            .unwrap();

        assert_eq!(
            store.load(PROJECTS_NAMESPACE).await.unwrap(),
            Some(serde_json::json!({"v": 2}))
        );
    }

    #[tokio::test]
    async fn test_namespaces_are_independent() {
        let (store, _dir) = test_store().await;

        store
            .save(PROJECTS_NAMESPACE, &serde_json::json!({"projects": []}))
            .await
            .unwrap();
        store
            .save(BLOCKS_NAMESPACE, &serde_json::json!({"blocks": []}))
            .await
            .unwrap();

        assert_eq!(
            store.load(BLOCKS_NAMESPACE).await.unwrap(),
            Some(serde_json::json!({"blocks": []}))
        );
        assert_eq!(
            store.load(PROJECTS_NAMESPACE).await.unwrap(),
            Some(serde_json::json!({"projects": []}))
        );
    }
}
