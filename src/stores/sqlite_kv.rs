//! SQLite-backed key-value store.

use super::KeyValueStore;
use crate::errors::StoreResult;
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::sync::Arc;
use tracing::debug;

const INIT_MIGRATION: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Clone)]
pub struct SqliteKeyValueStore {
    db: Arc<SqlitePool>,
}

impl SqliteKeyValueStore {
    /// Connect to `database_url` and apply the schema.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        debug!("connecting key-value store => {}", database_url);
        // A single connection keeps `sqlite::memory:` databases coherent and
        // is plenty for one metadata key.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        let store = Self { db: Arc::new(pool) };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        let statements = INIT_MIGRATION
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty());
        for stmt in statements {
            debug!("executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.db)
            .await?;
        debug!(key, found = value.is_some(), "kv get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true))
        .execute(&*self.db)
        .await?;
        debug!(key, bytes = value.len(), "kv set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let store = SqliteKeyValueStore::connect("sqlite::memory:").await.unwrap();
        assert_eq!(store.get("photos").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_upserts() {
        let store = SqliteKeyValueStore::connect("sqlite::memory:").await.unwrap();
        store.set("photos", "[]").await.unwrap();
        store.set("photos", r#"[{"filepath":"1.jpeg"}]"#).await.unwrap();
        assert_eq!(
            store.get("photos").await.unwrap().as_deref(),
            Some(r#"[{"filepath":"1.jpeg"}]"#)
        );
    }

    #[tokio::test]
    async fn survives_reconnect_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("kv.db").display());

        let store = SqliteKeyValueStore::connect(&url).await.unwrap();
        store.set("photos", "[1]").await.unwrap();
        store.db.close().await;

        let reopened = SqliteKeyValueStore::connect(&url).await.unwrap();
        assert_eq!(reopened.get("photos").await.unwrap().as_deref(), Some("[1]"));
    }
}
