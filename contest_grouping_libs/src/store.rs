use async_trait::async_trait;
use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{
    sqlite::{Sqlite, SqliteConnectOptions, SqlitePoolOptions},
    Pool,
};
use std::{collections::HashMap, str::FromStr};
use thiserror::Error;
use tokio::sync::RwLock;

type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access the key-value store: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("failed to (de)serialize stored JSON document: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Persistent string store holding whole JSON documents under a handful of keys.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Read the document stored under `key` and deserialize it.
pub async fn read<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_str(&value)?)),
        None => Ok(None),
    }
}

/// Serialize `value` and replace the document stored under `key` with it.
pub async fn write<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()>
where
    T: Serialize + Sync,
{
    let value = serde_json::to_string(value)?;
    store.set(key, value).await
}

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if necessary) the SQLite database at `database_url` and make sure the
    /// `kv_store` table exists.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // An in-memory database lives only as long as its connection, so the single
        // connection is never recycled.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS "kv_store" (
                "key" TEXT NOT NULL PRIMARY KEY,
                "value" TEXT NOT NULL,
                "updated_at" INTEGER NOT NULL
            );
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(SqliteStore { pool })
    }

    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar(r#"SELECT "value" FROM "kv_store" WHERE "key" = ?;"#)
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO "kv_store" ("key", "value", "updated_at")
            VALUES (?, ?, ?)
            ON CONFLICT ("key") DO UPDATE SET
                "value" = "excluded"."value",
                "updated_at" = "excluded"."updated_at";
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now().timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        sqlx::query(r#"DELETE FROM "kv_store" WHERE "key" = ?;"#)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Store that keeps everything in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Document {
        id: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_sqlite_store_round_trip() {
        let store = SqliteStore::in_memory().await.unwrap();

        assert_eq!(store.get("missing").await.unwrap(), None);

        store.set("key", String::from("first")).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(String::from("first")));

        store.set("key", String::from("second")).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(String::from("second")));

        store.remove("key").await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_and_write_documents() {
        let store = SqliteStore::in_memory().await.unwrap();
        let document = Document {
            id: String::from("1234"),
            count: 3,
        };

        write(&store, "doc", &document).await.unwrap();
        let restored: Option<Document> = read(&store, "doc").await.unwrap();

        assert_eq!(restored, Some(document));
    }

    #[tokio::test]
    async fn test_read_broken_document() {
        let store = MemoryStore::new();
        store.set("doc", String::from("{not json")).await.unwrap();

        let result: Result<Option<Document>> = read(&store, "doc").await;
        assert!(matches!(result, Err(StoreError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_sqlite_store_persists_across_connections() {
        let path = std::env::temp_dir().join(format!(
            "contest_grouping_store_test_{}.db",
            std::process::id()
        ));
        let url = format!("sqlite://{}", path.display());

        {
            let store = SqliteStore::connect(&url).await.unwrap();
            store.set("key", String::from("value")).await.unwrap();
            store.pool.close().await;
        }

        let store = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), Some(String::from("value")));
        store.pool.close().await;

        std::fs::remove_file(&path).ok();
    }
}
