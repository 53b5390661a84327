use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;

use crate::models::{LegacyKey, Paste};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS paste (
        key TEXT PRIMARY KEY NOT NULL,
        id TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        content TEXT NOT NULL,
        owner_identity TEXT NOT NULL,
        title TEXT NOT NULL DEFAULT '',
        language TEXT NOT NULL DEFAULT ''
    )",
    "CREATE INDEX IF NOT EXISTS paste_id ON paste (id)",
];

#[derive(Clone)]
pub struct Database {
    pool: AnyPool,
}

impl Database {
    /// Connect to a database by URL.
    pub async fn connect(config: &crate::config::Database) -> anyhow::Result<Self> {
        let pool = AnyPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;
        Ok(Self { pool })
    }

    /// Create the paste table if it does not exist yet.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Get a paste by its storage key.
    pub async fn get_paste(&self, key: &str) -> crate::ApiResult<Option<Paste>> {
        let paste = sqlx::query_as::<_, Paste>(
            "SELECT id, timestamp, content, owner_identity, title, language FROM paste WHERE key \
             = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(paste)
    }

    /// Find the oldest paste whose id field matches, regardless of its storage key.
    ///
    /// Only legacy rows have a key that differs from their id. Once
    /// `rekey-legacy` has been run this never finds anything `get_paste`
    /// would not, and can be removed.
    pub async fn find_paste_by_id(&self, id: &str) -> crate::ApiResult<Option<Paste>> {
        let paste = sqlx::query_as::<_, Paste>(
            "SELECT id, timestamp, content, owner_identity, title, language FROM paste WHERE id = \
             ? ORDER BY timestamp LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(paste)
    }

    /// Insert a paste, keyed by its id.
    pub async fn insert_paste(&self, paste: &Paste) -> crate::ApiResult<()> {
        sqlx::query(
            "INSERT INTO paste (key, id, timestamp, content, owner_identity, title, language) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(paste.id.as_str())
        .bind(paste.id.as_str())
        .bind(paste.timestamp)
        .bind(paste.content.as_str())
        .bind(paste.owner_identity.as_str())
        .bind(paste.title.as_str())
        .bind(paste.language.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a paste by its storage key.
    pub async fn delete_paste(&self, key: &str) -> crate::ApiResult<()> {
        sqlx::query("DELETE FROM paste WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Get all rows whose storage key differs from their id, oldest first
    /// within each id so the row `find_paste_by_id` returns comes first.
    pub async fn get_legacy_keys(&self) -> crate::ApiResult<Vec<LegacyKey>> {
        let keys = sqlx::query_as::<_, LegacyKey>(
            "SELECT key, id FROM paste WHERE key <> id ORDER BY id, timestamp",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(keys)
    }

    /// Change the storage key of a row.
    pub async fn rekey_paste(&self, old_key: &str, new_key: &str) -> crate::ApiResult<()> {
        sqlx::query("UPDATE paste SET key = ? WHERE key = ?")
            .bind(new_key)
            .bind(old_key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
impl Database {
    /// An empty in-memory database.
    ///
    /// Pinned to a single connection that is never recycled, since every
    /// SQLite in-memory connection is its own database.
    pub async fn in_memory() -> Self {
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let database = Database { pool };
        database.migrate().await.unwrap();
        database
    }

    /// Insert a paste under a storage key other than its id, the way
    /// pastes from before keyed storage were laid out.
    pub async fn insert_legacy_paste(&self, key: &str, paste: &Paste) {
        sqlx::query(
            "INSERT INTO paste (key, id, timestamp, content, owner_identity, title, language) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(key)
        .bind(paste.id.as_str())
        .bind(paste.timestamp)
        .bind(paste.content.as_str())
        .bind(paste.owner_identity.as_str())
        .bind(paste.title.as_str())
        .bind(paste.language.as_str())
        .execute(&self.pool)
        .await
        .unwrap();
    }

    /// Make every later statement fail.
    pub async fn drop_schema(&self) {
        sqlx::query("DROP TABLE paste")
            .execute(&self.pool)
            .await
            .unwrap();
    }
}
