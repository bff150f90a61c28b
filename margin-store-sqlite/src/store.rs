use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use margin_core::store::{LeadStore, StoreError};
use sqlx::{Row, sqlite::SqlitePool, sqlite::SqlitePoolOptions};
use tracing::debug;

/// SQLite-backed [`LeadStore`] over a single `lead_kv` table.
pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    /// Opens the database at `connection_string`.
    ///
    /// Accepts a sqlx URL (`sqlite://funnel.db?mode=rwc`, `sqlite::memory:`),
    /// a bare file path (created when missing) or `:memory:`.
    pub async fn new(connection_string: &str) -> Result<Self> {
        let url = database_url(connection_string);
        // One connection: every `:memory:` connection is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", url))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Maps the accepted connection-string forms onto a sqlx URL.
pub fn database_url(connection_string: &str) -> String {
    let s = connection_string.trim();
    if s == ":memory:" {
        "sqlite::memory:".to_string()
    } else if s.starts_with("sqlite:") {
        s.to_string()
    } else {
        format!("sqlite://{}?mode=rwc", s)
    }
}

#[async_trait]
impl LeadStore for SqliteLeadStore {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT value FROM lead_kv WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Database(e.to_string()))?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|e| StoreError::Database(format!("Failed to get value: {}", e)))
        })
        .transpose()
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO lead_kv (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                 value = excluded.value,
                 updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

        debug!(key, "lead_kv updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_test_db() -> SqliteLeadStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let store = SqliteLeadStore::new_with_pool(pool);
        store
            .run_migrations()
            .await
            .expect("Failed to run migrations");
        store
    }

    // =========================================================================
    // database_url
    // =========================================================================

    #[test]
    fn memory_shorthand_maps_to_sqlx_url() {
        assert_eq!(database_url(":memory:"), "sqlite::memory:");
    }

    #[test]
    fn sqlx_urls_pass_through() {
        assert_eq!(
            database_url("sqlite://funnel.db?mode=rwc"),
            "sqlite://funnel.db?mode=rwc"
        );
        assert_eq!(database_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn bare_path_is_opened_read_write_create() {
        assert_eq!(database_url("data/funnel.db"), "sqlite://data/funnel.db?mode=rwc");
    }

    // =========================================================================
    // LeadStore
    // =========================================================================

    #[tokio::test]
    async fn get_missing_key_is_none() {
        let store = setup_test_db().await;

        assert_eq!(store.get("ce_lead_contact_v1").await, Ok(None));
    }

    #[tokio::test]
    async fn set_then_get_returns_value() {
        let store = setup_test_db().await;
        store.set("lead_event_id", "lead-abc").await.unwrap();

        assert_eq!(
            store.get("lead_event_id").await,
            Ok(Some("lead-abc".to_string()))
        );
    }

    #[tokio::test]
    async fn set_upserts_single_row() {
        let store = setup_test_db().await;
        store.set("k", "first").await.unwrap();
        store.set("k", "second").await.unwrap();

        let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM lead_kv")
            .fetch_one(store.pool())
            .await
            .unwrap()
            .get("n");

        assert_eq!(count, 1);
        assert_eq!(store.get("k").await, Ok(Some("second".to_string())));
    }

    #[tokio::test]
    async fn set_records_timestamp() {
        let store = setup_test_db().await;
        let before = Utc::now();
        store.set("k", "v").await.unwrap();

        let updated_at: DateTime<Utc> = sqlx::query("SELECT updated_at FROM lead_kv WHERE key = 'k'")
            .fetch_one(store.pool())
            .await
            .unwrap()
            .get("updated_at");

        assert!(updated_at >= before - chrono::Duration::seconds(1));
    }
}
