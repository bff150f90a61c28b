use async_trait::async_trait;
use margin_core::store::{LeadStore, StoreConfig, StoreError, StoreFactory};

use crate::store::SqliteLeadStore;

/// [`StoreFactory`] for SQLite.
///
/// Register this with a [`margin_core::store::StoreRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use margin_core::store::StoreRegistry;
/// use margin_store_sqlite::SqliteStoreFactory;
///
/// let mut registry = StoreRegistry::new();
/// registry.register(Box::new(SqliteStoreFactory));
/// ```
pub struct SqliteStoreFactory;

#[async_trait]
impl StoreFactory for SqliteStoreFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database described by `config.connection_string` and
    /// brings its schema up to date.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn LeadStore>, StoreError> {
        let store = SqliteLeadStore::new(&config.connection_string)
            .await
            .map_err(|e| StoreError::Connection(format!("{:#}", e)))?;
        store
            .run_migrations()
            .await
            .map_err(|e| StoreError::Database(format!("{:#}", e)))?;
        Ok(Box::new(store))
    }
}

#[cfg(test)]
mod tests {
    use margin_core::store::{StoreConfig, StoreFactory};

    use super::SqliteStoreFactory;

    #[test]
    fn backend_name_is_sqlite() {
        assert_eq!(SqliteStoreFactory.backend_name(), "sqlite");
    }

    #[tokio::test]
    async fn creates_in_memory_store() {
        let config = StoreConfig {
            backend: "sqlite".to_string(),
            connection_string: ":memory:".to_string(),
        };

        let result = SqliteStoreFactory.create(&config).await;
        assert!(
            result.is_ok(),
            "failed to create in-memory store: {:#?}",
            result.err()
        );
    }
}
