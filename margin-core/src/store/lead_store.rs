use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Small string key/value store backing the lead cache.
///
/// Plays the role of browser local storage: one value per key, last write
/// wins. Callers treat every error as a cache miss.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Returns the stored value, or `None` when the key was never set.
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError>;
}
