use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::factory::{StoreConfig, StoreFactory};
use super::lead_store::{LeadStore, StoreError};

/// Process-local [`LeadStore`]; contents vanish when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryLeadStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Database(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// [`StoreFactory`] for the `"memory"` backend. The connection string is
/// ignored.
pub struct MemoryStoreFactory;

#[async_trait]
impl StoreFactory for MemoryStoreFactory {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(
        &self,
        _config: &StoreConfig,
    ) -> Result<Box<dyn LeadStore>, StoreError> {
        Ok(Box::new(MemoryLeadStore::new()))
    }
}
