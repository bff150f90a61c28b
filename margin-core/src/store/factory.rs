//! Picking a lead store backend by name at start-up.

use std::collections::HashMap;

use async_trait::async_trait;

use super::lead_store::{LeadStore, StoreError};

/// Where the lead cache lives.
///
/// | backend  | connection_string                                      |
/// |----------|--------------------------------------------------------|
/// | `sqlite` | `funnel.db`, `sqlite://funnel.db?mode=rwc`, `:memory:` |
/// | `memory` | unused                                                 |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: String,
    /// Interpreted by the backend alone.
    pub connection_string: String,
}

impl Default for StoreConfig {
    /// A `funnel.db` file next to the binary, created on first use.
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: "sqlite://funnel.db?mode=rwc".to_string(),
        }
    }
}

/// Opens one kind of [`LeadStore`].
#[async_trait]
pub trait StoreFactory: Send + Sync {
    /// Name matched against [`StoreConfig::backend`].
    fn backend_name(&self) -> &'static str;

    /// Returns a store ready for `get`/`set`; schema setup happens here.
    async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn LeadStore>, StoreError>;
}

/// The lead store backends a binary knows how to open.
pub struct StoreRegistry {
    by_name: HashMap<&'static str, Box<dyn StoreFactory>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            by_name: HashMap::new(),
        }
    }

    /// Adds `factory`. A later factory with the same name wins.
    pub fn register(
        &mut self,
        factory: Box<dyn StoreFactory>,
    ) {
        let name = factory.backend_name();
        self.by_name.insert(name, factory);
    }

    pub fn available_backends(&self) -> Vec<&'static str> {
        let mut backends: Vec<&'static str> = self.by_name.keys().copied().collect();
        backends.sort_unstable();
        backends
    }

    /// Opens the store `config.backend` names.
    ///
    /// An unregistered name is a [`StoreError::Configuration`] listing what
    /// is registered; factory failures pass through unchanged.
    pub async fn create(
        &self,
        config: &StoreConfig,
    ) -> Result<Box<dyn LeadStore>, StoreError> {
        let Some(factory) = self.by_name.get(config.backend.as_str()) else {
            return Err(StoreError::Configuration(format!(
                "unknown backend '{}'; available: {:?}",
                config.backend,
                self.available_backends()
            )));
        };
        factory.create(config).await
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::{MemoryLeadStore, MemoryStoreFactory};

    /// Memory-backed factory under any name, counting how often it opens.
    struct Counting {
        name: &'static str,
        opened: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl StoreFactory for Counting {
        fn backend_name(&self) -> &'static str {
            self.name
        }

        async fn create(
            &self,
            _config: &StoreConfig,
        ) -> Result<Box<dyn LeadStore>, StoreError> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(MemoryLeadStore::new()))
        }
    }

    struct Unreachable;

    #[async_trait]
    impl StoreFactory for Unreachable {
        fn backend_name(&self) -> &'static str {
            "unreachable"
        }

        async fn create(
            &self,
            _config: &StoreConfig,
        ) -> Result<Box<dyn LeadStore>, StoreError> {
            Err(StoreError::Connection("disk not mounted".to_string()))
        }
    }

    fn counting(name: &'static str) -> (Box<dyn StoreFactory>, Arc<AtomicUsize>) {
        let opened = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Counting {
                name,
                opened: opened.clone(),
            }),
            opened,
        )
    }

    fn backend(name: &str) -> StoreConfig {
        StoreConfig {
            backend: name.to_string(),
            ..StoreConfig::default()
        }
    }

    // =========================================================================
    // StoreConfig
    // =========================================================================

    #[test]
    fn default_store_is_funnel_db_file() {
        let config = StoreConfig::default();

        assert_eq!(config.backend, "sqlite");
        assert_eq!(config.connection_string, "sqlite://funnel.db?mode=rwc");
    }

    // =========================================================================
    // Registration
    // =========================================================================

    #[test]
    fn empty_registry_lists_nothing() {
        assert_eq!(StoreRegistry::default().available_backends(), Vec::<&str>::new());
    }

    #[test]
    fn backends_are_listed_by_name() {
        let mut registry = StoreRegistry::new();
        registry.register(counting("sqlite").0);
        registry.register(Box::new(MemoryStoreFactory));

        assert_eq!(registry.available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn later_factory_replaces_same_name() {
        let mut registry = StoreRegistry::new();
        let (first, first_opened) = counting("memory");
        let (second, second_opened) = counting("memory");
        registry.register(first);
        registry.register(second);

        registry.create(&backend("memory")).await.unwrap();

        assert_eq!(registry.available_backends(), vec!["memory"]);
        assert_eq!(first_opened.load(Ordering::SeqCst), 0);
        assert_eq!(second_opened.load(Ordering::SeqCst), 1);
    }

    // =========================================================================
    // Opening a store
    // =========================================================================

    #[tokio::test]
    async fn opens_only_the_named_backend() {
        let mut registry = StoreRegistry::new();
        let (sqlite, sqlite_opened) = counting("sqlite");
        let (memory, memory_opened) = counting("memory");
        registry.register(sqlite);
        registry.register(memory);

        let store = registry.create(&backend("memory")).await.unwrap();
        store.set("k", "v").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(memory_opened.load(Ordering::SeqCst), 1);
        assert_eq!(sqlite_opened.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_backend_lists_registered_ones() {
        let mut registry = StoreRegistry::new();
        registry.register(Box::new(MemoryStoreFactory));

        match registry.create(&backend("redis")).await {
            Err(StoreError::Configuration(msg)) => {
                assert_eq!(msg, r#"unknown backend 'redis'; available: ["memory"]"#);
            }
            Err(other) => panic!("expected configuration error, got {other:?}"),
            Ok(_) => panic!("redis is not registered"),
        }
    }

    #[tokio::test]
    async fn factory_failure_passes_through() {
        let mut registry = StoreRegistry::new();
        registry.register(Box::new(Unreachable));

        let err = registry.create(&backend("unreachable")).await.err().unwrap();

        assert_eq!(err, StoreError::Connection("disk not mounted".to_string()));
    }
}
