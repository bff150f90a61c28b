//! Best-effort local cache of the last captured contact.
//!
//! Every storage failure is logged and swallowed: a broken store only means
//! forms are not prefilled.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Contact, normalize_phone_national};
use crate::store::LeadStore;

pub const CONTACT_STORAGE_KEY: &str = "ce_lead_contact_v1";
pub const EVENT_ID_KEY: &str = "lead_event_id";

const NATIONAL_PHONE_MAX_DIGITS: usize = 11;

#[derive(Serialize)]
struct StoredContact<'a> {
    name: &'a str,
    phone: String,
    email: &'a str,
    ts: i64,
}

#[derive(Clone)]
pub struct LeadCache {
    store: Arc<dyn LeadStore>,
}

impl LeadCache {
    pub fn new(store: Arc<dyn LeadStore>) -> Self {
        Self { store }
    }

    /// Persists `contact` with the current timestamp.
    pub async fn save(
        &self,
        contact: &Contact,
    ) {
        let record = StoredContact {
            name: contact.name.trim(),
            phone: normalize_phone_national(&contact.phone),
            email: contact.email.trim(),
            ts: Utc::now().timestamp_millis(),
        };

        let json = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(e) => {
                debug!(error = %e, "lead contact not serialized");
                return;
            }
        };

        if let Err(e) = self.store.set(CONTACT_STORAGE_KEY, &json).await {
            debug!(error = %e, "lead contact not cached");
        }
    }

    /// The cached contact, or `None` when nothing usable is stored.
    ///
    /// Parsing is lenient: missing or non-string fields read as empty.
    pub async fn cached(&self) -> Option<Contact> {
        let raw = match self.store.get(CONTACT_STORAGE_KEY).await {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                debug!(error = %e, "lead cache unreadable");
                return None;
            }
        };

        let data: Value = match serde_json::from_str(&raw) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => return None,
            Err(e) => {
                debug!(error = %e, "lead cache malformed");
                return None;
            }
        };

        let text = |key: &str| -> String {
            match data.get(key) {
                Some(Value::String(s)) => s.trim().to_string(),
                Some(Value::Number(n)) => n.to_string(),
                _ => String::new(),
            }
        };

        let mut phone = normalize_phone_national(&text("phone"));
        phone.truncate(NATIONAL_PHONE_MAX_DIGITS);

        Some(Contact {
            name: text("name"),
            phone,
            email: text("email"),
        })
    }

    /// Copies the cached contact into `target`.
    ///
    /// With `force` all three fields are overwritten; otherwise only empty
    /// ones are filled. Returns whether anything was loaded.
    pub async fn load(
        &self,
        target: &mut Contact,
        force: bool,
    ) -> bool {
        match self.cached().await {
            Some(cached) => {
                target.fill_from(&cached, force);
                true
            }
            None => false,
        }
    }

    /// Stable per-install event id (`lead-<uuid>`), created on first use.
    ///
    /// When the store fails a fresh id is returned and not persisted.
    pub async fn event_id(&self) -> String {
        match self.store.get(EVENT_ID_KEY).await {
            Ok(Some(id)) if !id.is_empty() => return id,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "event id unreadable");
                return new_event_id();
            }
        }

        let id = new_event_id();
        if let Err(e) = self.store.set(EVENT_ID_KEY, &id).await {
            debug!(error = %e, "event id not persisted");
        }
        id
    }
}

fn new_event_id() -> String {
    format!("lead-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::{MemoryLeadStore, StoreError};

    struct BrokenStore;

    #[async_trait]
    impl LeadStore for BrokenStore {
        async fn get(
            &self,
            _key: &str,
        ) -> Result<Option<String>, StoreError> {
            Err(StoreError::Connection("offline".to_string()))
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::Database("quota exceeded".to_string()))
        }
    }

    fn memory_cache() -> (LeadCache, Arc<MemoryLeadStore>) {
        let store = Arc::new(MemoryLeadStore::new());
        (LeadCache::new(store.clone()), store)
    }

    // =========================================================================
    // save / load
    // =========================================================================

    #[tokio::test]
    async fn save_writes_national_phone_and_timestamp() {
        let (cache, store) = memory_cache();
        let contact = Contact {
            name: " Ana ".to_string(),
            phone: "+55 (11) 98765-4321".to_string(),
            email: "ana@x.com".to_string(),
        };

        cache.save(&contact).await;

        let raw = store.get(CONTACT_STORAGE_KEY).await.unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["name"], "Ana");
        assert_eq!(value["phone"], "11987654321");
        assert_eq!(value["email"], "ana@x.com");
        assert!(value["ts"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn load_without_force_keeps_populated_fields() {
        let (cache, _) = memory_cache();
        cache
            .save(&Contact::from_raw("Cached", "11987654321", "cached@x.com"))
            .await;

        let mut target = Contact {
            name: "Typed".to_string(),
            ..Default::default()
        };
        assert!(cache.load(&mut target, false).await);

        assert_eq!(target.name, "Typed");
        assert_eq!(target.phone, "11987654321");
        assert_eq!(target.email, "cached@x.com");
    }

    #[tokio::test]
    async fn load_with_force_overwrites_everything() {
        let (cache, _) = memory_cache();
        cache
            .save(&Contact::from_raw("Cached", "11987654321", "cached@x.com"))
            .await;

        let mut target = Contact::from_raw("Typed", "21912345678", "typed@x.com");
        cache.load(&mut target, true).await;

        assert_eq!(target, Contact::from_raw("Cached", "11987654321", "cached@x.com"));
    }

    #[tokio::test]
    async fn cached_phone_is_truncated_to_eleven_digits() {
        let (cache, store) = memory_cache();
        store
            .set(CONTACT_STORAGE_KEY, r#"{"name":"Ana","phone":"5511987654321999"}"#)
            .await
            .unwrap();

        let cached = cache.cached().await.unwrap();

        assert_eq!(cached.phone, "11987654321");
        assert_eq!(cached.email, "");
    }

    #[tokio::test]
    async fn malformed_json_is_nothing_to_load() {
        let (cache, store) = memory_cache();
        store.set(CONTACT_STORAGE_KEY, "{not json").await.unwrap();

        let mut target = Contact::default();
        assert!(!cache.load(&mut target, true).await);
        assert_eq!(target, Contact::default());
    }

    #[tokio::test]
    async fn non_object_json_is_nothing_to_load() {
        let (cache, store) = memory_cache();
        store.set(CONTACT_STORAGE_KEY, "[1,2,3]").await.unwrap();

        assert_eq!(cache.cached().await, None);
    }

    #[tokio::test]
    async fn broken_store_is_a_cache_miss() {
        let cache = LeadCache::new(Arc::new(BrokenStore));

        cache.save(&Contact::from_raw("Ana", "11987654321", "ana@x.com")).await;
        let mut target = Contact::default();

        assert!(!cache.load(&mut target, false).await);
    }

    // =========================================================================
    // event id
    // =========================================================================

    #[tokio::test]
    async fn event_id_is_created_once() {
        let (cache, _) = memory_cache();

        let first = cache.event_id().await;
        let second = cache.event_id().await;

        assert!(first.starts_with("lead-"));
        assert_eq!(first.len(), "lead-".len() + 36);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn event_id_survives_store_failure() {
        let cache = LeadCache::new(Arc::new(BrokenStore));

        let first = cache.event_id().await;
        let second = cache.event_id().await;

        assert!(first.starts_with("lead-"));
        assert_ne!(first, second);
    }
}
