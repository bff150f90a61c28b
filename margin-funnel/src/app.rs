//! Wiring from configuration to a running [`Funnel`].

use std::sync::Arc;

use anyhow::{Context, Result};
use margin_core::lead::LeadCache;
use margin_core::store::{MemoryStoreFactory, StoreRegistry};
use margin_store_sqlite::SqliteStoreFactory;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::FunnelConfig;
use crate::funnel::{Funnel, FunnelEvent};
use crate::webhook::WebhookSubmitter;

/// Registry with every backend this binary ships.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(MemoryStoreFactory));
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

pub async fn build_funnel(config: &FunnelConfig) -> Result<(Funnel, mpsc::UnboundedReceiver<FunnelEvent>)> {
    let store_config = config.store_config();
    let store = build_registry()
        .create(&store_config)
        .await
        .with_context(|| format!("failed to open '{}' lead store", store_config.backend))?;
    info!(backend = %store_config.backend, "lead store ready");

    let webhook = WebhookSubmitter::new(config.webhook_url.clone())
        .context("failed to build webhook client")?;
    if !webhook.is_enabled() {
        info!("webhook_url not set, leads will not be submitted");
    }

    Ok(Funnel::new(
        LeadCache::new(Arc::from(store)),
        webhook,
        config.browser_context(),
        config.await_delay(),
    ))
}
