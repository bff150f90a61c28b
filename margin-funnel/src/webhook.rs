//! Fire-and-forget lead delivery.
//!
//! A payload is serialized once and handed to an ordered chain of
//! [`DeliveryStrategy`]s. The first strategy that completes without a
//! transport fault ends the chain. HTTP status codes are never inspected.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const JSON: &str = "application/json";
const TEXT_PLAIN: &str = "text/plain;charset=UTF-8";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const BEACON_TIMEOUT: Duration = Duration::from_secs(3);

/// Failure of a single delivery attempt.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// One way of getting a body to the webhook.
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(
        &self,
        url: &str,
        body: &str,
    ) -> Result<(), TransportError>;
}

/// POST with a JSON content type.
pub struct JsonPost {
    client: reqwest::Client,
}

impl JsonPost {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeliveryStrategy for JsonPost {
    fn name(&self) -> &'static str {
        "json-post"
    }

    async fn deliver(
        &self,
        url: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, JSON)
            .body(body.to_owned())
            .send()
            .await?;
        debug!(status = %response.status(), "json post answered");
        Ok(())
    }
}

/// Plain-text POST with a short deadline whose response is never read.
pub struct Beacon {
    client: reqwest::Client,
}

impl Beacon {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeliveryStrategy for Beacon {
    fn name(&self) -> &'static str {
        "beacon"
    }

    async fn deliver(
        &self,
        url: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        self.client
            .post(url)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .timeout(BEACON_TIMEOUT)
            .body(body.to_owned())
            .send()
            .await?;
        Ok(())
    }
}

/// Plain-text POST, last resort. The status is ignored.
pub struct RelaxedPost {
    client: reqwest::Client,
}

impl RelaxedPost {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DeliveryStrategy for RelaxedPost {
    fn name(&self) -> &'static str {
        "relaxed-post"
    }

    async fn deliver(
        &self,
        url: &str,
        body: &str,
    ) -> Result<(), TransportError> {
        self.client
            .post(url)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .body(body.to_owned())
            .send()
            .await?;
        Ok(())
    }
}

/// Sends payloads to one webhook URL through a fallback chain.
#[derive(Clone)]
pub struct WebhookSubmitter {
    url: String,
    strategies: Arc<Vec<Box<dyn DeliveryStrategy>>>,
}

impl WebhookSubmitter {
    /// Default chain: [`JsonPost`], then [`Beacon`], then [`RelaxedPost`].
    ///
    /// An empty `url` disables submission.
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self::with_strategies(
            url,
            vec![
                Box::new(JsonPost::new(client.clone())),
                Box::new(Beacon::new(client.clone())),
                Box::new(RelaxedPost::new(client)),
            ],
        ))
    }

    pub fn with_strategies(
        url: impl Into<String>,
        strategies: Vec<Box<dyn DeliveryStrategy>>,
    ) -> Self {
        Self {
            url: url.into(),
            strategies: Arc::new(strategies),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// Serializes `payload` and delivers it in the background.
    ///
    /// Returns immediately. The handle resolves to the name of the strategy
    /// that succeeded; callers are free to drop it. `None` means nothing was
    /// spawned (submission disabled, unserializable payload, or no runtime).
    pub fn submit<P: Serialize>(
        &self,
        payload: &P,
    ) -> Option<JoinHandle<Option<&'static str>>> {
        if !self.is_enabled() {
            debug!("webhook url not configured, payload dropped");
            return None;
        }

        let body = match serde_json::to_string(payload) {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "payload not serializable");
                return None;
            }
        };

        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime, payload dropped");
            return None;
        };

        let submitter = self.clone();
        Some(runtime.spawn(async move { submitter.deliver(&body).await }))
    }

    /// Walks the chain until one strategy completes without a fault.
    pub async fn deliver(
        &self,
        body: &str,
    ) -> Option<&'static str> {
        for strategy in self.strategies.iter() {
            match strategy.deliver(&self.url, body).await {
                Ok(()) => {
                    info!(strategy = strategy.name(), "lead delivered");
                    return Some(strategy.name());
                }
                Err(e) => {
                    debug!(strategy = strategy.name(), error = %e, "delivery attempt failed");
                }
            }
        }

        warn!(url = %self.url, "every delivery strategy failed");
        None
    }
}
