//! Funnel settings loaded from a TOML file.
//!
//! ```toml
//! webhook_url = "https://hooks.example/lead"
//! await_delay_ms = 2000
//! source_url = "https://clinica.example/?utm_source=ig"
//!
//! [store]
//! backend = "sqlite"
//! connection_string = "sqlite://funnel.db?mode=rwc"
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use margin_core::store::StoreConfig;
use margin_core::tracking::BrowserContext;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

pub const DEFAULT_AWAIT_DELAY_MS: u64 = 2000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FunnelConfig {
    /// Endpoint receiving both lead payloads. Empty disables submission.
    pub webhook_url: String,
    /// Delay between unlocking the gate and showing the result.
    pub await_delay_ms: u64,
    pub store: StoreSection,

    // Browser context reported in the qualification payload.
    pub source_url: String,
    pub referrer: String,
    pub user_agent: String,
    pub cookie: String,

    /// Optional log file, appended to.
    pub log_file: Option<PathBuf>,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            await_delay_ms: DEFAULT_AWAIT_DELAY_MS,
            store: StoreSection::default(),
            source_url: String::new(),
            referrer: String::new(),
            user_agent: concat!("margin-funnel/", env!("CARGO_PKG_VERSION")).to_string(),
            cookie: String::new(),
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    pub backend: String,
    pub connection_string: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        let StoreConfig {
            backend,
            connection_string,
        } = StoreConfig::default();
        Self {
            backend,
            connection_string,
        }
    }
}

impl From<&StoreSection> for StoreConfig {
    fn from(section: &StoreSection) -> Self {
        StoreConfig {
            backend: section.backend.clone(),
            connection_string: section.connection_string.clone(),
        }
    }
}

impl FunnelConfig {
    /// Loads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %path.display(), "config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::from(&self.store)
    }

    pub fn browser_context(&self) -> BrowserContext {
        BrowserContext {
            source_url: self.source_url.clone(),
            referrer: self.referrer.clone(),
            user_agent: self.user_agent.clone(),
            cookie_header: self.cookie.clone(),
        }
    }

    pub fn await_delay(&self) -> Duration {
        Duration::from_millis(self.await_delay_ms)
    }
}
