use crate::store::{self, KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

pub const DEFAULT_CACHE_TTL_HOURS: f64 = 24.0;
pub const DEFAULT_RATE_LIMIT_MS: f64 = 1100.0;

const OPTIONS_KEY: &str = "options_v1";

fn default_true() -> bool {
    true
}

fn default_cache_ttl_hours() -> f64 {
    DEFAULT_CACHE_TTL_HOURS
}

fn default_rate_limit_ms() -> f64 {
    DEFAULT_RATE_LIMIT_MS
}

/// User-facing settings. Always read and written as a whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true", alias = "useApi")]
    pub use_remote_lookup: bool,
    #[serde(default = "default_cache_ttl_hours", rename = "cacheTTLHours")]
    pub cache_ttl_hours: f64,
    #[serde(default = "default_rate_limit_ms")]
    pub rate_limit_ms: f64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            enabled: true,
            use_remote_lookup: true,
            cache_ttl_hours: DEFAULT_CACHE_TTL_HOURS,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
        }
    }
}

impl Options {
    /// Maximum age of a per-contest cache entry. Non-positive values fall back to the default.
    pub fn cache_ttl_millis(&self) -> i64 {
        let hours = if self.cache_ttl_hours.is_finite() && self.cache_ttl_hours > 0.0 {
            self.cache_ttl_hours
        } else {
            DEFAULT_CACHE_TTL_HOURS
        };
        (hours * 3600.0 * 1000.0) as i64
    }

    /// Minimum spacing between two upstream requests. Non-positive values fall back to the default.
    pub fn rate_limit_interval(&self) -> Duration {
        let millis = if self.rate_limit_ms.is_finite() && self.rate_limit_ms > 0.0 {
            self.rate_limit_ms
        } else {
            DEFAULT_RATE_LIMIT_MS
        };
        Duration::from_micros((millis * 1000.0) as u64)
    }
}

#[derive(Clone)]
pub struct OptionsStore {
    store: Arc<dyn KeyValueStore>,
}

impl OptionsStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        OptionsStore { store }
    }

    /// Current options, or the defaults when none were saved or the saved record is unreadable.
    pub async fn get(&self) -> Options {
        match store::read::<Options>(self.store.as_ref(), OPTIONS_KEY).await {
            Ok(Some(options)) => options,
            Ok(None) => Options::default(),
            Err(e) => {
                tracing::warn!("failed to read options, falling back to defaults: {}", e);
                Options::default()
            }
        }
    }

    /// Replace the saved options with `options`.
    pub async fn set(&self, options: &Options) -> Result<(), StoreError> {
        store::write(self.store.as_ref(), OPTIONS_KEY, options).await?;
        tracing::info!("Options saved: {:?}", options);
        Ok(())
    }
}
