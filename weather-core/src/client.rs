use chrono::Duration;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use url::Url;

use crate::{
    cache::{CacheLookup, CacheStore, default_ttl},
    clock::{Clock, SystemClock},
    error::{CacheError, WeatherError},
    location::{DEFAULT_API_BASE, Query},
    model::Conditions,
    provider::{OpenWeatherProvider, WeatherProvider},
    units::TemperatureUnit,
};

/// Everything a [`Client`] is bound to for its lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub token: String,
    /// Free-text unit tag, normalized with [`TemperatureUnit::from_tag`].
    pub unit: String,
    pub detailed: bool,
    pub query: Query,
    pub cache_root: PathBuf,
    pub cache_ttl: Duration,
    pub api_base: String,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>, query: Query, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            token: token.into(),
            unit: String::new(),
            detailed: false,
            query,
            cache_root: cache_root.into(),
            cache_ttl: default_ttl(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

/// Read-through client for one query: serves fresh cache entries, otherwise
/// fetches once, converts, and writes the result back.
#[derive(Debug, Clone)]
pub struct Client {
    token: String,
    unit: TemperatureUnit,
    detailed: bool,
    url: Url,
    cache_key: String,
    cache: CacheStore,
    provider: Arc<dyn WeatherProvider>,
    clock: Arc<dyn Clock>,
}

impl Client {
    /// Fails only when `api_base` is not a valid absolute URL.
    pub fn new(config: ClientConfig) -> Result<Self, WeatherError> {
        Self::with_parts(config, Arc::new(OpenWeatherProvider::new()), Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: ClientConfig,
        provider: Arc<dyn WeatherProvider>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, WeatherError> {
        let url = config.query.url(&config.api_base, &config.token)?;
        let cache_key = config.query.cache_key();

        Ok(Self {
            unit: TemperatureUnit::from_tag(&config.unit),
            detailed: config.detailed,
            url,
            cache_key,
            cache: CacheStore::new(config.cache_root, config.cache_ttl),
            token: config.token,
            provider,
            clock,
        })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn detailed(&self) -> bool {
        self.detailed
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn cache_key(&self) -> &str {
        &self.cache_key
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Current conditions for the bound query.
    ///
    /// A fresh cache entry is returned as stored. Anything else (miss, stale,
    /// corrupt) triggers exactly one upstream request; its errors are returned
    /// unchanged and leave the cache untouched.
    pub async fn current(&self) -> Result<Conditions, WeatherError> {
        let lookup = self.cache.lookup(&self.cache_key, self.clock.now());
        if let CacheLookup::Hit(cond) = lookup {
            return Ok(cond);
        }

        let mut cond = self.provider.fetch_current(&self.url).await?;
        cond.unit = self.unit;
        cond.long_format = self.detailed;
        cond.convert();
        cond.cache_time = self.clock.now();

        self.write_back(&cond);
        Ok(cond)
    }

    /// Drop the cache entry for the bound query.
    pub fn forget(&self) -> Result<(), CacheError> {
        self.cache.delete(&self.cache_key)
    }

    fn write_back(&self, cond: &Conditions) {
        let bytes = match serde_json::to_vec(cond) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(key = %self.cache_key, error = %err, "failed to serialize conditions for cache");
                return;
            }
        };

        match self.cache.store(&self.cache_key, &bytes) {
            Ok(()) => info!(key = %self.cache_key, "cached fresh conditions"),
            Err(err) => warn!(key = %self.cache_key, error = %err, "failed to write cache entry"),
        }
    }
}
