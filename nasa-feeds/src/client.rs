//! Dispatch layer: one entry point per source with caching and in-flight collapse.

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use nasa_cache::{CacheStats, SourceCache};
use nasa_core::config::{resolve_api_key, DriverConfig, Endpoints};
use nasa_core::constants::FETCH_TIMEOUT_SECS;
use nasa_core::error::{NasaError, Result};
use nasa_core::traits::JsonTransport;
use nasa_core::types::{MediaTriple, SourceId};

use crate::fetchers::{self, FeedContext};
use crate::transport::{HttpTransport, TransportConfig};

/// Client configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// NASA API key; empty means the public demo key
    pub api_key: String,
    /// Ceiling for one dispatched fetch, in milliseconds
    pub fetch_timeout_ms: u64,
    /// Upstream URLs
    pub endpoints: Endpoints,
    /// HTTP transport settings
    pub transport: TransportConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            fetch_timeout_ms: FETCH_TIMEOUT_SECS * 1000,
            endpoints: Endpoints::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Client settings for a persisted driver configuration.
    pub fn from_driver(config: &DriverConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            ..Default::default()
        }
    }

    /// Points every feed at a single base URL.
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.endpoints = Endpoints::with_base(base);
        self
    }
}

/// Marks a source as having a fetch in flight; cleared on drop.
///
/// Dropping covers every exit path, including the fetch future being
/// cancelled by a timeout or by its caller.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Front door for the six feeds.
///
/// Every call returns a displayable [`MediaTriple`]; failures turn into
/// placeholder text, never into errors. At most one upstream fetch per source
/// runs at a time: a caller arriving while one is in flight gets the last
/// cached record (or a "connecting" placeholder) immediately.
pub struct NasaClient {
    config: ClientConfig,
    api_key: String,
    transport: Arc<dyn JsonTransport>,
    cache: SourceCache,
    in_flight: [AtomicBool; SourceId::COUNT],
}

impl NasaClient {
    /// Creates a client with the default configuration and the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig {
            api_key: api_key.into(),
            ..Default::default()
        })
    }

    /// Creates a client backed by a pooled HTTP transport.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::with_config(config.transport.clone())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over any transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn JsonTransport>) -> Self {
        let api_key = resolve_api_key(&config.api_key).to_string();
        Self {
            config,
            api_key,
            transport,
            cache: SourceCache::new(),
            in_flight: Default::default(),
        }
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The credential actually sent upstream.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The underlying cache.
    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    /// Cache diagnostics for every source.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Fetches by wire identifier. Unknown identifiers yield the unknown-source triple.
    pub async fn fetch(&self, source_id: &str) -> MediaTriple {
        match source_id.parse::<SourceId>() {
            Ok(source) => self.fetch_source(source).await,
            Err(e) => {
                warn!(error = %e, "Unknown source requested");
                MediaTriple::unknown_source()
            }
        }
    }

    /// Fetches one source, serving the cache while it is fresh.
    #[instrument(skip(self))]
    pub async fn fetch_source(&self, source: SourceId) -> MediaTriple {
        let Some(_guard) = InFlight::try_acquire(&self.in_flight[source.index()]) else {
            debug!("Request in progress, using cache");
            return self.in_flight_fallback(source);
        };

        if let Some(triple) = self.cache.get_fresh(source) {
            debug!("Cache hit");
            return triple;
        }

        info!("Fetching live data");
        let ceiling = Duration::from_millis(self.config.fetch_timeout_ms);
        let work = AssertUnwindSafe(self.fetch_uncached(source)).catch_unwind();

        match tokio::time::timeout(ceiling, work).await {
            Err(_) => {
                let e = NasaError::FetchTimeout {
                    feed: source,
                    seconds: ceiling.as_secs(),
                };
                warn!(error = %e, timeout_ms = self.config.fetch_timeout_ms, "Live data timeout");
                MediaTriple::timeout(source)
            }
            Ok(Err(_panic)) => {
                error!("Fetcher panicked");
                MediaTriple::service_error(source)
            }
            Ok(Ok(Ok(triple))) => {
                info!("Live data complete");
                self.cache.put(source, triple.clone());
                triple
            }
            Ok(Ok(Err(e))) if e.is_feed_error() => {
                warn!(error = %e, recoverable = e.is_recoverable(), "Feed offline");
                MediaTriple::offline(source)
            }
            Ok(Ok(Err(e))) => {
                error!(error = %e, "Live data error");
                MediaTriple::service_error(source)
            }
        }
    }

    /// Runs the fetcher for `source` directly: no cache, no in-flight flag, no ceiling.
    pub async fn fetch_uncached(&self, source: SourceId) -> Result<MediaTriple> {
        let ctx = FeedContext {
            transport: self.transport.as_ref(),
            endpoints: &self.config.endpoints,
            api_key: &self.api_key,
        };
        fetchers::fetch(source, &ctx).await
    }

    /// Fetches every source concurrently, in catalog order.
    pub async fn fetch_all(&self) -> Vec<(SourceId, MediaTriple)> {
        let results = join_all(SourceId::ALL.map(|source| self.fetch_source(source))).await;
        SourceId::ALL.into_iter().zip(results).collect()
    }

    fn in_flight_fallback(&self, source: SourceId) -> MediaTriple {
        match self.cache.get(source) {
            Some(mut cached) => {
                if !source.carries_image() {
                    cached.image_url.clear();
                }
                cached
            }
            None => MediaTriple::connecting(),
        }
    }
}
