//! Rate fetcher: cache in front of a provider.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::cache::{RateCache, RateCacheConfig};
use crate::conversion::ConversionResult;
use crate::error::{FxError, FxResult};
use crate::provider::{ExchangeRateApiProvider, RateProvider};
use crate::snapshot::RateSnapshot;

/// ExchangeRate-API free tier endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://api.exchangerate-api.com/v4/latest";

/// Configuration for the rate fetcher.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Upstream endpoint; the base currency is appended as a path segment.
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Cache configuration.
    pub cache: RateCacheConfig,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: fxconvert_common::request_timeout(),
            cache: RateCacheConfig::default(),
        }
    }
}

/// Fetches rates through a single-slot cache.
pub struct RateFetcher {
    provider: Arc<dyn RateProvider>,
    cache: RateCache,
}

impl RateFetcher {
    /// Create a fetcher over the given provider.
    pub fn new(provider: Arc<dyn RateProvider>, config: FetcherConfig) -> Self {
        Self {
            provider,
            cache: RateCache::with_config(config.cache),
        }
    }

    /// Create a fetcher backed by ExchangeRate-API.
    pub fn from_config(config: FetcherConfig) -> FxResult<Self> {
        let provider = ExchangeRateApiProvider::new(&config.base_url, config.request_timeout)?;
        Ok(Self::new(Arc::new(provider), config))
    }

    /// Get rates quoted from `base`, from cache when fresh.
    ///
    /// A failed fetch leaves any cached snapshot in place.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn fetch_rates(&self, base: &str) -> FxResult<RateSnapshot> {
        if let Some(cached) = self.cache.get(base) {
            debug!("Using cached exchange rates");
            return Ok(cached);
        }

        let snapshot = self.provider.fetch_latest(base).await.map_err(|e| {
            warn!(error = %e, "Failed to fetch exchange rates");
            e
        })?;

        self.cache.store(snapshot.clone());
        Ok(snapshot)
    }

    /// Convert `amount` of `from` into `to`.
    #[instrument(skip(self))]
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> FxResult<ConversionResult> {
        let snapshot = self.fetch_rates(from).await?;

        let rate = snapshot
            .rate(to)
            .ok_or_else(|| FxError::RateNotFound(to.to_string()))?;

        let result = ConversionResult::from_snapshot(amount, rate, &snapshot);

        debug!(
            rate = result.rate,
            converted_amount = result.converted_amount,
            "Conversion completed"
        );

        Ok(result)
    }

    /// Drop the cached snapshot so the next fetch hits the network.
    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("Exchange rates cache cleared");
    }

    /// Access the cache.
    pub fn cache(&self) -> &RateCache {
        &self.cache
    }
}
