//! fxconvert FX Fetcher
//!
//! Fetches exchange rates for a base currency from an upstream provider and
//! keeps the most recent result in a time-bounded single-slot cache.
//!
//! # Example
//!
//! ```rust,ignore
//! use fxconvert_fx::{FetcherConfig, RateFetcher};
//!
//! let fetcher = RateFetcher::from_config(FetcherConfig::default())?;
//!
//! let result = fetcher.convert(100.0, "USD", "EUR").await?;
//! println!("{} EUR at {}", result.converted_amount, result.rate);
//! ```

pub mod cache;
pub mod conversion;
pub mod engine;
pub mod error;
pub mod provider;
pub mod snapshot;

pub use cache::{RateCache, RateCacheConfig};
pub use conversion::ConversionResult;
pub use engine::{FetcherConfig, RateFetcher, DEFAULT_API_BASE_URL};
pub use error::{FxError, FxResult};
pub use provider::{ExchangeRateApiProvider, RateProvider};
pub use snapshot::RateSnapshot;

#[cfg(any(test, feature = "test-utils"))]
pub use provider::MockRateProvider;
