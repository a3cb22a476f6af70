//! Fetched rate snapshots.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rates for one base currency as returned by a single upstream fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// Currency the rates are quoted from.
    pub base_currency: String,
    /// Units of each target currency per one unit of base.
    pub rates: HashMap<String, f64>,
    /// When this process fetched the snapshot.
    pub fetched_at: DateTime<Utc>,
    /// Update time reported by the upstream provider, if any.
    pub source_updated_at: Option<DateTime<Utc>>,
}

impl RateSnapshot {
    /// Create a snapshot fetched now.
    pub fn new(base_currency: impl Into<String>, rates: HashMap<String, f64>) -> Self {
        Self {
            base_currency: base_currency.into(),
            rates,
            fetched_at: Utc::now(),
            source_updated_at: None,
        }
    }

    /// Set the upstream-reported update time.
    pub fn with_source_updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.source_updated_at = Some(updated_at);
        self
    }

    /// Rate for a target currency.
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied()
    }

    /// Age of the snapshot relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.fetched_at)
    }

    /// Whether the snapshot may still serve requests for `base`.
    pub fn is_fresh_for(&self, base: &str, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.base_currency == base && self.age(now) < ttl
    }
}
