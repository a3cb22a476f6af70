//! Conversion results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::RateSnapshot;

/// Outcome of converting an amount with a fetched rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// `amount * rate`.
    pub converted_amount: f64,
    /// Units of target per unit of source.
    pub rate: f64,
    /// Upstream update time, or the conversion time when upstream gave none.
    pub timestamp: DateTime<Utc>,
}

impl ConversionResult {
    /// Apply `rate` from `snapshot` to `amount`.
    pub fn from_snapshot(amount: f64, rate: f64, snapshot: &RateSnapshot) -> Self {
        Self {
            converted_amount: amount * rate,
            rate,
            timestamp: snapshot.source_updated_at.unwrap_or_else(Utc::now),
        }
    }
}
