//! Conversion state definitions.

use chrono::{DateTime, Utc};
use fxconvert_common::{DEFAULT_FROM_CURRENCY, DEFAULT_TO_CURRENCY};
use serde::Serialize;

/// Everything a front end renders for one conversion session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionState {
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Amount as typed, not yet parsed.
    pub amount: String,
    pub converted_amount: Option<f64>,
    /// Units of `to_currency` per unit of `from_currency`.
    pub exchange_rate: Option<f64>,
    /// A conversion is in flight.
    pub loading: bool,
    /// User-facing message for the last failure.
    pub error: Option<String>,
    /// Upstream update time of the rate in use.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for ConversionState {
    fn default() -> Self {
        Self {
            from_currency: DEFAULT_FROM_CURRENCY.to_string(),
            to_currency: DEFAULT_TO_CURRENCY.to_string(),
            amount: String::new(),
            converted_amount: None,
            exchange_rate: None,
            loading: false,
            error: None,
            last_updated: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = ConversionState::default();
        assert_eq!(state.from_currency, "USD");
        assert_eq!(state.to_currency, "EUR");
        assert!(state.amount.is_empty());
        assert!(!state.loading);
        assert!(state.converted_amount.is_none());
    }
}
