//! Conversion orchestrator.
//!
//! [`Converter`] owns a [`ConversionState`] and is the only thing that mutates
//! it. Front ends read snapshots with [`Converter::state`] or follow changes
//! through [`Converter::subscribe`].
//!
//! Overlapping calls to [`Converter::convert`] are not serialized. Each call
//! writes its own outcome when it resolves, so the last response wins, and an
//! in-flight call still lands after the inputs have changed.

use std::sync::Arc;

use chrono::Utc;
use fxconvert_fx::{FxError, RateFetcher};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::state::ConversionState;
use crate::storage::{self, KeyValueStore, PersistedConversion};

/// Parse a typed amount, accepting only finite values above zero.
fn parse_amount(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite() && *amount > 0.0)
}

/// Holds conversion state and applies user operations to it.
pub struct Converter {
    state: watch::Sender<ConversionState>,
    fetcher: Arc<RateFetcher>,
    store: Arc<dyn KeyValueStore>,
}

impl Converter {
    /// Create a converter with default state.
    pub fn new(fetcher: Arc<RateFetcher>, store: Arc<dyn KeyValueStore>) -> Self {
        let (state, _) = watch::channel(ConversionState::default());
        Self {
            state,
            fetcher,
            store,
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ConversionState {
        self.state.borrow().clone()
    }

    /// Receive every subsequent state change.
    pub fn subscribe(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }

    pub fn set_from_currency(&self, code: impl Into<String>) {
        let code = code.into();
        self.state.send_modify(|s| s.from_currency = code);
    }

    pub fn set_to_currency(&self, code: impl Into<String>) {
        let code = code.into();
        self.state.send_modify(|s| s.to_currency = code);
    }

    /// Replace the typed amount. Callers filter keystrokes with
    /// [`fxconvert_common::is_amount_input`]; no validation happens here.
    pub fn set_amount(&self, amount: impl Into<String>) {
        let amount = amount.into();
        self.state.send_modify(|s| s.amount = amount);
    }

    /// Convert the current amount using a live (or cached) rate.
    ///
    /// Failures are reported through `error` in the state.
    #[instrument(skip(self))]
    pub async fn convert(&self) {
        let (text, from, to) = {
            let state = self.state.borrow();
            (
                state.amount.clone(),
                state.from_currency.clone(),
                state.to_currency.clone(),
            )
        };

        let Some(amount) = parse_amount(&text) else {
            debug!(amount = %text, "Rejected amount");
            self.state
                .send_modify(|s| s.error = Some(FxError::InvalidInput.to_string()));
            return;
        };

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });

        match self.fetcher.convert(amount, &from, &to).await {
            Ok(result) => {
                info!(
                    from = %from,
                    to = %to,
                    amount,
                    converted_amount = result.converted_amount,
                    rate = result.rate,
                    "Converted"
                );

                self.state.send_modify(|s| {
                    s.converted_amount = Some(result.converted_amount);
                    s.exchange_rate = Some(result.rate);
                    s.last_updated = Some(result.timestamp);
                    s.loading = false;
                });

                let persisted = PersistedConversion {
                    from_currency: from,
                    to_currency: to,
                    amount: text,
                    converted_amount: result.converted_amount,
                    rate: result.rate,
                    timestamp: Utc::now(),
                };
                if let Err(e) = storage::save_last_conversion(self.store.as_ref(), &persisted) {
                    warn!(error = %e, "Failed to persist last conversion");
                }
            }
            Err(e) => {
                if e.is_transport() {
                    warn!(from = %from, to = %to, error = %e, "Conversion failed");
                } else {
                    info!(from = %from, to = %to, error = %e, "Conversion rejected");
                }
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.converted_amount = None;
                    s.exchange_rate = None;
                    s.loading = false;
                });
            }
        }
    }

    /// Swap source and target currencies.
    ///
    /// With a result on screen, the amounts trade places and the rate is
    /// inverted locally. Nothing is refetched.
    pub fn swap_currencies(&self) {
        self.state.send_modify(|s| {
            std::mem::swap(&mut s.from_currency, &mut s.to_currency);

            let Some(converted) = s.converted_amount else {
                return;
            };
            if s.amount.is_empty() {
                return;
            }

            let previous_amount = s.amount.trim().parse::<f64>().ok();
            s.amount = converted.to_string();
            s.converted_amount = previous_amount;

            if let Some(rate) = s.exchange_rate.filter(|rate| *rate != 0.0) {
                s.exchange_rate = Some(1.0 / rate);
            }
        });
        debug!("Swapped currencies");
    }

    /// Clear the amount and any result. Currencies are kept.
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            s.amount.clear();
            s.converted_amount = None;
            s.exchange_rate = None;
            s.error = None;
            s.last_updated = None;
        });
        debug!("Reset conversion");
    }

    /// Restore inputs and result from a persisted conversion.
    ///
    /// `last_updated` is left alone and staleness is not checked.
    pub fn load_last_conversion(&self, last: Option<PersistedConversion>) {
        let Some(last) = last else {
            return;
        };
        debug!(from = %last.from_currency, to = %last.to_currency, "Loaded last conversion");
        self.state.send_modify(|s| {
            s.from_currency = last.from_currency;
            s.to_currency = last.to_currency;
            s.amount = last.amount;
            s.converted_amount = Some(last.converted_amount);
            s.exchange_rate = Some(last.rate);
        });
    }

    /// Read the persisted conversion from storage and load it.
    pub fn restore_last_conversion(&self) {
        self.load_last_conversion(storage::load_last_conversion(self.store.as_ref()));
    }

    /// Drop cached rates so the next conversion hits the network.
    pub fn clear_cache(&self) {
        self.fetcher.clear_cache();
    }
}
