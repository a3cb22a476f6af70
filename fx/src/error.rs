//! FX fetcher error types.

use thiserror::Error;

/// Errors surfaced while fetching rates or converting amounts.
///
/// Display strings are user-facing and shown as-is.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FxError {
    /// Amount missing, non-numeric, or not strictly positive.
    #[error("Please enter a valid amount")]
    InvalidInput,

    /// Upstream did not answer within the request timeout.
    #[error("Request timeout. Please check your internet connection.")]
    Timeout,

    /// Upstream answered with a non-success status.
    #[error("API Error: {status} - {reason}")]
    Upstream { status: u16, reason: String },

    /// Request was sent but nothing came back (connection or DNS failure).
    #[error("No response from server. Please check your internet connection.")]
    NoResponse,

    /// Any other failure building, sending or decoding the request.
    #[error("An unexpected error occurred. Please try again.")]
    Unknown(String),

    /// Upstream has no rate for the requested target currency.
    #[error("Exchange rate not found for {0}")]
    RateNotFound(String),
}

impl FxError {
    /// Whether the failure came from the network rather than the input.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FxError::Timeout | FxError::Upstream { .. } | FxError::NoResponse | FxError::Unknown(_)
        )
    }
}

/// Result type for FX operations.
pub type FxResult<T> = Result<T, FxError>;
