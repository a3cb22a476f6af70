//! Rate provider trait and implementations.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{FxError, FxResult};
use crate::snapshot::RateSnapshot;

/// Source of exchange rates.
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Fetch the latest rates quoted from `base`.
    async fn fetch_latest(&self, base: &str) -> FxResult<RateSnapshot>;
}

/// Body of a `latest/{base}` response. Other fields are ignored.
#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    /// `null` entries are treated as missing.
    #[serde(default)]
    rates: HashMap<String, Option<f64>>,
    /// Unix seconds.
    time_last_updated: Option<i64>,
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn format_reqwest_error(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        let cause_msg = cause.to_string();
        if !cause_msg.is_empty() && !message.contains(&cause_msg) {
            message.push_str(": ");
            message.push_str(&cause_msg);
        }
        source = cause.source();
    }

    message
}

/// Map a transport failure onto the user-facing taxonomy.
fn classify(err: reqwest::Error) -> FxError {
    if err.is_timeout() {
        FxError::Timeout
    } else if let Some(status) = err.status() {
        FxError::Upstream {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        }
    } else if err.is_connect() || err.is_request() {
        FxError::NoResponse
    } else {
        FxError::Unknown(format_reqwest_error(&err))
    }
}

/// ExchangeRate-API (`/v4/latest/{base}`) client.
#[derive(Debug, Clone)]
pub struct ExchangeRateApiProvider {
    client: reqwest::Client,
    base_url: String,
}

impl ExchangeRateApiProvider {
    /// Create a provider whose requests give up after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> FxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FxError::Unknown(format_reqwest_error(&e)))?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a provider on top of a preconfigured client.
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: normalize_base_url(base_url),
        }
    }

    fn url(&self, base: &str) -> String {
        format!("{}/{}", self.base_url, base)
    }
}

#[async_trait]
impl RateProvider for ExchangeRateApiProvider {
    fn name(&self) -> &str {
        "exchangerate-api"
    }

    async fn fetch_latest(&self, base: &str) -> FxResult<RateSnapshot> {
        let url = self.url(base);
        info!(base = %base, "Fetching exchange rates");

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!(url = %url, error = %format_reqwest_error(&e), "Rate request failed");
            classify(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "Upstream returned error status");
            return Err(FxError::Upstream {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: LatestRatesResponse = response.json().await.map_err(|e| {
            warn!(url = %url, error = %format_reqwest_error(&e), "Failed to read rate response");
            classify(e)
        })?;

        debug!(base = %base, rates = body.rates.len(), "Received exchange rates");

        let rates = body
            .rates
            .into_iter()
            .filter_map(|(code, rate)| rate.map(|rate| (code, rate)))
            .collect();
        let mut snapshot = RateSnapshot::new(base, rates);
        if let Some(updated) = body
            .time_last_updated
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
        {
            snapshot = snapshot.with_source_updated_at(updated);
        }
        Ok(snapshot)
    }
}

/// Mock rate provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub struct MockRateProvider {
    name: String,
    rates: parking_lot::Mutex<HashMap<String, HashMap<String, f64>>>,
    source_updated_at: parking_lot::Mutex<Option<chrono::DateTime<chrono::Utc>>>,
    failure: parking_lot::Mutex<Option<FxError>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(any(test, feature = "test-utils"))]
impl MockRateProvider {
    /// Create a new mock provider with no rates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rates: parking_lot::Mutex::new(HashMap::new()),
            source_updated_at: parking_lot::Mutex::new(None),
            failure: parking_lot::Mutex::new(None),
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Set the rate from `base` to `quote`.
    pub fn set_rate(&self, base: &str, quote: &str, rate: f64) {
        self.rates
            .lock()
            .entry(base.to_string())
            .or_default()
            .insert(quote.to_string(), rate);
    }

    /// Report this upstream update time on every snapshot.
    pub fn set_source_updated_at(&self, updated: chrono::DateTime<chrono::Utc>) {
        *self.source_updated_at.lock() = Some(updated);
    }

    /// Fail every fetch with `error` until cleared with `None`.
    pub fn set_failure(&self, error: Option<FxError>) {
        *self.failure.lock() = error;
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateProvider for MockRateProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_latest(&self, base: &str) -> FxResult<RateSnapshot> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        let rates = self
            .rates
            .lock()
            .get(base)
            .cloned()
            .ok_or_else(|| FxError::Upstream {
                status: 404,
                reason: "Not Found".to_string(),
            })?;

        let mut snapshot = RateSnapshot::new(base, rates);
        if let Some(updated) = *self.source_updated_at.lock() {
            snapshot = snapshot.with_source_updated_at(updated);
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn http_response(status_line: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        )
    }

    /// Serve one canned response on a loopback port and return its URL.
    async fn serve_once(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}/v4/latest", addr)
    }

    fn provider(base_url: &str, timeout: Duration) -> ExchangeRateApiProvider {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .unwrap();
        ExchangeRateApiProvider::with_client(base_url, client)
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(" http://x/v4/latest/ "), "http://x/v4/latest");
        let p = provider("http://x/v4/latest/", Duration::from_secs(1));
        assert_eq!(p.url("USD"), "http://x/v4/latest/USD");
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let body = r#"{"base":"USD","time_last_updated":1700000000,"rates":{"USD":1,"EUR":0.92,"JPY":149.5}}"#;
        let url = serve_once(http_response("200 OK", body)).await;

        let snapshot = provider(&url, Duration::from_secs(5))
            .fetch_latest("USD")
            .await
            .unwrap();

        assert_eq!(snapshot.base_currency, "USD");
        assert_eq!(snapshot.rate("EUR"), Some(0.92));
        assert_eq!(snapshot.rate("JPY"), Some(149.5));
        assert_eq!(
            snapshot.source_updated_at,
            DateTime::from_timestamp(1_700_000_000, 0)
        );
    }

    #[tokio::test]
    async fn test_fetch_without_update_time() {
        let url = serve_once(http_response("200 OK", r#"{"rates":{"EUR":0.5}}"#)).await;

        let snapshot = provider(&url, Duration::from_secs(5))
            .fetch_latest("USD")
            .await
            .unwrap();

        assert_eq!(snapshot.source_updated_at, None);
    }

    #[tokio::test]
    async fn test_null_rate_dropped() {
        let body = r#"{"rates":{"EUR":0.9,"XYZ":null}}"#;
        let url = serve_once(http_response("200 OK", body)).await;

        let snapshot = provider(&url, Duration::from_secs(5))
            .fetch_latest("USD")
            .await
            .unwrap();

        assert_eq!(snapshot.rate("EUR"), Some(0.9));
        assert_eq!(snapshot.rate("XYZ"), None);
        assert_eq!(snapshot.rates.len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let url = serve_once(http_response("503 Service Unavailable", "{}")).await;

        let err = provider(&url, Duration::from_secs(5))
            .fetch_latest("USD")
            .await
            .unwrap_err();

        assert_eq!(
            err,
            FxError::Upstream {
                status: 503,
                reason: "Service Unavailable".to_string()
            }
        );
        assert_eq!(err.to_string(), "API Error: 503 - Service Unavailable");
    }

    #[tokio::test]
    async fn test_connection_refused_is_no_response() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = provider(&format!("http://{}", addr), Duration::from_secs(5))
            .fetch_latest("USD")
            .await
            .unwrap_err();

        assert_eq!(err, FxError::NoResponse);
    }

    #[tokio::test]
    async fn test_stalled_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let err = provider(&format!("http://{}", addr), Duration::from_millis(100))
            .fetch_latest("USD")
            .await
            .unwrap_err();

        assert_eq!(err, FxError::Timeout);
    }

    #[tokio::test]
    async fn test_malformed_body_is_unknown() {
        let url = serve_once(http_response("200 OK", "not json")).await;

        let err = provider(&url, Duration::from_secs(5))
            .fetch_latest("USD")
            .await
            .unwrap_err();

        assert!(matches!(err, FxError::Unknown(_)));
    }

    #[tokio::test]
    async fn test_mock_provider() {
        let mock = MockRateProvider::new("test");
        mock.set_rate("USD", "EUR", 0.9);

        let snapshot = mock.fetch_latest("USD").await.unwrap();
        assert_eq!(snapshot.rate("EUR"), Some(0.9));
        assert_eq!(mock.calls(), 1);

        mock.set_failure(Some(FxError::Timeout));
        assert_eq!(mock.fetch_latest("USD").await.unwrap_err(), FxError::Timeout);
        assert_eq!(mock.calls(), 2);
    }
}
