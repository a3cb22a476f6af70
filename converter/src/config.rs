//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use fxconvert_fx::{FetcherConfig, RateCacheConfig};

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Rate fetcher configuration.
    pub fetcher: FetcherConfig,
    /// Local storage file.
    pub storage_path: PathBuf,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
}

fn default_storage_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fxconvert")
        .join("storage.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            storage_path: default_storage_path(),
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FX_API_BASE_URL") {
            config.fetcher.base_url = url;
        }

        if let Ok(secs) = std::env::var("FX_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.fetcher.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(secs) = std::env::var("FX_CACHE_TTL_SECS") {
            if let Some(ttl) = secs.parse().ok().and_then(chrono::Duration::try_seconds) {
                config.fetcher.cache = RateCacheConfig { ttl };
            }
        }

        if let Ok(path) = std::env::var("FXCONVERT_STORAGE_PATH") {
            config.storage_path = PathBuf::from(path);
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.fetcher.base_url.trim();
        if url.is_empty() {
            return Err("API base URL cannot be empty".to_string());
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(format!("API base URL must be http(s): {}", url));
        }

        if self.fetcher.request_timeout.is_zero() {
            return Err("Request timeout cannot be 0".to_string());
        }

        if self.fetcher.cache.ttl < chrono::Duration::zero() {
            return Err("Cache TTL cannot be negative".to_string());
        }

        if self.storage_path.as_os_str().is_empty() {
            return Err("Storage path cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fetcher.request_timeout, Duration::from_secs(10));
        assert_eq!(config.fetcher.cache.ttl, chrono::Duration::hours(1));
        assert!(config.storage_path.ends_with(".fxconvert/storage.json"));
    }

    #[test]
    fn test_from_env_ignores_unusable_ttl() {
        std::env::set_var("FX_CACHE_TTL_SECS", "100000000000000000");
        let oversized = AppConfig::from_env();
        std::env::set_var("FX_CACHE_TTL_SECS", "not-a-number");
        let garbage = AppConfig::from_env();
        std::env::set_var("FX_CACHE_TTL_SECS", "90");
        let custom = AppConfig::from_env();
        std::env::remove_var("FX_CACHE_TTL_SECS");

        assert_eq!(oversized.fetcher.cache.ttl, chrono::Duration::hours(1));
        assert_eq!(garbage.fetcher.cache.ttl, chrono::Duration::hours(1));
        assert_eq!(custom.fetcher.cache.ttl, chrono::Duration::seconds(90));
    }

    #[test]
    fn test_invalid_config() {
        let mut config = AppConfig::default();
        config.fetcher.base_url = "ftp://rates".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.fetcher.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.storage_path = PathBuf::new();
        assert!(config.validate().is_err());
    }
}
