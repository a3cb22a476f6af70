//! Timing constants for rate fetching.

use chrono::Duration;

/// How long a fetched rate snapshot may be reused (1 hour).
pub fn cache_duration() -> Duration {
    Duration::hours(1)
}

/// Upstream request timeout (10 seconds).
pub fn request_timeout() -> std::time::Duration {
    std::time::Duration::from_secs(10)
}
