//! Sync client configuration

/// Remote store connection settings
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | REMOTE_STORE_URL | hosted store of this deployment | Base URL of the KV tree |
/// | REMOTE_TIMEOUT_MS | 8000 | Per-request time budget |
/// | REMOTE_MAX_RETRIES | 3 | Attempts before falling back to local-only |
/// | REMOTE_RETRY_DELAY_MS | 500 | First backoff delay (doubles per attempt) |
/// | REMOTE_PROBE_INTERVAL_SECS | 30 | Background connectivity probe period |
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the hosted key-value tree
    pub base_url: String,
    /// Per-request time budget (milliseconds)
    pub request_timeout_ms: u64,
    /// Max attempts per write before giving up
    pub max_retries: u32,
    /// First retry delay; doubles on every further attempt
    pub initial_retry_delay_ms: u64,
    /// Background connectivity probe period (seconds)
    pub probe_interval_secs: u64,
}

impl SyncConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("REMOTE_STORE_URL")
                .unwrap_or_else(|_| "https://marula-orders-default-rtdb.firebaseio.com".into()),
            request_timeout_ms: std::env::var("REMOTE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8_000),
            max_retries: std::env::var("REMOTE_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3),
            initial_retry_delay_ms: std::env::var("REMOTE_RETRY_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            probe_interval_secs: std::env::var("REMOTE_PROBE_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Point at a different store, typically for tests.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.base_url = base_url.into().trim_end_matches('/').to_string();
        config
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
