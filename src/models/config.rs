// src/models/config.rs

//! IndexNow client configuration.
//!
//! Configuration is an immutable value object: built once from compiled-in
//! defaults, optionally a TOML file, and per-field environment overrides,
//! then handed to the client at construction.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Result;

/// Root IndexNow configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexNowConfig {
    /// Base URL of the site whose pages are submitted
    #[serde(default = "defaults::site_url")]
    pub site_url: String,

    /// IndexNow API key
    #[serde(default = "defaults::api_key")]
    pub api_key: String,

    /// URL where the key file is hosted (key-ownership verification)
    #[serde(default = "defaults::key_location")]
    pub key_location: String,

    /// Search-engine submission endpoints, tried in order
    #[serde(default = "defaults::endpoints")]
    pub endpoints: Vec<String>,

    /// Retry and backoff behavior
    #[serde(default)]
    pub retry: RetryConfig,

    /// Outbound rate limiting and batching
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Submitted-URL cache behavior
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Retry and exponential backoff settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retry attempts per endpoint (on top of the initial attempt)
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    #[serde(default = "defaults::initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound on any single backoff delay, in milliseconds
    #[serde(default = "defaults::max_delay_ms")]
    pub max_delay_ms: u64,

    /// Multiplier applied per attempt
    #[serde(default = "defaults::backoff_factor")]
    pub backoff_factor: f64,
}

/// Rate limiting and batching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submission operations per rolling 60-second window
    #[serde(default = "defaults::max_requests_per_minute")]
    pub max_requests_per_minute: usize,

    /// URLs per batch payload
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,

    /// Hard ceiling on batch size
    #[serde(default = "defaults::max_batch_size")]
    pub max_batch_size: usize,
}

/// Submitted-URL cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether successful submissions are remembered at all
    #[serde(default = "defaults::cache_enabled")]
    pub enabled: bool,

    /// How long a successful submission suppresses resubmission, in seconds
    #[serde(default = "defaults::cache_ttl_secs")]
    pub ttl_secs: u64,
}

impl IndexNowConfig {
    /// Build the effective configuration: defaults plus environment overrides.
    pub fn load() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Load from a TOML file or fall back to `load()` if loading fails.
    pub fn load_file_or_default(path: impl AsRef<Path>) -> Self {
        Self::load_file(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::load()
        })
    }

    /// Apply recognized environment variables on top of the current values.
    ///
    /// Each variable independently overrides its one field when present and
    /// non-empty; unparseable numeric values are ignored.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, get: impl Fn(&str) -> Option<String>) {
        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

        if let Some(v) = non_empty(get("INDEXNOW_SITE_URL")) {
            self.site_url = v;
        }
        if let Some(v) = non_empty(get("INDEXNOW_API_KEY")) {
            self.api_key = v;
        }
        if let Some(v) = non_empty(get("INDEXNOW_KEY_LOCATION")) {
            self.key_location = v;
        }
        if let Some(v) = non_empty(get("INDEXNOW_MAX_RETRIES")) {
            if let Ok(n) = v.parse() {
                self.retry.max_retries = n;
            }
        }
        if let Some(v) = non_empty(get("INDEXNOW_BATCH_SIZE")) {
            if let Ok(n) = v.parse() {
                self.rate_limit.batch_size = n;
            }
        }
    }

    /// Check the configuration for basic sanity.
    ///
    /// Returns `false` and logs a diagnostic for each problem found; never
    /// panics. Callers that cannot proceed without valid configuration
    /// (the client constructor) turn a `false` into a fatal error.
    pub fn validate(&self) -> bool {
        if self.site_url.is_empty() || self.api_key.is_empty() {
            log::error!("Invalid IndexNow config: site URL or API key is empty");
            return false;
        }

        if Url::parse(&self.site_url).is_err() || Url::parse(&self.key_location).is_err() {
            log::error!("Invalid IndexNow config: site URL or key location is not a valid URL");
            return false;
        }

        if self.endpoints.is_empty() {
            log::error!("Invalid IndexNow config: no submission endpoints configured");
            return false;
        }

        true
    }

    /// Host portion of the site URL, as sent in submission payloads.
    pub fn host(&self) -> Result<String> {
        let parsed = Url::parse(&self.site_url)?;
        Ok(parsed.host_str().unwrap_or_default().to_string())
    }
}

impl Default for IndexNowConfig {
    fn default() -> Self {
        Self {
            site_url: defaults::site_url(),
            api_key: defaults::api_key(),
            key_location: defaults::key_location(),
            endpoints: defaults::endpoints(),
            retry: RetryConfig::default(),
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            initial_delay_ms: defaults::initial_delay_ms(),
            max_delay_ms: defaults::max_delay_ms(),
            backoff_factor: defaults::backoff_factor(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests_per_minute: defaults::max_requests_per_minute(),
            batch_size: defaults::batch_size(),
            max_batch_size: defaults::max_batch_size(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::cache_enabled(),
            ttl_secs: defaults::cache_ttl_secs(),
        }
    }
}

mod defaults {
    // Site defaults
    pub fn site_url() -> String {
        "https://www.example.com".into()
    }
    pub fn api_key() -> String {
        "0123456789abcdef0123456789abcdef".into()
    }
    pub fn key_location() -> String {
        "https://www.example.com/0123456789abcdef0123456789abcdef.txt".into()
    }
    pub fn endpoints() -> Vec<String> {
        vec![
            "https://api.indexnow.org/indexnow".into(),
            "https://www.bing.com/indexnow".into(),
            "https://yandex.com/indexnow".into(),
        ]
    }

    // Retry defaults
    pub fn max_retries() -> u32 {
        3
    }
    pub fn initial_delay_ms() -> u64 {
        1000
    }
    pub fn max_delay_ms() -> u64 {
        10000
    }
    pub fn backoff_factor() -> f64 {
        2.0
    }

    // Rate limit defaults
    pub fn max_requests_per_minute() -> usize {
        10
    }
    pub fn batch_size() -> usize {
        100
    }
    pub fn max_batch_size() -> usize {
        10000
    }

    // Cache defaults
    pub fn cache_enabled() -> bool {
        true
    }
    pub fn cache_ttl_secs() -> u64 {
        24 * 60 * 60
    }
}
