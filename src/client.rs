// src/client.rs

//! IndexNow submission client.
//!
//! Orchestrates single-URL and batch submission: deduplicates input, filters
//! cached URLs, chunks batches, gates on the rate limiter, dispatches the
//! payload to every configured endpoint concurrently with retry/backoff, and
//! aggregates per-endpoint outcomes into one response.

use std::time::Duration;

use futures::future;
use reqwest::StatusCode;
use serde::Serialize;
use tokio::sync::Mutex;
use url::Url;

use crate::cache::UrlCache;
use crate::error::{AppError, Result};
use crate::limiter::RateLimiter;
use crate::models::{CacheStats, EndpointResult, IndexNowConfig, RetryConfig, SubmitResponse};

/// Per-request timeout; the only cancellation mechanism.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Static pause between batch chunks, on top of the rate limiter.
const INTER_CHUNK_DELAY: Duration = Duration::from_millis(1000);

/// Top-level site routes submitted by `submit_site_pages`.
const SITE_PAGES: [&str; 5] = ["/", "/about/", "/friends/", "/archive/", "/gallery/"];

/// Outbound submission payload, single-URL or batch form.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitPayload<'a> {
    host: &'a str,
    key: &'a str,
    key_location: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url_list: Option<&'a [String]>,
}

/// Client for pushing URL change notifications to search engines.
///
/// Cache and rate-limiter state are owned by the instance; construct one per
/// calling context (CLI invocation, server process) and share it explicitly.
pub struct IndexNowClient {
    config: IndexNowConfig,
    host: String,
    http: reqwest::Client,
    cache: Mutex<UrlCache>,
    limiter: Mutex<RateLimiter>,
}

impl IndexNowClient {
    /// Create a client from validated configuration.
    ///
    /// Fails with a configuration error when validation does not pass; no
    /// submission is possible without valid configuration.
    pub fn new(config: IndexNowConfig) -> Result<Self> {
        if !config.validate() {
            return Err(AppError::config("IndexNow configuration is invalid"));
        }

        let host = config.host()?;
        let http = reqwest::Client::builder()
            .user_agent(format!("IndexNow-Client/1.0 (+{})", config.site_url))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        let cache = Mutex::new(UrlCache::new(&config.cache));
        let limiter = Mutex::new(RateLimiter::new(&config.rate_limit));

        Ok(Self {
            config,
            host,
            http,
            cache,
            limiter,
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &IndexNowConfig {
        &self.config
    }

    /// Submit a single URL to every configured endpoint.
    ///
    /// A cache hit returns immediately with `cached: 1` and no network call.
    /// Success means at least one endpoint accepted the payload; on success
    /// the URL is cached to suppress resubmission within the TTL.
    pub async fn submit_url(&self, url: &str) -> Result<SubmitResponse> {
        if self.cache.lock().await.has(url) {
            log::info!("URL already cached, skipping submission: {url}");
            return Ok(SubmitResponse {
                success: true,
                submitted: vec![url.to_string()],
                results: Vec::new(),
                total_processed: 1,
                failures: 0,
                cached: 1,
            });
        }

        let payload = SubmitPayload {
            host: &self.host,
            key: &self.config.api_key,
            key_location: &self.config.key_location,
            url: Some(url),
            url_list: None,
        };

        log::info!("Submitting URL: {url}");
        self.limiter.lock().await.check_limit().await;

        let results = self.dispatch(&payload).await;
        let failures = results.iter().filter(|r| r.is_failure()).count();
        let success = failures < self.config.endpoints.len();

        if success {
            self.cache.lock().await.add(url);
        }

        Ok(SubmitResponse {
            success,
            submitted: vec![url.to_string()],
            results,
            total_processed: 1,
            failures,
            cached: 0,
        })
    }

    /// Submit a list of URLs, batched.
    ///
    /// Deduplicates the input (stable, first occurrence wins), filters out
    /// cache-resident URLs, and submits the remainder in sequential chunks of
    /// at most `batch_size`, one second apart. A chunk's URLs are cached when
    /// fewer than all endpoints failed for that chunk. An empty input list is
    /// a programming error, not an empty success.
    pub async fn submit_urls(&self, urls: &[String]) -> Result<SubmitResponse> {
        if urls.is_empty() {
            return Err(AppError::validation("URL list must not be empty"));
        }

        let unique = dedupe_urls(urls);
        let duplicates = urls.len() - unique.len();
        if duplicates > 0 {
            log::info!("Removed {duplicates} duplicate URLs");
        }

        let mut cached = 0;
        let mut pending = Vec::new();
        {
            let mut cache = self.cache.lock().await;
            for url in unique {
                if cache.has(&url) {
                    cached += 1;
                } else {
                    pending.push(url);
                }
            }
        }
        if cached > 0 {
            log::info!("{cached} URLs already cached, skipping");
        }

        if pending.is_empty() {
            log::info!("No new URLs to submit");
            return Ok(SubmitResponse {
                success: true,
                submitted: urls.to_vec(),
                results: Vec::new(),
                total_processed: urls.len(),
                failures: 0,
                cached,
            });
        }

        let chunk_size = self.config.rate_limit.batch_size.max(1);
        let chunks: Vec<&[String]> = pending.chunks(chunk_size).collect();
        log::info!(
            "Submitting {} new URLs in {} chunk(s)",
            pending.len(),
            chunks.len()
        );

        let mut all_results = Vec::new();
        let mut total_failures = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            log::info!("Chunk {}/{} ({} URLs)", i + 1, chunks.len(), chunk.len());

            let payload = SubmitPayload {
                host: &self.host,
                key: &self.config.api_key,
                key_location: &self.config.key_location,
                url: None,
                url_list: Some(chunk),
            };

            self.limiter.lock().await.check_limit().await;

            let results = self.dispatch(&payload).await;
            let chunk_failures = results.iter().filter(|r| r.is_failure()).count();
            total_failures += chunk_failures;

            // At least one endpoint accepted this chunk
            if chunk_failures < self.config.endpoints.len() {
                self.cache.lock().await.add_batch(chunk.iter());
            }

            all_results.extend(results);

            if i < chunks.len() - 1 {
                tokio::time::sleep(INTER_CHUNK_DELAY).await;
            }
        }

        let success = total_failures < all_results.len();

        Ok(SubmitResponse {
            success,
            submitted: urls.to_vec(),
            results: all_results,
            total_processed: urls.len(),
            failures: total_failures,
            cached,
        })
    }

    /// Submit the site's fixed top-level routes.
    pub async fn submit_site_pages(&self) -> Result<SubmitResponse> {
        let base = Url::parse(&self.config.site_url)?;
        let pages = SITE_PAGES
            .iter()
            .map(|path| Ok(base.join(path)?.to_string()))
            .collect::<Result<Vec<_>>>()?;

        self.submit_urls(&pages).await
    }

    /// Current cache size and enabled flag.
    pub async fn cache_stats(&self) -> CacheStats {
        let cache = self.cache.lock().await;
        CacheStats {
            size: cache.len(),
            enabled: cache.is_enabled(),
        }
    }

    /// Drop all cached URLs.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
        log::info!("Submission cache cleared");
    }

    /// Send one payload to every endpoint concurrently and wait for all
    /// attempts, including their retries, to settle. A failing endpoint
    /// never aborts its siblings.
    async fn dispatch(&self, payload: &SubmitPayload<'_>) -> Vec<EndpointResult> {
        let attempts = self
            .config
            .endpoints
            .iter()
            .map(|endpoint| self.fetch_with_retry(endpoint, payload));
        future::join_all(attempts).await
    }

    /// POST the payload to one endpoint, retrying transient failures with
    /// exponential backoff. Returns the endpoint's settled outcome.
    async fn fetch_with_retry(
        &self,
        endpoint: &str,
        payload: &SubmitPayload<'_>,
    ) -> EndpointResult {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            let outcome = self.http.post(endpoint).json(payload).send().await;

            let message = match outcome {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let text = status.canonical_reason().unwrap_or("OK");
                        return EndpointResult::accepted(endpoint, status.as_u16(), text, attempt);
                    }

                    let message = format!(
                        "HTTP {}: {}",
                        status.as_u16(),
                        status.canonical_reason().unwrap_or("Unknown")
                    );
                    if !retryable_status(status) {
                        log::error!("{endpoint} failed terminally: {message}");
                        return EndpointResult::failed(endpoint, message, attempt);
                    }
                    message
                }
                Err(error) => {
                    let message = error.to_string();
                    if !retryable_transport_error(&error) {
                        log::error!("{endpoint} failed terminally: {message}");
                        return EndpointResult::failed(endpoint, message, attempt);
                    }
                    message
                }
            };

            if attempt == retry.max_retries {
                log::error!(
                    "{endpoint} failed after {} attempt(s): {message}",
                    attempt + 1
                );
                return EndpointResult::failed(endpoint, message, attempt);
            }

            log::warn!(
                "{endpoint} attempt {}/{} failed: {message}",
                attempt + 1,
                retry.max_retries + 1
            );
            tokio::time::sleep(retry_delay(retry, attempt)).await;
            attempt += 1;
        }
    }
}

/// Whether an HTTP status is worth retrying: server errors, throttling, and
/// request timeouts; every other status is terminal.
fn retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

/// Whether a transport error is worth retrying: timeouts and connection
/// failures (reset, refused, host not found).
fn retryable_transport_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect()
}

/// Exponential backoff delay for a retry attempt, capped at the configured
/// maximum. No jitter.
fn retry_delay(retry: &RetryConfig, attempt: u32) -> Duration {
    let delay = retry.initial_delay_ms as f64 * retry.backoff_factor.powi(attempt as i32);
    Duration::from_millis((delay as u64).min(retry.max_delay_ms))
}

/// Deduplicate a URL list, preserving first-occurrence order.
pub(crate) fn dedupe_urls(urls: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    urls.iter()
        .filter(|url| seen.insert(url.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IndexNowConfig;

    #[test]
    fn dedupe_preserves_first_occurrence_order() {
        let urls: Vec<String> = ["a", "b", "a", "c", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(dedupe_urls(&urls), vec!["a", "b", "c"]);
    }

    #[test]
    fn dedupe_never_grows_the_list() {
        let urls: Vec<String> = vec!["a".into(); 10];
        assert_eq!(dedupe_urls(&urls).len(), 1);
    }

    #[test]
    fn retry_delay_grows_exponentially_and_caps() {
        let retry = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 1000,
            max_delay_ms: 10000,
            backoff_factor: 2.0,
        };
        assert_eq!(retry_delay(&retry, 0), Duration::from_millis(1000));
        assert_eq!(retry_delay(&retry, 1), Duration::from_millis(2000));
        assert_eq!(retry_delay(&retry, 2), Duration::from_millis(4000));
        // 2^4 = 16s, capped at 10s
        assert_eq!(retry_delay(&retry, 4), Duration::from_millis(10000));
    }

    #[test]
    fn retryable_statuses() {
        assert!(retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(retryable_status(StatusCode::REQUEST_TIMEOUT));
        assert!(!retryable_status(StatusCode::NOT_FOUND));
        assert!(!retryable_status(StatusCode::FORBIDDEN));
        assert!(!retryable_status(StatusCode::UNPROCESSABLE_ENTITY));
    }

    #[test]
    fn constructor_rejects_invalid_config() {
        let mut config = IndexNowConfig::default();
        config.endpoints.clear();
        assert!(matches!(
            IndexNowClient::new(config),
            Err(AppError::Config(_))
        ));
    }

    #[tokio::test]
    async fn empty_batch_is_an_input_error() {
        let client = IndexNowClient::new(IndexNowConfig::default()).unwrap();
        assert!(matches!(
            client.submit_urls(&[]).await,
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn single_payload_shape() {
        let payload = SubmitPayload {
            host: "www.example.com",
            key: "k",
            key_location: "https://www.example.com/k.txt",
            url: Some("https://www.example.com/a/"),
            url_list: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["host"], "www.example.com");
        assert_eq!(json["keyLocation"], "https://www.example.com/k.txt");
        assert_eq!(json["url"], "https://www.example.com/a/");
        assert!(json.get("urlList").is_none());
    }

    #[test]
    fn batch_payload_shape() {
        let list = vec!["https://www.example.com/a/".to_string()];
        let payload = SubmitPayload {
            host: "www.example.com",
            key: "k",
            key_location: "https://www.example.com/k.txt",
            url: None,
            url_list: Some(&list),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("url").is_none());
        assert_eq!(json["urlList"][0], "https://www.example.com/a/");
    }
}
