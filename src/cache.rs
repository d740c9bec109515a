// src/cache.rs

//! Recently-submitted URL cache.
//!
//! A bounded-by-time membership set: a URL successfully submitted within the
//! configured TTL is skipped on resubmission. Expiry is lazy — entries are
//! checked and evicted on read, never swept proactively — so `len()` may
//! over-report until each stale entry is touched.

use std::collections::HashMap;

use tokio::time::{Duration, Instant};

use crate::models::CacheConfig;

/// Membership set of recently, successfully submitted URLs.
#[derive(Debug)]
pub struct UrlCache {
    entries: HashMap<String, Instant>,
    enabled: bool,
    ttl: Duration,
}

impl UrlCache {
    /// Create a cache with the given policy.
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            enabled: config.enabled,
            ttl: Duration::from_secs(config.ttl_secs),
        }
    }

    /// Whether `url` was submitted within the TTL.
    ///
    /// Evicts the entry and reports absent when it has expired.
    pub fn has(&mut self, url: &str) -> bool {
        if !self.enabled {
            return false;
        }

        let Some(stored) = self.entries.get(url) else {
            return false;
        };

        if stored.elapsed() > self.ttl {
            self.entries.remove(url);
            return false;
        }

        true
    }

    /// Record `url` as submitted now. No-op when caching is disabled.
    pub fn add(&mut self, url: &str) {
        if self.enabled {
            self.entries.insert(url.to_string(), Instant::now());
        }
    }

    /// Record every URL in `urls` as submitted now.
    pub fn add_batch<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if !self.enabled {
            return;
        }
        let now = Instant::now();
        for url in urls {
            self.entries.insert(url.as_ref().to_string(), now);
        }
    }

    /// Remove all entries, regardless of the enabled flag.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Count of stored entries, possibly including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache(enabled: bool, ttl_secs: u64) -> UrlCache {
        UrlCache::new(&CacheConfig { enabled, ttl_secs })
    }

    #[test]
    fn disabled_cache_never_hits() {
        let mut c = cache(false, 60);
        c.add("https://x/a");
        assert!(!c.has("https://x/a"));
        assert!(c.is_empty());
    }

    #[test]
    fn add_then_has() {
        let mut c = cache(true, 60);
        assert!(!c.has("https://x/a"));
        c.add("https://x/a");
        assert!(c.has("https://x/a"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn lookup_is_case_sensitive_exact_match() {
        let mut c = cache(true, 60);
        c.add("https://x/A");
        assert!(!c.has("https://x/a"));
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let mut c = cache(true, 60);
        c.add("https://x/a");

        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(c.has("https://x/a"));

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!c.has("https://x/a"));
        // Expired entry was evicted on read
        assert!(c.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn len_over_reports_until_read_touches_entry() {
        let mut c = cache(true, 60);
        c.add_batch(["https://x/a", "https://x/b"]);

        tokio::time::advance(Duration::from_secs(61)).await;
        // Eviction is lazy; nothing has been read yet
        assert_eq!(c.len(), 2);

        assert!(!c.has("https://x/a"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn clear_works_even_when_disabled() {
        let mut c = cache(true, 60);
        c.add("https://x/a");
        let mut d = cache(false, 60);
        d.clear();
        c.clear();
        assert!(c.is_empty());
    }
}
