// src/limiter.rs

//! Outbound submission rate limiter.
//!
//! A sliding-window limiter, not a token bucket: bursts up to the per-minute
//! cap pass back-to-back, after which callers are suspended until the oldest
//! operation in the trailing 60-second window ages out.

use tokio::time::{Duration, Instant, sleep};

use crate::models::RateLimitConfig;

/// Length of the rolling window.
const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window limiter over recent operation timestamps.
#[derive(Debug)]
pub struct RateLimiter {
    operations: Vec<Instant>,
    max_per_minute: usize,
}

impl RateLimiter {
    /// Create a limiter with the given policy.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            operations: Vec::new(),
            max_per_minute: config.max_requests_per_minute,
        }
    }

    /// Gate one submission operation.
    ///
    /// Suspends the caller when the window is full, for exactly
    /// `60s - (now - oldest)` clamped to zero, then records the operation.
    /// Timestamps are appended in order, so the oldest survivor is first.
    pub async fn check_limit(&mut self) {
        let now = Instant::now();
        self.operations
            .retain(|t| now.duration_since(*t) < WINDOW);

        if self.operations.len() >= self.max_per_minute {
            if let Some(oldest) = self.operations.first() {
                let wait = WINDOW.saturating_sub(now.duration_since(*oldest));
                if !wait.is_zero() {
                    log::info!(
                        "Rate limit reached ({} ops/min), waiting {:.1}s",
                        self.max_per_minute,
                        wait.as_secs_f64()
                    );
                    sleep(wait).await;
                }
            }
        }

        self.operations.push(Instant::now());
    }

    /// Operations currently recorded in the window (pruned on `check_limit`).
    pub fn window_len(&self) -> usize {
        self.operations.len()
    }
}
