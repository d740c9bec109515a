// src/models/response.rs

//! Submission result types.
//!
//! One uniform response shape is shared by the library, the CLI, and the
//! HTTP endpoint; field names serialize camelCase for JSON callers.

use serde::{Deserialize, Serialize};

use super::IndexNowConfig;

/// Outcome of one endpoint's dispatch, including retries consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointResult {
    /// Endpoint the payload was sent to
    pub endpoint: String,

    /// HTTP status code, when a response was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// HTTP status text, when a response was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,

    /// Error description, when the endpoint ultimately failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Retry attempts consumed before settling
    pub retries: u32,
}

impl EndpointResult {
    /// Build a result for an endpoint that accepted the payload.
    pub fn accepted(endpoint: impl Into<String>, status: u16, text: &str, retries: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: Some(status),
            status_text: Some(text.to_string()),
            error: None,
            retries,
        }
    }

    /// Build a result for an endpoint that failed after exhausting retries
    /// or hitting a terminal error.
    pub fn failed(endpoint: impl Into<String>, error: impl Into<String>, retries: u32) -> Self {
        Self {
            endpoint: endpoint.into(),
            status: None,
            status_text: None,
            error: Some(error.into()),
            retries,
        }
    }

    /// Whether this endpoint's dispatch ultimately failed.
    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

/// Aggregated outcome of a single-URL or batch submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    /// True when strictly fewer per-endpoint results failed than settled
    pub success: bool,

    /// The URL(s) the caller asked to submit, as given
    pub submitted: Vec<String>,

    /// Per-endpoint outcomes across all dispatched chunks
    pub results: Vec<EndpointResult>,

    /// Original input length, duplicates and cache hits included
    pub total_processed: usize,

    /// Per-endpoint failures summed across chunks
    pub failures: usize,

    /// URLs served from the cache without a network call
    pub cached: usize,
}

impl SubmitResponse {
    /// Build the development-mode response: every configured endpoint
    /// reports 200 without any outbound call being made.
    pub fn simulated(config: &IndexNowConfig, submitted: Vec<String>) -> Self {
        let total = submitted.len();
        Self {
            success: true,
            submitted,
            results: config
                .endpoints
                .iter()
                .map(|endpoint| EndpointResult::accepted(endpoint, 200, "OK (Simulated)", 0))
                .collect(),
            total_processed: total,
            failures: 0,
            cached: 0,
        }
    }
}

/// Snapshot of the URL cache, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    /// Entries currently stored (lazy expiry may over-report)
    pub size: usize,
    /// Whether caching is enabled at all
    pub enabled: bool,
}
