// src/models/mod.rs

//! Data types for the IndexNow client: configuration value objects and the
//! uniform submission response shape.

mod config;
mod response;

// Re-export all public types
pub use config::{CacheConfig, IndexNowConfig, RateLimitConfig, RetryConfig};
pub use response::{CacheStats, EndpointResult, SubmitResponse};
