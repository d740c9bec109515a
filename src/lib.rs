// src/lib.rs

//! IndexNow Submission Client Library
//!
//! Pushes URL change notifications to search engines with caching, rate
//! limiting, retry/backoff, deduplication, and batching.

pub mod cache;
pub mod client;
pub mod discovery;
pub mod error;
pub mod limiter;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
