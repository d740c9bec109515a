//! IndexNow self-hosted endpoint server.
//!
//! Serves the key-ownership file and a JSON submission API. Configuration
//! comes from the same environment variables as the CLI, plus:
//!
//! - `INDEXNOW_BIND_ADDR`: listen address (default: 0.0.0.0:8080)
//! - `INDEXNOW_DEV_MODE`: when `1` or `true`, submissions are simulated
//!   and no outbound calls are made

use indexnow::{error::Result, models::IndexNowConfig, server};

/// Initialize logging from the environment.
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let config = IndexNowConfig::load();
    let bind_addr =
        std::env::var("INDEXNOW_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let dev_mode = std::env::var("INDEXNOW_DEV_MODE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    server::serve(config, &bind_addr, dev_mode).await
}
