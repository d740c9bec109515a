//! IndexNow CLI
//!
//! Local command-line front end for the submission client. For the
//! self-hosted HTTP endpoint, use `indexnow-server`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indexnow::{
    client::IndexNowClient,
    discovery,
    error::{AppError, Result},
    models::{IndexNowConfig, SubmitResponse},
};

/// IndexNow - search engine URL submission
#[derive(Parser, Debug)]
#[command(name = "indexnow", version, about = "IndexNow submission client")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Clear the submission cache before submitting
    #[arg(short, long, global = true)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a single URL to the configured endpoints
    Submit {
        /// URL to submit
        url: String,
    },

    /// Submit multiple URLs as a batch
    SubmitBatch {
        /// URLs to submit
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Submit the site's important top-level pages
    SubmitSite,

    /// Discover and submit every page in a build directory
    SubmitAll {
        /// Path to the static build output
        #[arg(long, default_value = "dist")]
        dist_dir: PathBuf,
    },

    /// Inspect or clear the submission cache
    Cache {
        /// Show cache statistics
        #[arg(long, short)]
        stats: bool,

        /// Clear the cache
        #[arg(long, short)]
        clear: bool,
    },

    /// Show the effective configuration and whether it is valid
    Config,

    /// Probe each configured endpoint for reachability
    Test,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Load the effective configuration: file if given, defaults otherwise,
/// environment overrides in both cases.
fn load_config(path: Option<&PathBuf>) -> IndexNowConfig {
    match path {
        Some(path) => IndexNowConfig::load_file_or_default(path),
        None => IndexNowConfig::load(),
    }
}

/// Print a human-readable submission summary.
fn print_summary(result: &SubmitResponse) {
    log::info!(
        "Result: success={} total={} failures={} cached={}",
        result.success,
        result.total_processed,
        result.failures,
        result.cached
    );

    for r in &result.results {
        match (&r.status, &r.error) {
            (Some(status), _) => log::info!(
                "  {}: {} {} (retries: {})",
                r.endpoint,
                status,
                r.status_text.as_deref().unwrap_or(""),
                r.retries
            ),
            (None, Some(error)) => {
                log::warn!("  {}: {} (retries: {})", r.endpoint, error, r.retries)
            }
            (None, None) => {}
        }
    }

    if result.failures > 0 {
        log::warn!("Some endpoints failed; see details above");
    }
}

/// Build a client, honoring --force.
async fn build_client(config: IndexNowConfig, force: bool) -> Result<IndexNowClient> {
    let client = IndexNowClient::new(config)?;
    if force {
        client.clear_cache().await;
    }
    Ok(client)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_ref());

    match cli.command {
        Command::Submit { url } => {
            let client = build_client(config, cli.force).await?;
            let result = client.submit_url(&url).await?;
            print_summary(&result);
        }

        Command::SubmitBatch { urls } => {
            let client = build_client(config, cli.force).await?;
            log::info!("Submitting {} URLs", urls.len());
            let result = client.submit_urls(&urls).await?;
            print_summary(&result);
        }

        Command::SubmitSite => {
            let client = build_client(config, cli.force).await?;
            log::info!("Submitting important site pages...");
            let result = client.submit_site_pages().await?;
            print_summary(&result);
        }

        Command::SubmitAll { dist_dir } => {
            if !dist_dir.exists() {
                log::error!(
                    "Build directory {} not found. Run the site build first.",
                    dist_dir.display()
                );
                return Err(AppError::config("build directory not found"));
            }

            let client = build_client(config, cli.force).await?;
            let urls = discovery::discover_pages(&dist_dir, &client.config().site_url);

            if urls.is_empty() {
                log::info!("No pages found to submit");
                return Ok(());
            }

            log::info!("Submitting {} discovered pages...", urls.len());
            let result = client.submit_urls(&urls).await?;
            print_summary(&result);
        }

        Command::Cache { stats, clear } => {
            let client = IndexNowClient::new(config)?;

            if clear {
                client.clear_cache().await;
                log::info!("Cache cleared");
            } else if stats {
                let stats = client.cache_stats().await;
                log::info!("Cache enabled: {}", stats.enabled);
                log::info!("Cache size: {} URLs", stats.size);
                log::info!("Note: the cache is in-memory and scoped to this process");
            } else {
                log::info!("Use --stats to inspect the cache or --clear to empty it");
            }
        }

        Command::Config => {
            let valid = config.validate();
            let key_preview: String = config.api_key.chars().take(8).collect();

            log::info!("Site URL: {}", config.site_url);
            log::info!("API key: {key_preview}...");
            log::info!("Key location: {}", config.key_location);
            log::info!("Endpoints: {}", config.endpoints.len());
            log::info!("Max retries: {}", config.retry.max_retries);
            log::info!("Batch size: {}", config.rate_limit.batch_size);
            log::info!(
                "Caching: {} (TTL {}s)",
                if config.cache.enabled { "enabled" } else { "disabled" },
                config.cache.ttl_secs
            );
            log::info!("Valid: {}", valid);

            if !valid {
                return Err(AppError::config("configuration is invalid"));
            }
        }

        Command::Test => {
            log::info!("Probing IndexNow endpoints...");
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()?;

            for endpoint in &config.endpoints {
                match client.head(endpoint).send().await {
                    Ok(response) => {
                        let mark = if response.status().is_success() { "✓" } else { "✗" };
                        log::info!("  {endpoint}: {mark} ({})", response.status().as_u16());
                    }
                    Err(error) => log::info!("  {endpoint}: ✗ ({error})"),
                }
            }
        }
    }

    Ok(())
}
