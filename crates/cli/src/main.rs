//! One-shot character fetch.
//!
//! Fetches a single character straight from the upstream source, bypassing
//! the cache, and prints it as pretty JSON on stdout.

use anyhow::{Context, Result};
use charcache_client::{FetchConfig, Fetcher, HttpFetcher};
use charcache_core::{AppConfig, config::ConfigOverrides};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "charcache", version, about = "Fetch a character and print it as JSON")]
struct Args {
    /// Character id
    id: u32,

    /// Upstream character source base URL
    #[arg(long = "upstream")]
    upstream_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let overrides = ConfigOverrides { upstream_url: args.upstream_url, ..Default::default() };
    let config = AppConfig::load_with(overrides).context("failed to load configuration")?;

    let fetcher = HttpFetcher::new(FetchConfig::from(&config))?;
    tracing::debug!(id = args.id, url = %fetcher.character_url(args.id), "fetching character");

    let character = fetcher
        .fetch(args.id)
        .await
        .with_context(|| format!("failed to fetch character {}", args.id))?;

    println!("{}", serde_json::to_string_pretty(&character)?);

    Ok(())
}
