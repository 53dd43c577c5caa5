//! charcache server entry point.
//!
//! Boots the HTTP API over a SQLite character cache. Logging goes to stderr
//! as JSON.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use charcache_client::{FetchConfig, HttpFetcher};
use charcache_core::{AppConfig, CacheDb, config::ConfigOverrides};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod error;
mod handlers;
mod service;
#[cfg(test)]
mod testing;

use service::CharacterService;

/// Caching HTTP API for character data.
#[derive(Debug, Parser)]
#[command(name = "charcache-server", version)]
struct Args {
    /// Server port [default: 8080]
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database path [default: characters.db]
    #[arg(long = "db")]
    db_path: Option<PathBuf>,

    /// Upstream character source base URL
    #[arg(long = "upstream")]
    upstream_url: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self { port: args.port, db_path: args.db_path, upstream_url: args.upstream_url }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load_with(Args::parse().into()).context("failed to load configuration")?;

    let db = CacheDb::open(&config.db_path)
        .await
        .with_context(|| format!("failed to initialize database at {}", config.db_path.display()))?;
    let fetcher = HttpFetcher::new(FetchConfig::from(&config)).context("failed to build upstream client")?;
    let service = Arc::new(CharacterService::new(Arc::new(db.clone()), Arc::new(fetcher)));

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    tracing::info!(port = config.port, db = %config.db_path.display(), upstream = %config.upstream_url, "starting server");
    tracing::info!("API endpoint: http://localhost:{}/api/character/{{id}}", config.port);

    let served = axum::serve(listener, handlers::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error");

    tracing::info!("closing cache database");
    db.close().await.context("failed to close database")?;

    served
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutting down server");
}
