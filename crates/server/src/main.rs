//! pwa-offline server entry point.
//!
//! Loads configuration, opens the cache database, registers the offline
//! worker and serves the MCP tools on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use pwa_client::{FetchConfig, HttpFetcher, OfflineWorker, WorkerConfig};
use pwa_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod handler;
mod tools;

use handler::{PwaServer, ServerState, SharedFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(
        origin = %config.site_origin,
        render_mode = %config.render_mode,
        update_mode = %config.update_mode,
        "Starting pwa-offline server on stdio transport"
    );

    let cache = CacheDb::open(&config.db_path).await?;
    let fetcher: SharedFetcher = Arc::new(HttpFetcher::new(FetchConfig::from(&config))?);
    let worker = OfflineWorker::new(WorkerConfig::from_app(&config)?, cache.clone(), fetcher.clone());

    // Registration failure leaves the worker unregistered; the tools still run.
    match worker.register().await {
        Ok(registration) => tracing::debug!(?registration, "offline worker ready"),
        Err(e) => tracing::warn!(error = %e, script = %worker.config().script_url, "worker registration failed"),
    }

    let handler = PwaServer::new(ServerState { config, cache, fetcher, worker });
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
