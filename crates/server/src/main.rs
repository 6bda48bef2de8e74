//! offgrid MCP server entry point.
//!
//! Loads configuration, opens the cache, installs and activates the current
//! generations, then serves the engine over stdio. Logging goes to stderr to
//! avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use offgrid_client::{FetchClient, FetchConfig};
use offgrid_core::{AppConfig, CacheDb, ChannelBroadcast, ClientMessage, Engine, GenerationManager};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod state;
mod tools;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let origin = config.origin_url()?;
    let manifest = config.precache_urls()?;

    tracing::info!(
        app = %config.app_name,
        version = %config.version,
        db = %config.db_path.display(),
        "Starting offgrid server on stdio transport"
    );

    let db = CacheDb::open(&config.db_path).await?;
    let clients = ChannelBroadcast::default();
    tokio::spawn(log_client_messages(clients.subscribe()));

    let generations = GenerationManager::open(db, config.generation_names())
        .await?
        .with_broadcast(Arc::new(clients));
    let network = FetchClient::new(FetchConfig::from(&config))?;
    let engine = Engine::new(network, config.classifier(), generations, &origin);
    let state = AppState { engine, origin, manifest };

    lifecycle(&state).await?;

    let handler = handler::OffgridServer::new(state);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}

/// Install then activate before any request is accepted.
///
/// A failed install leaves the previous generations in place and the server
/// keeps running, so clients can still be served from whatever is cached.
async fn lifecycle(state: &AppState<FetchClient>) -> Result<()> {
    let generations = state.engine.generations();
    match generations.install_populate(state.engine.network(), &state.manifest).await {
        Ok(stored) => {
            let deleted = generations.activate_prune().await?;
            tracing::info!(stored, deleted = ?deleted, "install and activation complete");
        }
        Err(e) => tracing::warn!(error = %e, "install failed; serving without activation"),
    }
    Ok(())
}

/// Stand-in for connected clients: log every lifecycle message.
async fn log_client_messages(mut rx: Receiver<ClientMessage>) {
    loop {
        match rx.recv().await {
            Ok(message) => tracing::info!(?message, "client message"),
            Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "client message log lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}
