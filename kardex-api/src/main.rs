//! KARDEX API Server Entry Point
//!
//! Bootstraps configuration, wires the file-backed legacy store into the
//! write-back cache, and starts the Axum HTTP server. On shutdown every
//! dirty product is flushed so no committed mutation is lost.

use std::sync::Arc;

use kardex_api::{create_router, ApiConfig, ApiError, ApiResult};
use kardex_storage::{FileStockStore, InventoryService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kardex_api=debug,kardex_storage=debug,tower_http=debug,info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = ApiConfig::from_env();

    let mut store = FileStockStore::new(&config.stock_dir);
    if let Some(latency) = config.simulated_store_latency {
        store = store.with_simulated_latency(latency);
    }
    let service = InventoryService::new(Arc::new(store), config.inventory.clone());

    let app = create_router(service.clone());
    let addr = config.bind_addr()?;
    tracing::info!(%addr, stock_dir = %config.stock_dir.display(), "Starting KARDEX inventory server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;

    let flushed = service.drain().await;
    tracing::info!(flushed, "Drained dirty products, exiting");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
