//! Product Inventory Service
//!
//! Startup order: configuration, store, metrics, then the listener — traffic
//! is only accepted once every subsystem is ready.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use product_inventory::config::loader;
use product_inventory::http::HttpServer;
use product_inventory::lifecycle::{signals, Shutdown};
use product_inventory::observability::{logging, ServiceMetrics};
use product_inventory::store::{InventoryStore, LoadOutcome};
use product_inventory::SERVICE_NAME;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = env::var_os("INVENTORY_CONFIG").map(PathBuf::from);
    let config = loader::load(config_path.as_deref())?;

    logging::init(&config.observability.log_level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "product-inventory starting"
    );
    tracing::info!(
        bind_address = %config.listener.bind_address,
        data_file = %config.store.data_file.display(),
        low_stock_threshold = config.store.low_stock_threshold,
        "Configuration loaded"
    );

    let (store, outcome) = InventoryStore::open(&config.store.data_file)?;
    match outcome {
        LoadOutcome::Loaded => tracing::info!("Inventory loaded from disk"),
        LoadOutcome::SeededMissing => {
            tracing::warn!("No inventory file found; seeded and persisted defaults")
        }
        LoadOutcome::SeededInvalid => {
            tracing::warn!("Inventory file was corrupt; seeded and persisted defaults")
        }
    }
    let store = Arc::new(store);

    let metrics = ServiceMetrics::new(SERVICE_NAME, env!("CARGO_PKG_VERSION"))?;
    metrics.refresh_inventory(&store.items(), config.store.low_stock_threshold);

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = HttpServer::new(&config, store, metrics);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
