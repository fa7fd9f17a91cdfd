//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::net::TcpListener;

use product_inventory::config::ServiceConfig;
use product_inventory::http::HttpServer;
use product_inventory::lifecycle::Shutdown;
use product_inventory::observability::ServiceMetrics;
use product_inventory::store::{InventoryItem, InventoryStore};
use product_inventory::SERVICE_NAME;

/// A running service instance bound to an ephemeral port.
pub struct TestService {
    pub addr: SocketAddr,
    pub metrics: ServiceMetrics,
    pub data_file: PathBuf,
    shutdown: Shutdown,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Seed `dir` with `items` and boot the full service on an ephemeral port.
pub async fn start_service(dir: &Path, items: &[InventoryItem]) -> TestService {
    let data_file = dir.join("inventory.json");
    std::fs::write(&data_file, serde_json::to_vec(items).unwrap()).unwrap();

    let mut config = ServiceConfig::default();
    config.store.data_file = data_file.clone();
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let (store, _) = InventoryStore::open(&config.store.data_file).unwrap();
    let store = Arc::new(store);

    let metrics = ServiceMetrics::new(SERVICE_NAME, env!("CARGO_PKG_VERSION")).unwrap();
    metrics.refresh_inventory(&store.items(), config.store.low_stock_threshold);

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(&config, store, metrics.clone());
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestService {
        addr,
        metrics,
        data_file,
        shutdown,
    }
}

/// Extract the value of the first sample line for `name` (ignoring help/type
/// comments) from a text exposition.
#[allow(dead_code)]
pub fn sample_value(exposition: &str, name: &str) -> Option<f64> {
    exposition
        .lines()
        .find(|line| line.starts_with(name) && !line.starts_with('#'))
        .and_then(|line| line.split_whitespace().last())
        .and_then(|value| value.parse().ok())
}
