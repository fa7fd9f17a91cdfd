//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with all handlers
//! - Wire up middleware (instrumentation, request ID, timeout, tracing)
//! - Bind the server to a listener and run it to graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::http::handlers;
use crate::http::middleware::instrument;
use crate::http::request::RequestIdLayer;
use crate::observability::ServiceMetrics;
use crate::store::InventoryStore;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InventoryStore>,
    pub metrics: ServiceMetrics,
    pub low_stock_threshold: u32,
}

/// HTTP server for the inventory service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and subsystems.
    pub fn new(config: &ServiceConfig, store: Arc<InventoryStore>, metrics: ServiceMetrics) -> Self {
        let state = AppState {
            store,
            metrics,
            low_stock_threshold: config.store.low_stock_threshold,
        };
        let router = build_router(config, state);
        Self { router }
    }

    /// Run the server, accepting connections until the shutdown signal.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the axum router with all middleware layers.
pub fn build_router(config: &ServiceConfig, state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::metrics))
        .route("/api/inventory", get(handlers::list_inventory))
        .route("/api/inventory/{id}", get(handlers::get_product))
        .route("/api/order/{id}", post(handlers::order_product))
        .layer(middleware::from_fn_with_state(state.clone(), instrument))
        .with_state(state)
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.timeouts.request_secs,
        )))
        .layer(RequestIdLayer)
        .layer(TraceLayer::new_for_http())
}
