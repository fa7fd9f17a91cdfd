//! Lifecycle guarantees of the request instrumentation middleware.
//!
//! These tests drive a router directly (no socket) so they can inject
//! handlers that panic or stall, which the public API never does.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::middleware;
use axum::routing::get;
use axum::Router;
use tower::ServiceExt;

use product_inventory::http::middleware::instrument;
use product_inventory::http::server::AppState;
use product_inventory::observability::ServiceMetrics;
use product_inventory::store::{InventoryItem, InventoryStore};
use product_inventory::SERVICE_NAME;

fn test_state(dir: &Path) -> AppState {
    let data_file = dir.join("inventory.json");
    std::fs::write(
        &data_file,
        serde_json::to_vec(&vec![InventoryItem { id: 1, quantity: 5 }]).unwrap(),
    )
    .unwrap();

    let (store, _) = InventoryStore::open(&data_file).unwrap();
    AppState {
        store: Arc::new(store),
        metrics: ServiceMetrics::new(SERVICE_NAME, "0.0.0-test").unwrap(),
        low_stock_threshold: 10,
    }
}

fn instrumented_router(state: AppState) -> Router {
    Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/items/{id}", get(|| async { "item" }))
        .route(
            "/boom",
            get(|| async {
                panic!("injected fault");
                #[allow(unreachable_code)]
                ()
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                "slow"
            }),
        )
        .layer(middleware::from_fn_with_state(state.clone(), instrument))
        .with_state(state)
}

async fn send(app: &Router, uri: &str) -> StatusCode {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    response.status()
}

#[tokio::test]
async fn test_panicking_handler_returns_500_and_counts_exception() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let metrics = state.metrics.clone();
    let app = instrumented_router(state);

    assert_eq!(send(&app, "/boom").await, StatusCode::INTERNAL_SERVER_ERROR);

    let exposition = metrics.gather().unwrap();
    assert!(exposition.contains("product_inventory_http_exceptions_total"));
    assert!(exposition.contains("route=\"/boom\""));

    // The fault path records the exception but not the regular RED metrics.
    assert!(!exposition.contains("product_inventory_http_requests_total{"));
}

#[tokio::test]
async fn test_in_flight_returns_to_zero_on_every_exit_path() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let metrics = state.metrics.clone();
    let app = instrumented_router(state);

    assert_eq!(send(&app, "/ok").await, StatusCode::OK);
    assert_eq!(send(&app, "/nowhere").await, StatusCode::NOT_FOUND);
    assert_eq!(send(&app, "/boom").await, StatusCode::INTERNAL_SERVER_ERROR);

    assert_eq!(metrics.in_flight(), 0);
}

#[tokio::test]
async fn test_in_flight_tracks_concurrent_requests() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let metrics = state.metrics.clone();
    let app = instrumented_router(state);

    let slow = {
        let app = app.clone();
        tokio::spawn(async move { send(&app, "/slow").await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(metrics.in_flight(), 1);

    assert_eq!(slow.await.unwrap(), StatusCode::OK);
    assert_eq!(metrics.in_flight(), 0);
}

#[tokio::test]
async fn test_route_label_uses_template_not_raw_path() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let metrics = state.metrics.clone();
    let app = instrumented_router(state);

    assert_eq!(send(&app, "/items/12345").await, StatusCode::OK);

    let exposition = metrics.gather().unwrap();
    assert!(exposition.contains("route=\"/items/{id}\""));
    assert!(!exposition.contains("route=\"/items/12345\""));
}

#[tokio::test]
async fn test_error_statuses_feed_error_counter() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let metrics = state.metrics.clone();
    let app = instrumented_router(state);

    assert_eq!(send(&app, "/nowhere").await, StatusCode::NOT_FOUND);

    let exposition = metrics.gather().unwrap();
    assert!(exposition.contains("product_inventory_http_errors_total"));
    assert!(exposition.contains("status_code=\"404\""));
}

#[tokio::test]
async fn test_fast_request_counter_records_quick_requests() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    let metrics = state.metrics.clone();
    let app = instrumented_router(state);

    assert_eq!(send(&app, "/ok").await, StatusCode::OK);

    // An in-process handler comfortably beats the widest cutoff.
    let exposition = metrics.gather().unwrap();
    assert!(exposition.contains("product_inventory_http_fast_requests_total"));
    assert!(exposition.contains("threshold_ms=\"200\""));
}
