//! HTTP endpoint handlers.
//!
//! Thin translation between the HTTP surface and the store/metrics: no
//! business rules live here beyond mapping outcomes to responses and
//! business-metric updates.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::http::response::{error_response, order_error_response};
use crate::http::server::AppState;
use crate::observability::metrics::OrderResult;
use crate::store::{InventoryItem, OrderError};

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
}

/// GET /healthz
pub async fn healthz() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// GET /metrics
pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.gather() {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "metrics exposition failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "metrics exposition failed")
        }
    }
}

/// GET /api/inventory
pub async fn list_inventory(State(state): State<AppState>) -> Json<Vec<InventoryItem>> {
    Json(state.store.items())
}

/// GET /api/inventory/{id}
pub async fn get_product(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    match state.store.get(id) {
        Some(item) => Json(item).into_response(),
        None => {
            state.metrics.record_order(id, OrderResult::NotFound);
            error_response(StatusCode::NOT_FOUND, "Product not found")
        }
    }
}

/// POST /api/order/{id}
pub async fn order_product(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    match state.store.decrement_order(id) {
        Ok(item) => {
            state.metrics.record_order(id, OrderResult::Success);
            state.metrics.record_stock_decrement(id);
            state
                .metrics
                .refresh_inventory(&state.store.items(), state.low_stock_threshold);

            tracing::debug!(product_id = id, quantity = item.quantity, "order placed");
            Json(item).into_response()
        }
        Err(err) => {
            match &err {
                OrderError::NotFound => state.metrics.record_order(id, OrderResult::NotFound),
                OrderError::OutOfStock => {
                    state.metrics.record_order(id, OrderResult::OutOfStock)
                }
                OrderError::Persist(e) => {
                    tracing::error!(product_id = id, error = %e, "order persist failed");
                }
            }
            order_error_response(&err)
        }
    }
}
