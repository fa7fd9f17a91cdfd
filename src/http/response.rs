//! Response shaping for API failures.
//!
//! # Responsibilities
//! - One JSON error-body shape for every failure response
//! - Map store errors to appropriate HTTP status codes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::store::OrderError;

/// JSON body shared by every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Build a JSON failure response.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

/// Map an order failure to its HTTP representation.
///
/// `NotFound` and `OutOfStock` are expected business outcomes; a persist
/// failure is systemic and surfaces as 500.
pub fn order_error_response(err: &OrderError) -> Response {
    match err {
        OrderError::NotFound => error_response(StatusCode::NOT_FOUND, "Product not found"),
        OrderError::OutOfStock => {
            error_response(StatusCode::BAD_REQUEST, "Product is out of stock")
        }
        OrderError::Persist(_) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to persist inventory",
        ),
    }
}
