//! Request lifecycle instrumentation.
//!
//! # Responsibilities
//! - Observe every routed request: rate, errors, duration, saturation,
//!   payload sizes, fast-request counts
//! - Keep the in-flight gauge balanced on every exit path, including
//!   unhandled panics inside handlers
//! - Label series by the registered route template, never the raw path, so
//!   path parameters cannot explode cardinality
//!
//! # Design Decisions
//! - The in-flight slot is an RAII guard: incremented on entry, decremented
//!   exactly once when the guard drops, whichever way the request exits
//! - A panic in a handler is caught here, counted as an exception for the
//!   route, and converted to a 500 response; no other request metrics are
//!   recorded for the faulted request
//! - `/metrics` itself is excluded to avoid scrape feedback
//! - Response size uses the declared `content-length` header, falling back
//!   to the body's exact size hint; indeterminate (streaming) sizes are not
//!   observed

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{MatchedPath, Request, State};
use axum::http::{header, HeaderMap, Response, StatusCode};
use axum::middleware::Next;
use futures_util::FutureExt;
use http_body::Body as _;

use crate::http::response::error_response;
use crate::http::server::AppState;

/// Route excluded from instrumentation.
const METRICS_ROUTE: &str = "/metrics";

/// Wrap one request in the before/run/after lifecycle.
pub async fn instrument(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response<Body> {
    // The registered template keeps the route label bounded; unmatched
    // requests fall back to the raw path of the 404.
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());

    if route == METRICS_ROUTE {
        return next.run(req).await;
    }

    let metrics = state.metrics;
    let method = req.method().to_string();
    let started = Instant::now();
    let _in_flight = metrics.track_in_flight();

    if let Some(len) = content_length(req.headers()) {
        metrics.observe_request_size(&method, &route, len);
    }

    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => {
            let elapsed = started.elapsed();
            let status = response.status().as_u16();

            metrics.observe_request(&method, &route, status, elapsed);
            if let Some(len) = response_size(&response) {
                metrics.observe_response_size(&method, &route, status, len);
            }

            response
        }
        Err(panic) => {
            metrics.record_exception(&route);
            tracing::error!(
                method = %method,
                route = %route,
                panic = panic_message(&*panic),
                "handler panicked"
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        }
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}

fn response_size(response: &Response<Body>) -> Option<u64> {
    content_length(response.headers()).or_else(|| response.body().size_hint().exact())
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
