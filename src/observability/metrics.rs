//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define every service metric (RED + saturation + payload sizes + business)
//! - Hold the Prometheus registry as an explicit owned value, threaded through
//!   application state rather than a process-wide static
//! - Render the text exposition format for the `/metrics` endpoint
//! - Recompute the aggregate stock-health gauges from store snapshots
//!
//! # Metrics
//! All series carry the `product_inventory` name prefix plus `service` and
//! `version` as registry-level const labels.
//!
//! - `http_requests_total` (counter): requests by method, route, status code
//! - `http_request_duration_seconds` (histogram): latency distribution
//! - `http_errors_total` (counter): responses with status >= 400
//! - `http_requests_in_flight` (gauge): saturation
//! - `http_request_size_bytes` / `http_response_size_bytes` (histograms)
//! - `http_fast_requests_total` (counter): requests under fixed ms cutoffs
//! - `http_exceptions_total` (counter): unhandled faults by route
//! - `quantity`, `orders_total`, `stock_decrements_total`: per-product business
//! - `total_items`, `total_quantity`, `out_of_stock_items`, `low_stock_items`:
//!   aggregate stock health

use std::collections::HashMap;
use std::time::Duration;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry,
    TextEncoder,
};

use crate::store::InventoryItem;

/// Name prefix applied to every series by the registry.
const NAMESPACE: &str = "product_inventory";

/// Request latency buckets in seconds (5 ms to 10 s).
const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Payload size buckets in bytes (200 B to 1 MB).
const SIZE_BUCKETS: &[f64] = &[
    200.0, 500.0, 1_000.0, 5_000.0, 10_000.0, 50_000.0, 100_000.0, 500_000.0, 1_000_000.0,
];

/// Latency cutoffs for the SLO-style fast-request counters, in milliseconds.
/// Each threshold is an independent `elapsed <= cutoff` check, not a
/// cumulative histogram bucket.
pub const FAST_THRESHOLDS_MS: [u64; 2] = [50, 200];

/// Order outcome label values for `orders_total`.
///
/// An enum rather than free-form strings keeps the label cardinality bounded
/// at exactly three series per product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderResult {
    Success,
    OutOfStock,
    NotFound,
}

impl OrderResult {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderResult::Success => "success",
            OrderResult::OutOfStock => "out_of_stock",
            OrderResult::NotFound => "not_found",
        }
    }
}

/// All service metrics behind one owned registry.
///
/// Cheap to clone (the registry and every vec share their underlying state),
/// so it rides in axum application state. Individual series are internally
/// synchronized; callers never take a lock to record.
#[derive(Clone)]
pub struct ServiceMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    errors_total: IntCounterVec,
    requests_in_flight: IntGauge,
    request_size_bytes: HistogramVec,
    response_size_bytes: HistogramVec,
    fast_requests_total: IntCounterVec,
    exceptions_total: IntCounterVec,
    quantity: IntGaugeVec,
    orders_total: IntCounterVec,
    stock_decrements_total: IntCounterVec,
    total_items: IntGauge,
    total_quantity: IntGauge,
    out_of_stock_items: IntGauge,
    low_stock_items: IntGauge,
}

impl ServiceMetrics {
    /// Create and register every metric.
    ///
    /// `service` and `version` become const labels on all series.
    pub fn new(service: &str, version: &str) -> Result<Self, prometheus::Error> {
        let const_labels = HashMap::from([
            ("service".to_string(), service.to_string()),
            ("version".to_string(), version.to_string()),
        ]);
        let registry = Registry::new_custom(Some(NAMESPACE.to_string()), Some(const_labels))?;

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests"),
            &["method", "route", "status_code"],
        )?;
        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "HTTP request duration in seconds",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["method", "route", "status_code"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new(
                "http_errors_total",
                "Total HTTP responses with status code >= 400",
            ),
            &["method", "route", "status_code"],
        )?;
        let requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "Number of HTTP requests currently being handled",
        )?;
        let request_size_bytes = HistogramVec::new(
            HistogramOpts::new("http_request_size_bytes", "HTTP request size in bytes")
                .buckets(SIZE_BUCKETS.to_vec()),
            &["method", "route"],
        )?;
        let response_size_bytes = HistogramVec::new(
            HistogramOpts::new("http_response_size_bytes", "HTTP response size in bytes")
                .buckets(SIZE_BUCKETS.to_vec()),
            &["method", "route", "status_code"],
        )?;
        let fast_requests_total = IntCounterVec::new(
            Opts::new(
                "http_fast_requests_total",
                "Requests completed within a fixed latency cutoff",
            ),
            &["route", "threshold_ms"],
        )?;
        let exceptions_total = IntCounterVec::new(
            Opts::new(
                "http_exceptions_total",
                "Total unhandled faults during request processing",
            ),
            &["route"],
        )?;

        let quantity = IntGaugeVec::new(
            Opts::new("quantity", "Current inventory quantity per product"),
            &["product_id"],
        )?;
        let orders_total = IntCounterVec::new(
            Opts::new("orders_total", "Total order attempts by result"),
            &["product_id", "result"],
        )?;
        let stock_decrements_total = IntCounterVec::new(
            Opts::new(
                "stock_decrements_total",
                "Total number of times stock was decremented",
            ),
            &["product_id"],
        )?;
        let total_items = IntGauge::new("total_items", "Total number of products in inventory")?;
        let total_quantity = IntGauge::new("total_quantity", "Total quantity across all products")?;
        let out_of_stock_items = IntGauge::new(
            "out_of_stock_items",
            "Number of products with quantity == 0",
        )?;
        let low_stock_items = IntGauge::new(
            "low_stock_items",
            "Number of products at or below the low-stock threshold",
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(requests_in_flight.clone()))?;
        registry.register(Box::new(request_size_bytes.clone()))?;
        registry.register(Box::new(response_size_bytes.clone()))?;
        registry.register(Box::new(fast_requests_total.clone()))?;
        registry.register(Box::new(exceptions_total.clone()))?;
        registry.register(Box::new(quantity.clone()))?;
        registry.register(Box::new(orders_total.clone()))?;
        registry.register(Box::new(stock_decrements_total.clone()))?;
        registry.register(Box::new(total_items.clone()))?;
        registry.register(Box::new(total_quantity.clone()))?;
        registry.register(Box::new(out_of_stock_items.clone()))?;
        registry.register(Box::new(low_stock_items.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            errors_total,
            requests_in_flight,
            request_size_bytes,
            response_size_bytes,
            fast_requests_total,
            exceptions_total,
            quantity,
            orders_total,
            stock_decrements_total,
            total_items,
            total_quantity,
            out_of_stock_items,
            low_stock_items,
        })
    }

    /// Record a completed request: rate, duration, error count, and the
    /// fast-request counters for every threshold the elapsed time satisfies.
    pub fn observe_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let status_code = status.to_string();
        let labels = [method, route, status_code.as_str()];

        self.requests_total.with_label_values(&labels).inc();
        self.request_duration_seconds
            .with_label_values(&labels)
            .observe(elapsed.as_secs_f64());
        if status >= 400 {
            self.errors_total.with_label_values(&labels).inc();
        }

        for threshold_ms in FAST_THRESHOLDS_MS {
            if elapsed <= Duration::from_millis(threshold_ms) {
                self.fast_requests_total
                    .with_label_values(&[route, &threshold_ms.to_string()])
                    .inc();
            }
        }
    }

    /// Observe the declared request payload size.
    pub fn observe_request_size(&self, method: &str, route: &str, bytes: u64) {
        self.request_size_bytes
            .with_label_values(&[method, route])
            .observe(bytes as f64);
    }

    /// Observe the response payload size.
    pub fn observe_response_size(&self, method: &str, route: &str, status: u16, bytes: u64) {
        self.response_size_bytes
            .with_label_values(&[method, route, &status.to_string()])
            .observe(bytes as f64);
    }

    /// Acquire the in-flight slot for one request.
    ///
    /// The gauge is incremented now and decremented exactly once when the
    /// guard drops, whichever exit path the request takes.
    pub fn track_in_flight(&self) -> InFlightGuard {
        self.requests_in_flight.inc();
        InFlightGuard {
            gauge: self.requests_in_flight.clone(),
        }
    }

    /// Current in-flight count, for assertions and health reporting.
    pub fn in_flight(&self) -> i64 {
        self.requests_in_flight.get()
    }

    /// Count an unhandled fault on `route`.
    pub fn record_exception(&self, route: &str) {
        self.exceptions_total.with_label_values(&[route]).inc();
    }

    /// Count an order attempt by outcome.
    pub fn record_order(&self, product_id: u32, result: OrderResult) {
        self.orders_total
            .with_label_values(&[&product_id.to_string(), result.as_str()])
            .inc();
    }

    /// Count a successful stock decrement.
    pub fn record_stock_decrement(&self, product_id: u32) {
        self.stock_decrements_total
            .with_label_values(&[&product_id.to_string()])
            .inc();
    }

    /// Recompute the per-product quantity gauges and the four aggregate
    /// stock-health gauges from a store snapshot.
    ///
    /// Called once at startup and after every successful mutation.
    pub fn refresh_inventory(&self, items: &[InventoryItem], low_stock_threshold: u32) {
        for item in items {
            self.quantity
                .with_label_values(&[&item.id.to_string()])
                .set(i64::from(item.quantity));
        }

        let total_quantity: u64 = items.iter().map(|p| u64::from(p.quantity)).sum();
        let out_of_stock = items.iter().filter(|p| p.quantity == 0).count();
        let low_stock = items
            .iter()
            .filter(|p| p.quantity <= low_stock_threshold)
            .count();

        self.total_items.set(items.len() as i64);
        self.total_quantity.set(total_quantity as i64);
        self.out_of_stock_items.set(out_of_stock as i64);
        self.low_stock_items.set(low_stock as i64);
    }

    /// Render every registered series in the Prometheus text exposition
    /// format, one sample per line with help/type metadata per family.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&metric_families, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("exposition is not valid UTF-8: {e}")))
    }
}

/// RAII guard balancing the in-flight gauge.
pub struct InFlightGuard {
    gauge: IntGauge,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> ServiceMetrics {
        ServiceMetrics::new("product-inventory", "0.0.0-test").unwrap()
    }

    #[test]
    fn test_exposition_contains_registered_families() {
        let m = metrics();
        m.observe_request("GET", "/api/inventory", 200, Duration::from_millis(3));
        m.record_order(1, OrderResult::Success);

        let out = m.gather().unwrap();
        assert!(out.contains("# HELP product_inventory_http_requests_total"));
        assert!(out.contains("# TYPE product_inventory_http_requests_total counter"));
        assert!(out.contains("# TYPE product_inventory_http_request_duration_seconds histogram"));
        assert!(out.contains("service=\"product-inventory\""));
        assert!(out.contains("route=\"/api/inventory\""));
        assert!(out.contains("result=\"success\""));
    }

    #[test]
    fn test_error_counter_tracks_4xx_and_5xx_only() {
        let m = metrics();
        m.observe_request("GET", "/api/inventory/{id}", 200, Duration::from_millis(1));
        m.observe_request("GET", "/api/inventory/{id}", 404, Duration::from_millis(1));
        m.observe_request("POST", "/api/order/{id}", 500, Duration::from_millis(1));

        assert_eq!(
            m.errors_total
                .with_label_values(&["GET", "/api/inventory/{id}", "404"])
                .get(),
            1
        );
        assert_eq!(
            m.errors_total
                .with_label_values(&["POST", "/api/order/{id}", "500"])
                .get(),
            1
        );
        assert_eq!(
            m.errors_total
                .with_label_values(&["GET", "/api/inventory/{id}", "200"])
                .get(),
            0
        );
    }

    #[test]
    fn test_fast_thresholds_are_independent() {
        let m = metrics();

        // 60 ms satisfies the 200 ms cutoff but not the 50 ms one.
        m.observe_request("GET", "/healthz", 200, Duration::from_millis(60));
        assert_eq!(
            m.fast_requests_total
                .with_label_values(&["/healthz", "50"])
                .get(),
            0
        );
        assert_eq!(
            m.fast_requests_total
                .with_label_values(&["/healthz", "200"])
                .get(),
            1
        );

        // 10 ms satisfies both.
        m.observe_request("GET", "/healthz", 200, Duration::from_millis(10));
        assert_eq!(
            m.fast_requests_total
                .with_label_values(&["/healthz", "50"])
                .get(),
            1
        );
        assert_eq!(
            m.fast_requests_total
                .with_label_values(&["/healthz", "200"])
                .get(),
            2
        );
    }

    #[test]
    fn test_in_flight_guard_balances_on_drop() {
        let m = metrics();
        assert_eq!(m.in_flight(), 0);

        let g1 = m.track_in_flight();
        let g2 = m.track_in_flight();
        assert_eq!(m.in_flight(), 2);

        drop(g1);
        assert_eq!(m.in_flight(), 1);
        drop(g2);
        assert_eq!(m.in_flight(), 0);
    }

    #[test]
    fn test_in_flight_guard_balances_across_panic() {
        let m = metrics();
        let cloned = m.clone();

        let result = std::thread::spawn(move || {
            let _guard = cloned.track_in_flight();
            panic!("simulated fault");
        })
        .join();

        assert!(result.is_err());
        assert_eq!(m.in_flight(), 0);
    }

    #[test]
    fn test_refresh_inventory_recomputes_aggregates() {
        let m = metrics();
        let items = vec![
            InventoryItem { id: 1, quantity: 0 },
            InventoryItem { id: 2, quantity: 5 },
            InventoryItem { id: 3, quantity: 20 },
        ];

        m.refresh_inventory(&items, 10);

        assert_eq!(m.total_items.get(), 3);
        assert_eq!(m.total_quantity.get(), 25);
        assert_eq!(m.out_of_stock_items.get(), 1);
        assert_eq!(m.low_stock_items.get(), 2);
        assert_eq!(m.quantity.with_label_values(&["2"]).get(), 5);
    }

    #[test]
    fn test_clone_shares_underlying_series() {
        let m = metrics();
        let cloned = m.clone();

        m.record_order(3, OrderResult::OutOfStock);

        let out = cloned.gather().unwrap();
        assert!(out.contains("result=\"out_of_stock\""));
    }
}
