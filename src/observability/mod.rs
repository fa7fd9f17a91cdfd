//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → /metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Metrics live behind one owned registry carried in application state
//! - Metric updates are cheap (atomic operations), no external locking
//! - Request IDs flow through logs via the request-id middleware

pub mod logging;
pub mod metrics;

pub use metrics::ServiceMetrics;
