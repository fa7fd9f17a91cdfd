//! Product Inventory Service Library
//!
//! An HTTP inventory service built with Tokio and Axum: stock levels, a
//! decrement-on-order operation over a crash-consistent file-backed store,
//! and a full request-telemetry pipeline (rate, errors, duration,
//! saturation, payload sizes, business counters).
//!
//! # Architecture Overview
//!
//! ```text
//!                   ┌────────────────────────────────────────────────┐
//!                   │               INVENTORY SERVICE                 │
//!                   │                                                 │
//!   Client Request  │  ┌─────────┐   ┌──────────────┐   ┌──────────┐ │
//!   ────────────────┼─▶│  http   │──▶│ instrument   │──▶│ handlers │ │
//!                   │  │ server  │   │ middleware   │   └────┬─────┘ │
//!                   │  └─────────┘   └──────┬───────┘        │       │
//!                   │                       │                ▼       │
//!                   │                       │         ┌──────────┐   │
//!                   │                       ▼         │  store   │   │
//!                   │               ┌──────────────┐  │ (file +  │   │
//!                   │               │ServiceMetrics│◀─│  lock)   │   │
//!                   │               │  (registry)  │  └──────────┘   │
//!                   │               └──────────────┘                 │
//!                   │                                                 │
//!                   │  config ─ lifecycle ─ observability (logging)   │
//!                   └────────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod store;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

/// Service name attached as a const label to every metric series.
pub const SERVICE_NAME: &str = "product-inventory";
