//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, layer stack)
//!     → request.rs (attach request ID)
//!     → middleware/instrument.rs (before / run / after lifecycle)
//!     → handlers.rs (store + business metrics)
//!     → response.rs (JSON error shaping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
