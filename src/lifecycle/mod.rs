//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGINT (Ctrl-C) → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Startup is ordered in `main`: config, store, metrics, then the listener
//! - Shutdown is a broadcast so tests can trigger it without signals

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
