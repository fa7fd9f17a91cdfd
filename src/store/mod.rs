//! Inventory persistence subsystem.
//!
//! # Data Flow
//! ```text
//! startup:
//!     data file (JSON array)
//!         → inventory.rs (load, shape check)
//!         → seeded defaults on missing/corrupt data (persisted back)
//!         → InventoryStore (authoritative, lock-protected)
//!
//! per order:
//!     decrement_order(id)
//!         → locate + check + decrement under the store lock
//!         → snapshot written to temp file, renamed into place
//!         → updated item returned (or rolled back on persist failure)
//! ```
//!
//! # Design Decisions
//! - One mutex covers memory and disk; outside the lock the two are never
//!   observed in conflicting states
//! - Whole-file snapshot per mutation; atomic rename, no append log
//! - Corrupt or missing state is self-healing at startup, surfaced as a
//!   `LoadOutcome` instead of being swallowed

pub mod inventory;

pub use inventory::{
    InventoryItem, InventoryStore, LoadOutcome, OrderError, StoreError, DEFAULT_INVENTORY,
};
