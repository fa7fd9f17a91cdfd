//! File-backed inventory store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single stock record. Identity is `id`; unsigned fields make the
/// "quantity never negative" invariant structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u32,
    pub quantity: u32,
}

/// Stock seeded when no usable data file exists.
pub const DEFAULT_INVENTORY: [InventoryItem; 12] = [
    InventoryItem { id: 1, quantity: 100 },
    InventoryItem { id: 2, quantity: 50 },
    InventoryItem { id: 3, quantity: 75 },
    InventoryItem { id: 4, quantity: 120 },
    InventoryItem { id: 5, quantity: 30 },
    InventoryItem { id: 6, quantity: 60 },
    InventoryItem { id: 7, quantity: 40 },
    InventoryItem { id: 8, quantity: 90 },
    InventoryItem { id: 9, quantity: 80 },
    InventoryItem { id: 10, quantity: 70 },
    InventoryItem { id: 11, quantity: 20 },
    InventoryItem { id: 12, quantity: 55 },
];

/// How the store obtained its initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The data file existed and parsed cleanly.
    Loaded,
    /// No data file was present; defaults were seeded and persisted.
    SeededMissing,
    /// The data file was unreadable or failed the shape check; defaults were
    /// seeded and persisted over it.
    SeededInvalid,
}

/// Persistence failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the data file failed.
    #[error("inventory io error: {0}")]
    Io(#[from] io::Error),

    /// Serializing the item list failed.
    #[error("inventory serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Order failures. `NotFound` and `OutOfStock` are expected business
/// outcomes; `Persist` is systemic.
#[derive(Debug, Error)]
pub enum OrderError {
    /// No item with the requested id exists.
    #[error("product not found")]
    NotFound,

    /// The item exists but its quantity is zero.
    #[error("product is out of stock")]
    OutOfStock,

    /// The decrement could not be made durable; the in-memory change was
    /// rolled back.
    #[error("failed to persist inventory: {0}")]
    Persist(#[from] StoreError),
}

/// Concurrency-safe, crash-consistent inventory store.
///
/// A single lock covers every read-modify-write of the in-memory list or the
/// on-disk file. Persistence rewrites the whole snapshot to a temp file and
/// renames it over the canonical path, so a crash mid-write never leaves a
/// partial file visible.
pub struct InventoryStore {
    items: Mutex<Vec<InventoryItem>>,
    data_file: PathBuf,
}

impl InventoryStore {
    /// Open the store, loading `data_file` or seeding defaults.
    ///
    /// A missing, unreadable, or mis-shaped file is self-healing: the default
    /// set is persisted and served, and the returned [`LoadOutcome`] says
    /// which path was taken. Failing to persist even the defaults is fatal —
    /// an unwritable data path should stop the process at startup, not fail
    /// on the first order.
    pub fn open(data_file: impl Into<PathBuf>) -> Result<(Self, LoadOutcome), StoreError> {
        let data_file = data_file.into();
        let (items, outcome) = match fs::read(&data_file) {
            Ok(bytes) => match serde_json::from_slice::<Vec<InventoryItem>>(&bytes) {
                Ok(items) => (items, LoadOutcome::Loaded),
                Err(_) => (DEFAULT_INVENTORY.to_vec(), LoadOutcome::SeededInvalid),
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                (DEFAULT_INVENTORY.to_vec(), LoadOutcome::SeededMissing)
            }
            Err(_) => (DEFAULT_INVENTORY.to_vec(), LoadOutcome::SeededInvalid),
        };

        if outcome != LoadOutcome::Loaded {
            write_snapshot(&data_file, &items)?;
        }

        let store = Self {
            items: Mutex::new(items),
            data_file,
        };
        Ok((store, outcome))
    }

    /// Snapshot of the full item list.
    pub fn items(&self) -> Vec<InventoryItem> {
        self.items.lock().clone()
    }

    /// Look up a single item by id.
    pub fn get(&self, id: u32) -> Option<InventoryItem> {
        self.items.lock().iter().find(|p| p.id == id).copied()
    }

    /// Decrement stock for `id` by one and persist the new state.
    ///
    /// Runs entirely under the store lock, so concurrent orders are
    /// serialized: for an item with quantity 1, exactly one of two racing
    /// calls succeeds and the other sees `OutOfStock`. If the snapshot write
    /// fails the in-memory decrement is rolled back — success is never
    /// reported unless the new state is on disk.
    pub fn decrement_order(&self, id: u32) -> Result<InventoryItem, OrderError> {
        let mut items = self.items.lock();
        let idx = items
            .iter()
            .position(|p| p.id == id)
            .ok_or(OrderError::NotFound)?;
        if items[idx].quantity == 0 {
            return Err(OrderError::OutOfStock);
        }

        items[idx].quantity -= 1;
        if let Err(e) = write_snapshot(&self.data_file, &items) {
            items[idx].quantity += 1;
            return Err(OrderError::Persist(e));
        }
        Ok(items[idx])
    }
}

/// Serialize `items` next to `path` and atomically rename into place.
fn write_snapshot(path: &Path, items: &[InventoryItem]) -> Result<(), StoreError> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let mut tmp = path.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, serde_json::to_vec(items)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
