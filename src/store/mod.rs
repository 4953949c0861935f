//! Whole-snapshot entity store.
//!
//! Every mutation follows read-modify-write-then-broadcast: load the
//! full snapshot, rebuild it, persist it back, then notify. There is no
//! locking; two independently-initiated flows writing overlapping keys
//! without an intervening re-read will overwrite each other. That is an
//! accepted, documented limitation of the single-user engine, not a
//! guarantee it provides.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ServiceError;
use crate::models::{Allocation, LabelsReceived, Order, Person};

/// The persisted state: orders with their products, the allocation
/// ledger keyed `<orderId>_<productId>`, the labels-received overrides
/// on the same key, and the person directory side-table.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub production_allocations: HashMap<String, Vec<Allocation>>,
    #[serde(default)]
    pub labels_received: HashMap<String, LabelsReceived>,
    #[serde(default)]
    pub people: Vec<Person>,
}

/// Repository boundary of the engine. Production uses the JSON file
/// store; tests substitute the in-memory fake and assert on what was
/// persisted.
pub trait SnapshotStore: Send + Sync {
    fn load(&self) -> Result<Snapshot, ServiceError>;
    fn persist(&self, snapshot: &Snapshot) -> Result<(), ServiceError>;
}

/// Snapshot store backed by a single JSON file. Writes go to a sibling
/// temp file first and are renamed into place so a crash mid-write
/// never truncates the live snapshot.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Snapshot, ServiceError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no snapshot file yet, starting empty");
            return Ok(Snapshot::default());
        }
        let bytes = fs::read(&self.path)?;
        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(snapshot)
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), ServiceError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("json.tmp");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), orders = snapshot.orders.len(), "snapshot persisted");
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Snapshot>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(snapshot),
        }
    }
}

impl SnapshotStore for InMemoryStore {
    fn load(&self) -> Result<Snapshot, ServiceError> {
        self.inner
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| ServiceError::StoreError("snapshot mutex poisoned".into()))
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), ServiceError> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| ServiceError::StoreError("snapshot mutex poisoned".into()))?;
        *guard = snapshot.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactInfo, ImlType, Product};

    #[test]
    fn in_memory_store_round_trips() {
        let store = InMemoryStore::new();
        let mut snapshot = store.load().unwrap();
        assert!(snapshot.orders.is_empty());

        let mut order = Order::new("ORD-1", ContactInfo::default());
        order
            .products
            .push(Product::new("Tub", "1L", "IML-1", ImlType::Tub));
        snapshot.orders.push(order);
        store.persist(&snapshot).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.orders.len(), 1);
        assert_eq!(reloaded.orders[0].products.len(), 1);
    }

    #[test]
    fn file_store_starts_empty_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("snapshot.json"));

        assert!(store.load().unwrap().orders.is_empty());

        let mut snapshot = Snapshot::default();
        snapshot.orders.push(Order::new("ORD-2", ContactInfo::default()));
        store.persist(&snapshot).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.orders.len(), 1);
        assert_eq!(reloaded.orders[0].order_number, "ORD-2");

        // No stray temp file left behind.
        assert!(!dir.path().join("snapshot.json.tmp").exists());
    }

    #[test]
    fn file_store_rejects_corrupt_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load(),
            Err(ServiceError::SerializationError(_))
        ));
    }
}
