//! Store: the shared root keyspace
//!
//! Holds the latest value and version of every present key. There is no
//! version history and no tombstone: deleting a key drops its record, and
//! writing it again restarts at version 0.
//!
//! # Locking
//!
//! - Reads take the shared lock for the duration of one lookup
//! - `set` takes the exclusive lock for one write
//! - `lock()` hands out the exclusive lock so a caller can validate and
//!   apply a whole change set without interleaving writers
//!
//! Simulated latency is always applied before a lock is acquired.

use std::collections::BTreeSet;

use parking_lot::{RwLock, RwLockWriteGuard};
use rustc_hash::FxHashMap;
use tracing::trace;

use snapkv_core::{ReadView, Record, Version};

use crate::latency::IoLatency;

/// Thread-safe root keyspace
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<FxHashMap<String, Record>>,
    latency: IoLatency,
}

impl Store {
    /// Create an empty store with no simulated latency
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that pauses before each operation
    pub fn with_latency(latency: IoLatency) -> Self {
        Store {
            data: RwLock::new(FxHashMap::default()),
            latency,
        }
    }

    /// Configured latency
    pub fn latency(&self) -> IoLatency {
        self.latency
    }

    /// Number of present keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Write or delete a single key
    ///
    /// `Some(value)` creates the key at version 0 or advances its version;
    /// `None` removes the key and its version.
    pub fn set(&self, key: &str, value: Option<String>) {
        self.latency.pause();
        self.lock().set(key, value);
    }

    /// Acquire exclusive access for a multi-key operation
    ///
    /// No simulated latency is applied through the guard.
    pub fn lock(&self) -> StoreGuard<'_> {
        StoreGuard {
            data: self.data.write(),
        }
    }
}

impl ReadView for Store {
    fn keys(&self) -> BTreeSet<String> {
        self.latency.pause();
        self.data.read().keys().cloned().collect()
    }

    fn version(&self, key: &str) -> Option<Version> {
        self.data.read().get(key).map(|r| r.version)
    }

    fn get(&self, key: &str) -> Option<String> {
        self.latency.pause();
        self.data.read().get(key).map(|r| r.value.clone())
    }

    fn count(&self, value: &str) -> usize {
        self.latency.pause();
        self.data
            .read()
            .values()
            .filter(|r| r.value == value)
            .count()
    }
}

/// Exclusive handle on the store's contents
///
/// Dropping the guard releases the lock.
pub struct StoreGuard<'a> {
    data: RwLockWriteGuard<'a, FxHashMap<String, Record>>,
}

impl StoreGuard<'_> {
    /// Version of a key, `None` if absent
    pub fn version(&self, key: &str) -> Option<Version> {
        self.data.get(key).map(|r| r.version)
    }

    /// Value of a key, `None` if absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(|r| r.value.as_str())
    }

    /// Write or delete a key without pausing
    pub fn set(&mut self, key: &str, value: Option<String>) {
        match value {
            Some(value) => {
                let record = match self.data.get(key) {
                    Some(prev) => prev.successor(value),
                    None => Record::initial(value),
                };
                trace!(target: "snapkv::store", key, version = %record.version, "set");
                self.data.insert(key.to_string(), record);
            }
            None => {
                if self.data.remove(key).is_some() {
                    trace!(target: "snapkv::store", key, "delete");
                }
            }
        }
    }
}
