//! Core read abstraction shared by the store and snapshots
//!
//! The root [`Store`](../../snapkv_storage/struct.Store.html) and every
//! snapshot chain expose the same read surface, so validation and counting
//! work against either without knowing which one they were given.

use std::collections::BTreeSet;

use crate::types::Version;

/// Read-only view over a string keyspace
///
/// Implementations:
/// - the root store (records with real versions)
/// - a snapshot seen through its parent
/// - a chain of snapshots rooted at the store
///
/// For snapshots, `version` of a locally changed key is the change's base
/// version, so nested snapshots record the same baseline their parent did.
pub trait ReadView {
    /// All keys that may be visible in this view
    ///
    /// May include keys that are tombstoned in this view; `get` decides
    /// whether a key is actually present.
    fn keys(&self) -> BTreeSet<String>;

    /// Version of a key, `None` if the view has no version for it
    fn version(&self, key: &str) -> Option<Version>;

    /// Current value of a key, `None` if absent or deleted
    fn get(&self, key: &str) -> Option<String>;

    /// Number of keys whose visible value equals `value`
    ///
    /// Tombstoned and absent keys are never counted.
    fn count(&self, value: &str) -> usize {
        self.keys()
            .iter()
            .filter(|key| self.get(key).as_deref() == Some(value))
            .count()
    }
}

impl<T: ReadView + ?Sized> ReadView for &T {
    fn keys(&self) -> BTreeSet<String> {
        (**self).keys()
    }

    fn version(&self, key: &str) -> Option<Version> {
        (**self).version(key)
    }

    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn count(&self, value: &str) -> usize {
        (**self).count(value)
    }
}
