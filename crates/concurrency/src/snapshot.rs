//! Copy-on-write snapshots
//!
//! A [`Snapshot`] is only a change set. Reads resolve the local change first
//! and fall back to a parent view supplied by the caller. Parent views are
//! either the root store or a [`SnapshotChain`] of the snapshots below.
//!
//! ## Version semantics
//!
//! Seen through its parent, a snapshot reports the *base version* of a key
//! it changed (even for a tombstone), not a new version. A nested snapshot
//! therefore records the same baseline as the snapshot it branched from, and
//! merging it back validates against that baseline.

use std::collections::{BTreeMap, BTreeSet};

use snapkv_core::{Change, ReadView, Version};
use snapkv_storage::Store;

use crate::merge::{ApplyResult, CommitError};
use crate::validation::validate_changes;

/// Pending writes keyed by key, ordered for deterministic validation
pub type ChangeSet = BTreeMap<String, Change>;

/// Private overlay of writes over a parent view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    changes: ChangeSet,
}

impl Snapshot {
    /// Empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Local change for `key`, if any
    pub fn lookup(&self, key: &str) -> Option<&Change> {
        self.changes.get(key)
    }

    /// All local changes
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Number of changed keys
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Whether no key was written
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Record a write (`Some`) or tombstone (`None`) for `key`
    ///
    /// The first write captures `parent.version(key)` (or 0) as the base
    /// version. Later writes replace the value and keep that base.
    pub fn write(&mut self, parent: &dyn ReadView, key: &str, value: Option<String>) {
        match self.changes.get_mut(key) {
            Some(change) => change.value = value,
            None => {
                let base_version = parent.version(key).unwrap_or(Version::INITIAL);
                self.changes
                    .insert(key.to_string(), Change { value, base_version });
            }
        }
    }

    /// Merge a child's change set into this snapshot
    ///
    /// Two phases, same as a store merge: every child change is validated
    /// against this snapshot seen through `parent`; only if all pass is any
    /// change applied. On conflict this snapshot is unchanged.
    pub fn absorb(
        &mut self,
        parent: &dyn ReadView,
        changes: ChangeSet,
    ) -> Result<ApplyResult, CommitError> {
        let validation = {
            let view = self.over(parent);
            validate_changes(&changes, |key| view.version(key))
        };
        if !validation.is_valid() {
            return Err(CommitError::ValidationFailed(validation));
        }

        let mut applied = ApplyResult::default();
        for (key, change) in changes {
            applied.record(&change);
            self.write(parent, &key, change.value);
        }
        Ok(applied)
    }

    /// This snapshot seen through `parent`
    pub fn over<'a>(&'a self, parent: &'a dyn ReadView) -> Overlay<'a> {
        Overlay { parent, top: self }
    }

    /// Give up the change set for merging
    pub fn into_changes(self) -> ChangeSet {
        self.changes
    }
}

impl AsRef<Snapshot> for Snapshot {
    fn as_ref(&self) -> &Snapshot {
        self
    }
}

/// One snapshot layered over an arbitrary parent view
pub struct Overlay<'a> {
    parent: &'a dyn ReadView,
    top: &'a Snapshot,
}

impl ReadView for Overlay<'_> {
    fn keys(&self) -> BTreeSet<String> {
        let mut keys = self.parent.keys();
        keys.extend(self.top.changes.keys().cloned());
        keys
    }

    fn version(&self, key: &str) -> Option<Version> {
        match self.top.lookup(key) {
            Some(change) => Some(change.base_version),
            None => self.parent.version(key),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.top.lookup(key) {
            Some(change) => change.value.clone(),
            None => self.parent.get(key),
        }
    }
}

/// Read view of a stack of snapshot layers rooted at the store
///
/// `layers[0]` branched from the store and the last layer is the innermost.
/// An empty slice is equivalent to reading the store directly.
pub struct SnapshotChain<'a, L> {
    store: &'a Store,
    layers: &'a [L],
}

impl<'a, L: AsRef<Snapshot>> SnapshotChain<'a, L> {
    /// Chain over `layers`, innermost last
    pub fn new(store: &'a Store, layers: &'a [L]) -> Self {
        SnapshotChain { store, layers }
    }

    /// Number of snapshot layers above the store
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    fn resolve(&self, key: &str) -> Option<&'a Change> {
        let layers: &'a [L] = self.layers;
        layers
            .iter()
            .rev()
            .find_map(|layer| layer.as_ref().lookup(key))
    }
}

impl<L: AsRef<Snapshot>> ReadView for SnapshotChain<'_, L> {
    fn keys(&self) -> BTreeSet<String> {
        let mut keys = self.store.keys();
        for layer in self.layers {
            keys.extend(layer.as_ref().changes().keys().cloned());
        }
        keys
    }

    fn version(&self, key: &str) -> Option<Version> {
        match self.resolve(key) {
            Some(change) => Some(change.base_version),
            None => self.store.version(key),
        }
    }

    fn get(&self, key: &str) -> Option<String> {
        match self.resolve(key) {
            Some(change) => change.value.clone(),
            None => self.store.get(key),
        }
    }
}
