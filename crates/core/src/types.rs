//! Record, change and identifier types
//!
//! Versions exist purely for optimistic conflict detection. They are
//! per-key counters: the first write of a key starts at [`Version::INITIAL`],
//! each overwrite advances it by one, and a delete discards it together with
//! the record. No history is retained.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-key version counter
///
/// ## Invariants
///
/// - A present key always has a version, an absent key never has one
/// - Overwriting a key yields `previous.next()`
/// - Recreating a deleted key starts again at [`Version::INITIAL`]
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version(u64);

impl Version {
    /// Version assigned to a key the first time it is written
    pub const INITIAL: Version = Version(0);

    /// Wrap a raw counter value
    pub const fn new(raw: u64) -> Self {
        Version(raw)
    }

    /// Raw counter value
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// The version an overwrite of this version receives
    #[must_use]
    pub const fn next(self) -> Self {
        Version(self.0.saturating_add(1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(raw: u64) -> Self {
        Version(raw)
    }
}

/// Transaction identifier
///
/// Allocated by the engine's coordinator, unique for the lifetime of a
/// database. Used to check that a transaction being ended is the one at
/// the top of its stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxnId(u64);

impl TxnId {
    /// Wrap a raw identifier
    pub const fn new(raw: u64) -> Self {
        TxnId(raw)
    }

    /// Raw identifier value
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// A value stored in the root keyspace together with its version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Current value
    pub value: String,
    /// Current version
    pub version: Version,
}

impl Record {
    /// Record for a key written for the first time
    pub fn initial(value: impl Into<String>) -> Self {
        Record {
            value: value.into(),
            version: Version::INITIAL,
        }
    }

    /// Record replacing this one, with the version advanced
    pub fn successor(&self, value: impl Into<String>) -> Self {
        Record {
            value: value.into(),
            version: self.version.next(),
        }
    }
}

/// A pending write held by a snapshot
///
/// `value == None` is a tombstone: the key is deleted in this snapshot,
/// which is distinct from the snapshot holding no change for the key.
/// `base_version` is the parent's version of the key observed at the first
/// write to the key within the snapshot (`0` if the parent had none).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// New value, or `None` for a deletion
    pub value: Option<String>,
    /// Parent version the write was based on
    pub base_version: Version,
}

impl Change {
    /// A write of `value` based on `base_version`
    pub fn put(value: impl Into<String>, base_version: Version) -> Self {
        Change {
            value: Some(value.into()),
            base_version,
        }
    }

    /// A deletion based on `base_version`
    pub fn tombstone(base_version: Version) -> Self {
        Change {
            value: None,
            base_version,
        }
    }

    /// Whether this change deletes the key
    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }

    /// The written value, if this is not a tombstone
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}
