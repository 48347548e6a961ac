//! Store merge
//!
//! A top-level snapshot's change set lands in the store in two phases under
//! one exclusive lock:
//!
//! ```text
//! 1. lock the store
//! 2. validate every change against the store's current versions
//! 3. IF any conflict: release the lock, return ValidationFailed
//! 4. apply every change (tombstone => remove, value => set)
//! 5. release the lock
//! ```
//!
//! Holding the lock across both phases means no other merge can validate
//! between this merge's validation and its writes.

use snapkv_core::{Change, SnapError};
use snapkv_storage::Store;
use tracing::debug;

use crate::snapshot::ChangeSet;
use crate::validation::{validate_changes, ValidationResult};

/// Error type for merge failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommitError {
    /// Merge rejected because at least one base version was stale
    #[error("Commit failed: {} conflict(s)", .0.conflict_count())]
    ValidationFailed(ValidationResult),
}

impl CommitError {
    /// Validation details
    pub fn validation(&self) -> &ValidationResult {
        match self {
            CommitError::ValidationFailed(result) => result,
        }
    }
}

impl From<CommitError> for SnapError {
    fn from(e: CommitError) -> Self {
        match e {
            CommitError::ValidationFailed(mut result) => {
                // ValidationFailed always carries at least one conflict
                if result.conflicts.is_empty() {
                    return SnapError::invalid_input("Commit failed without conflicts");
                }
                result.conflicts.swap_remove(0).into()
            }
        }
    }
}

/// Counts of changes applied by a merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyResult {
    /// Keys set to a value
    pub written: usize,
    /// Keys removed
    pub deleted: usize,
}

impl ApplyResult {
    /// Total number of changes applied
    pub fn total(&self) -> usize {
        self.written + self.deleted
    }

    pub(crate) fn record(&mut self, change: &Change) {
        if change.is_tombstone() {
            self.deleted += 1;
        } else {
            self.written += 1;
        }
    }
}

/// Merge a top-level change set into the store, all or nothing
pub fn merge_into_store(store: &Store, changes: ChangeSet) -> Result<ApplyResult, CommitError> {
    let mut guard = store.lock();

    let validation = validate_changes(&changes, |key| guard.version(key));
    if !validation.is_valid() {
        debug!(
            target: "snapkv::txn",
            conflicts = validation.conflict_count(),
            "store merge rejected"
        );
        return Err(CommitError::ValidationFailed(validation));
    }

    let mut applied = ApplyResult::default();
    for (key, change) in changes {
        applied.record(&change);
        guard.set(&key, change.value);
    }
    debug!(
        target: "snapkv::txn",
        written = applied.written,
        deleted = applied.deleted,
        "store merge applied"
    );
    Ok(applied)
}
