//! Change-set validation for OCC
//!
//! Validation runs before any change is applied. Rules:
//! - A key the target has a version for must still be at the change's base version
//! - A key the target has no version for is accepted unconditionally
//! - All conflicts are collected; one conflict is enough to reject the merge
//!
//! The second rule means a key deleted and recreated behind a writer's back
//! is not detected: deletion forgets the version the writer based itself on.

use snapkv_core::{SnapError, Version};

use crate::snapshot::ChangeSet;

/// Types of conflicts detected while validating a change set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictType {
    /// The target's version of `key` moved since the change was recorded
    VersionMismatch {
        /// The key that has a conflict
        key: String,
        /// Version recorded at the first write in the snapshot
        base_version: Version,
        /// Version found in the target at validation time
        current_version: Version,
    },
}

impl ConflictType {
    /// Key involved in the conflict
    pub fn key(&self) -> &str {
        match self {
            ConflictType::VersionMismatch { key, .. } => key,
        }
    }
}

impl From<ConflictType> for SnapError {
    fn from(conflict: ConflictType) -> Self {
        match conflict {
            ConflictType::VersionMismatch {
                key,
                base_version,
                current_version,
            } => SnapError::Conflict {
                key,
                base_version,
                current_version,
            },
        }
    }
}

/// Result of validating a change set
///
/// A merge proceeds only if `is_valid()` returns true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// All conflicts detected during validation, in key order
    pub conflicts: Vec<ConflictType>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        ValidationResult {
            conflicts: Vec::new(),
        }
    }

    /// Check if validation passed (no conflicts)
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// First conflict in key order
    pub fn first(&self) -> Option<&ConflictType> {
        self.conflicts.first()
    }
}

/// Validate `changes` against the versions a merge target currently holds
///
/// `current_version` is queried once per changed key.
pub fn validate_changes<F>(changes: &ChangeSet, current_version: F) -> ValidationResult
where
    F: Fn(&str) -> Option<Version>,
{
    let mut result = ValidationResult::ok();
    for (key, change) in changes {
        let Some(current) = current_version(key) else {
            continue;
        };
        if current != change.base_version {
            result.conflicts.push(ConflictType::VersionMismatch {
                key: key.clone(),
                base_version: change.base_version,
                current_version: current,
            });
        }
    }
    result
}
