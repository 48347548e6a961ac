//! Concurrency layer for SnapKV
//!
//! This crate implements snapshot isolation with optimistic conflict
//! detection:
//! - Snapshot: copy-on-write change set layered over a parent view
//! - SnapshotChain: read view of a stack of snapshots rooted at the Store
//! - Validation: per-key base-version checks run before any write is applied
//! - Store merge: validate-then-apply under one exclusive store lock
//! - Transaction / TransactionStack: arena-style nesting without parent pointers
//!
//! A child snapshot never points at its parent. Parents are supplied as a
//! [`ReadView`](snapkv_core::ReadView) whenever the child reads, writes or
//! merges, which lets a stack of snapshots live in one `Vec`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod merge;
pub mod snapshot;
pub mod stack;
pub mod transaction;
pub mod validation;

pub use merge::{merge_into_store, ApplyResult, CommitError};
pub use snapshot::{ChangeSet, Overlay, Snapshot, SnapshotChain};
pub use stack::TransactionStack;
pub use transaction::Transaction;
pub use validation::{validate_changes, ConflictType, ValidationResult};
