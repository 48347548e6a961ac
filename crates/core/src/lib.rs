//! Core types and traits for SnapKV
//!
//! This crate defines the foundational types used throughout the system:
//! - Version: per-key optimistic concurrency counter
//! - TxnId: transaction identifier allocated by the engine
//! - Record: a value stored in the root keyspace
//! - Change: a pending write (or tombstone) held by a snapshot
//! - Command: the closed set of interpreter commands
//! - ReadView: read surface shared by the store and snapshot chains
//! - SnapError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod error;
pub mod traits;
pub mod types;

pub use command::Command;
pub use error::{SnapError, SnapResult};
pub use traits::ReadView;
pub use types::{Change, Record, TxnId, Version};
