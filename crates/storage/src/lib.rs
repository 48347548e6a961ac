//! Root keyspace for SnapKV
//!
//! This crate implements the shared, versioned backing map that every
//! top-level transaction merges into:
//! - Store: FxHashMap of records behind a `parking_lot::RwLock`
//! - StoreGuard: exclusive access used for atomic validate-then-apply merges
//! - IoLatency: optional simulated I/O delay on store reads and writes
//!
//! Versions are per key. The store never allocates a global version; the
//! first write of a key receives version 0 and each overwrite increments it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod latency;
pub mod store;

pub use latency::IoLatency;
pub use store::{Store, StoreGuard};
