//! Transaction coordinator for managing transaction lifecycle
//!
//! The TransactionCoordinator hands out transaction ids and keeps metrics
//! for both protocols:
//! - Active transaction tracking
//! - Transaction metrics (started, committed, rolled back, conflicted)
//! - Commit rate calculation
//!
//! Every transaction is counted once when it begins and once when it ends,
//! including autocommit wrappers and nested scopes.

use std::sync::atomic::{AtomicU64, Ordering};

use snapkv_core::TxnId;
use tracing::debug;

/// Transaction coordinator for the database
///
/// # Memory Ordering
///
/// The metric counters use Relaxed ordering. They are observational only and
/// do not synchronize any other memory. Id allocation is also Relaxed: ids
/// only need to be unique, not ordered with other operations.
#[derive(Debug)]
pub struct TransactionCoordinator {
    /// Next transaction id to hand out
    next_txn_id: AtomicU64,
    /// Active transaction count
    active_count: AtomicU64,
    /// Total transactions started
    total_started: AtomicU64,
    /// Total transactions merged into their parent
    total_committed: AtomicU64,
    /// Total transactions discarded (rollback, never committed, or panicked)
    total_rolled_back: AtomicU64,
    /// Total transactions rejected by merge validation
    total_conflicted: AtomicU64,
}

impl Default for TransactionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionCoordinator {
    /// Create a coordinator with all counters at zero
    pub fn new() -> Self {
        Self {
            next_txn_id: AtomicU64::new(1),
            active_count: AtomicU64::new(0),
            total_started: AtomicU64::new(0),
            total_committed: AtomicU64::new(0),
            total_rolled_back: AtomicU64::new(0),
            total_conflicted: AtomicU64::new(0),
        }
    }

    /// Allocate an id for a new transaction and count it as started
    pub fn begin(&self) -> TxnId {
        let id = TxnId::new(self.next_txn_id.fetch_add(1, Ordering::Relaxed));
        self.active_count.fetch_add(1, Ordering::Relaxed);
        self.total_started.fetch_add(1, Ordering::Relaxed);
        debug!(target: "snapkv::txn", txn = %id, "Transaction started");
        id
    }

    /// Record a transaction whose changes were merged
    pub fn record_commit(&self) {
        self.finish();
        self.total_committed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transaction discarded without merging
    pub fn record_rollback(&self) {
        self.finish();
        self.total_rolled_back.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a transaction whose merge was rejected
    pub fn record_conflict(&self) {
        self.finish();
        self.total_conflicted.fetch_add(1, Ordering::Relaxed);
    }

    fn finish(&self) {
        // Saturating decrement so a stray record never wraps the gauge
        let _ = self
            .active_count
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |x| {
                Some(x.saturating_sub(1))
            });
    }

    /// Number of transactions currently open
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::Relaxed)
    }

    /// Get current transaction metrics
    pub fn metrics(&self) -> TransactionMetrics {
        let started = self.total_started.load(Ordering::Relaxed);
        let committed = self.total_committed.load(Ordering::Relaxed);

        TransactionMetrics {
            active_count: self.active_count.load(Ordering::Relaxed),
            total_started: started,
            total_committed: committed,
            total_rolled_back: self.total_rolled_back.load(Ordering::Relaxed),
            total_conflicted: self.total_conflicted.load(Ordering::Relaxed),
            commit_rate: if started > 0 {
                committed as f64 / started as f64
            } else {
                0.0
            },
        }
    }
}

/// Point-in-time copy of the coordinator's counters
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionMetrics {
    /// Transactions currently open
    pub active_count: u64,
    /// Transactions started since the database was created
    pub total_started: u64,
    /// Transactions merged into their parent
    pub total_committed: u64,
    /// Transactions discarded without merging
    pub total_rolled_back: u64,
    /// Transactions rejected by merge validation
    pub total_conflicted: u64,
    /// `total_committed / total_started`, 0 when nothing started
    pub commit_rate: f64,
}

impl TransactionMetrics {
    /// Transactions that have ended, by any outcome
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_rolled_back + self.total_conflicted
    }

    /// Share of started transactions that did not merge
    pub fn abort_rate(&self) -> f64 {
        if self.total_started > 0 {
            (self.total_rolled_back + self.total_conflicted) as f64 / self.total_started as f64
        } else {
            0.0
        }
    }
}
