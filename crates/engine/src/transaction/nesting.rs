//! Thread-local record of open top-level closure transactions
//!
//! Nesting a closure transaction goes through the enclosing
//! `TransactionScope`. Calling `Database::with_transaction` again from inside
//! a body on the same thread would branch an unrelated transaction from the
//! store, so it is refused with a protocol violation panic.
//!
//! Each thread tracks the databases it currently has a top-level body open
//! on. Transactions on other databases, or on other threads, are unaffected.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_DATABASE: AtomicU64 = AtomicU64::new(1);

thread_local! {
    /// Databases with a top-level closure transaction open on this thread
    static OPEN_BODIES: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Identity of a database for nesting checks
pub(crate) fn next_database_id() -> u64 {
    NEXT_DATABASE.fetch_add(1, Ordering::Relaxed)
}

/// Marks a top-level body as open until dropped
///
/// Dropped on normal return and while unwinding, so a panicking body
/// never leaves its database marked.
pub(crate) struct BodyGuard {
    database: u64,
}

impl BodyGuard {
    /// Mark `database` as running a top-level body on this thread
    ///
    /// # Panics
    ///
    /// Panics with a protocol violation if this thread is already inside a
    /// top-level body on the same database.
    pub(crate) fn enter(database: u64) -> Self {
        let reentered = OPEN_BODIES.with(|open| {
            let mut open = open.borrow_mut();
            if open.contains(&database) {
                true
            } else {
                open.push(database);
                false
            }
        });
        if reentered {
            panic!(
                "protocol violation: Database::with_transaction called inside an open \
                 transaction body; nest with TransactionScope::with_transaction"
            );
        }
        BodyGuard { database }
    }
}

impl Drop for BodyGuard {
    fn drop(&mut self) {
        OPEN_BODIES.with(|open| {
            let mut open = open.borrow_mut();
            if let Some(pos) = open.iter().rposition(|&id| id == self.database) {
                open.remove(pos);
            }
        });
    }
}
