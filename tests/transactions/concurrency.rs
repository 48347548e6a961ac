//! Parallel transactions, conflicts and protocol interplay
//!
//! Threads are released together with a `Barrier` so their bodies overlap.

use std::sync::{Arc, Barrier};
use std::thread;

use snapkv::{Command, Database, SnapConfig, SnapError};
use snapkv_core::{ReadView, Version};

use crate::{count, db, delete, get, set};

fn join_all<T>(handles: Vec<thread::JoinHandle<T>>) -> Vec<T> {
    handles.into_iter().map(|h| h.join().unwrap()).collect()
}

// ============================================================================
// Disjoint writers
// ============================================================================

#[test]
fn many_parallel_transactions() {
    let db = db();
    let barrier = Arc::new(Barrier::new(100));

    let handles = (0..100)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let key = i.to_string();
                barrier.wait();
                db.with_transaction(|txn| {
                    txn.set(&key, "123");
                    txn.delete(&key);
                    txn.set(&key, "abc");
                    txn.commit();
                })
            })
        })
        .collect();

    assert!(join_all(handles).iter().all(Result::is_ok));
    assert_eq!(db.execute(count("abc")), "100");
}

#[test]
fn disjoint_writers_both_succeed() {
    let db = db();
    db.execute(set("foo", "123"));
    db.execute(set("bar", "456"));
    let barrier = Arc::new(Barrier::new(2));

    let handles = [("foo", "456"), ("bar", "123")]
        .into_iter()
        .map(|(key, value)| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                db.with_transaction(|txn| {
                    txn.set(key, value);
                    barrier.wait();
                    txn.commit();
                })
            })
        })
        .collect();

    assert!(join_all(handles).iter().all(Result::is_ok));
    assert_eq!(db.execute(get("foo")), "456");
    assert_eq!(db.execute(get("bar")), "123");
}

#[test]
fn parallel_writers_with_simulated_latency() {
    let config = SnapConfig {
        io_latency_ms: 2,
        ..SnapConfig::default()
    };
    let db = Database::new(config).unwrap();
    let barrier = Arc::new(Barrier::new(16));

    let handles = (0..16)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                db.with_transaction(|txn| {
                    txn.set(&format!("k{}", i), "v");
                    txn.commit();
                })
            })
        })
        .collect();

    assert!(join_all(handles).iter().all(Result::is_ok));
    assert_eq!(db.store().count("v"), 16);
}

// ============================================================================
// Conflicts
// ============================================================================

#[test]
fn sequential_writers_on_same_key_do_not_conflict() {
    let db = db();
    db.execute(set("foo", "123"));
    for value in ["456", "789"] {
        db.with_transaction(|txn| {
            txn.set("foo", value);
            txn.commit();
        })
        .unwrap();
    }
    assert_eq!(db.execute(get("foo")), "789");
    assert_eq!(db.store().version("foo"), Some(Version::new(2)));
}

#[test]
fn second_merge_on_same_base_version_fails() {
    let db = db();
    db.execute(set("foo", "123"));
    let barrier = Arc::new(Barrier::new(2));

    let handles = ["456", "789"]
        .into_iter()
        .map(|value| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let result = db.with_transaction(|txn| {
                    txn.set("foo", value);
                    // Both have captured base version 0 before either merges
                    barrier.wait();
                    txn.commit();
                });
                (value, result)
            })
        })
        .collect();

    let results = join_all(handles);
    let winners: Vec<_> = results.iter().filter(|(_, r)| r.is_ok()).collect();
    let losers: Vec<_> = results.iter().filter(|(_, r)| r.is_err()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(losers.len(), 1);

    match &losers[0].1 {
        Err(SnapError::Conflict {
            key,
            base_version,
            current_version,
        }) => {
            assert_eq!(key, "foo");
            assert_eq!(*base_version, Version::new(0));
            assert_eq!(*current_version, Version::new(1));
        }
        other => panic!("expected conflict, got {:?}", other),
    }
    assert_eq!(db.execute(get("foo")), winners[0].0);
    assert_eq!(db.metrics().total_conflicted, 1);
}

#[test]
fn conflicting_transaction_applies_nothing() {
    let db = db();
    db.execute(set("shared", "0"));

    let result = db.with_transaction(|txn| {
        txn.set("private", "mine");
        txn.set("shared", "mine");
        db.execute(set("shared", "theirs"));
        txn.commit();
    });

    assert!(result.unwrap_err().is_conflict());
    assert_eq!(db.execute(get("private")), "Key private not set");
    assert_eq!(db.execute(get("shared")), "theirs");
}

#[test]
fn interpreter_commit_conflicts_with_structured_merge() {
    let db = db();
    db.execute(set("k", "0"));
    db.execute(Command::Begin);
    db.execute(set("k", "interpreter"));

    db.with_transaction(|txn| {
        txn.set("k", "structured");
        txn.commit();
    })
    .unwrap();

    let result = db.execute(Command::Commit);
    assert_eq!(
        result,
        "Error: Conflict on k: expected version 0, found 1"
    );
    assert_eq!(db.depth(), 0);
    assert_eq!(db.execute(get("k")), "structured");
}

/// Deleting a key drops its version, so a writer whose base predates the
/// delete is not detected as stale. This is current, intended behavior.
#[test]
fn deleted_key_accepts_stale_writer() {
    let db = db();
    db.execute(set("k", "original"));

    let result = db.with_transaction(|txn| {
        txn.set("k", "stale");
        db.execute(delete("k"));
        txn.commit();
    });
    assert!(result.is_ok());
    assert_eq!(db.execute(get("k")), "stale");

    // Deleted and recreated: the recreated key is back at version 0
    let result = db.with_transaction(|txn| {
        txn.set("k", "stale again");
        db.execute(delete("k"));
        db.execute(set("k", "recreated"));
        txn.commit();
    });
    assert!(result.is_ok());
    assert_eq!(db.execute(get("k")), "stale again");
}

// ============================================================================
// Protocol interplay
// ============================================================================

#[test]
fn interpreter_commands_from_many_threads_are_serialized() {
    let db = db();
    let barrier = Arc::new(Barrier::new(8));

    let handles = (0..8)
        .map(|t| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for n in 0..25 {
                    db.execute(Command::Begin);
                    db.execute(set(&format!("t{}-{}", t, n), "x"));
                    db.execute(Command::Commit);
                }
            })
        })
        .collect();
    join_all(handles);

    // Begins and commits interleave across threads but always balance
    assert_eq!(db.depth(), 0);
    assert_eq!(db.execute(count("x")), "200");
}

#[test]
fn structured_bodies_run_while_interpreter_transaction_is_open() {
    let db = db();
    db.execute(Command::Begin);
    db.execute(set("interp", "pending"));

    let barrier = Arc::new(Barrier::new(4));
    let handles = (0..4)
        .map(|i| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                db.with_transaction(|txn| {
                    assert_eq!(txn.get("interp"), "Key interp not set");
                    txn.set(&format!("s{}", i), "done");
                    barrier.wait();
                    txn.commit();
                })
            })
        })
        .collect();
    assert!(join_all(handles).iter().all(Result::is_ok));

    assert_eq!(db.depth(), 1);
    assert_eq!(db.execute(count("done")), "4");
    assert_eq!(db.execute(Command::Commit), "");
    assert_eq!(db.execute(get("interp")), "pending");
}
