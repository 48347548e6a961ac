//! Closure transactions, nesting, panics and the result log

use std::panic::{self, AssertUnwindSafe};

use snapkv::{Command, Database, SnapConfig, SnapError, CONFIG_FILE_NAME};
use tempfile::TempDir;

use crate::{db, get, set};

// ============================================================================
// Nesting
// ============================================================================

#[test]
fn nested_rollback_restores_values_from_before_the_nested_scope() {
    let db = db();
    db.execute(set("a", "store"));
    db.execute(set("b", "store"));

    db.with_transaction(|outer| {
        outer.set("a", "outer");
        outer.delete("b");
        outer
            .with_transaction(|inner| {
                inner.set("a", "inner");
                inner.set("b", "inner");
                inner.set("c", "inner");
                assert_eq!(inner.count("inner"), "3");
                inner.rollback();
            })
            .unwrap();
        assert_eq!(outer.get("a"), "outer");
        assert_eq!(outer.get("b"), "Key b not set");
        assert_eq!(outer.get("c"), "Key c not set");
        outer.commit();
    })
    .unwrap();

    assert_eq!(db.execute(get("a")), "outer");
    assert_eq!(db.execute(get("b")), "Key b not set");
}

#[test]
fn nested_commit_is_visible_to_parent_only_after_it_ends() {
    let db = db();
    db.with_transaction(|outer| {
        outer
            .with_transaction(|inner| {
                inner.set("k", "nested");
                inner.commit();
            })
            .unwrap();
        assert_eq!(outer.get("k"), "nested");
        assert_eq!(db.execute(get("k")), "Key k not set");
        outer.commit();
    })
    .unwrap();
    assert_eq!(db.execute(get("k")), "nested");
}

#[test]
fn deep_nesting_reports_depth_and_merges_level_by_level() {
    let db = db();
    let depth = db
        .with_transaction(|one| {
            one.with_transaction(|two| {
                two.with_transaction(|three| {
                    three.set("deep", "yes");
                    three.commit();
                    three.depth()
                })
                .unwrap()
            })
            .unwrap()
        })
        .unwrap();
    assert_eq!(depth, 3);
    // Middle levels never committed
    assert_eq!(db.execute(get("deep")), "Key deep not set");
}

#[test]
fn last_outcome_call_wins() {
    let db = db();
    db.with_transaction(|txn| {
        txn.set("k", "v");
        txn.rollback();
        txn.commit();
    })
    .unwrap();
    assert_eq!(db.execute(get("k")), "v");
}

#[test]
fn scope_performs_commands() {
    let db = db();
    let output = db
        .with_transaction(|txn| {
            txn.perform(&set("k", "v")).unwrap();
            assert!(txn.perform(&Command::Begin).is_err());
            let output = txn.perform(&get("k")).unwrap();
            txn.perform(&Command::Commit).unwrap();
            output
        })
        .unwrap();
    assert_eq!(output.to_string(), "v");
    assert_eq!(db.execute(get("k")), "v");
}

// ============================================================================
// Panics
// ============================================================================

#[test]
fn panic_in_body_discards_changes_and_propagates() {
    let db = db();
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = db.with_transaction(|txn| {
            txn.set("k", "v");
            txn.commit();
            panic!("body failed");
        });
    }));
    assert!(result.is_err());
    assert_eq!(db.execute(get("k")), "Key k not set");

    let metrics = db.metrics();
    assert_eq!(metrics.active_count, 0);
    assert_eq!(metrics.total_rolled_back, 1);
}

#[test]
fn caught_nested_panic_leaves_parent_open() {
    let db = db();
    db.with_transaction(|outer| {
        outer.set("k", "outer");
        let nested = panic::catch_unwind(AssertUnwindSafe(|| {
            let _ = outer.with_transaction(|inner| {
                inner.set("k", "inner");
                panic!("nested failed");
            });
        }));
        assert!(nested.is_err());
        assert_eq!(outer.depth(), 1);
        assert_eq!(outer.get("k"), "outer");
        outer.commit();
    })
    .unwrap();
    assert_eq!(db.execute(get("k")), "outer");
}

#[test]
fn reentering_the_database_inside_a_body_is_refused() {
    let db = db();
    let handle = db.clone();

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = db.with_transaction(|outer| {
            outer.set("k", "outer");
            let _ = handle.with_transaction(|inner| {
                inner.set("k", "detached");
                inner.commit();
            });
            outer.commit();
        });
    }));

    let payload = result.unwrap_err();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_default();
    assert!(message.contains("protocol violation"), "{message}");
    assert_eq!(db.execute(get("k")), "Key k not set");

    // The database is usable afterwards on the same thread
    db.with_transaction(|txn| {
        txn.set("k", "later");
        txn.commit();
    })
    .unwrap();
    assert_eq!(db.execute(get("k")), "later");
}

#[test]
#[should_panic(expected = "protocol violation")]
fn ending_a_transaction_below_the_top_panics() {
    use snapkv_concurrency::TransactionStack;
    use snapkv_core::TxnId;

    let db = db();
    let mut stack = TransactionStack::new(db.store().clone());
    stack.begin(TxnId::new(1));
    stack.begin(TxnId::new(2));
    stack.end(TxnId::new(1));
}

// ============================================================================
// Result log
// ============================================================================

#[test]
fn log_receives_reads_in_order() {
    let db = db();
    let mut stream = db.subscribe().unwrap();
    assert!(db.subscribe().is_none());

    db.execute(set("a", "1"));
    db.execute(get("a"));
    db.with_transaction(|txn| {
        txn.get("missing");
        txn.count("1");
    })
    .unwrap();
    db.execute(Command::Rollback);

    assert_eq!(stream.drain(), vec!["1", "Key missing not set", "1", "No transaction"]);
}

#[test]
fn full_log_drops_entries_without_blocking() {
    let config = SnapConfig {
        log_capacity: 2,
        ..SnapConfig::default()
    };
    let db = Database::new(config).unwrap();
    let mut stream = db.subscribe().unwrap();

    for _ in 0..5 {
        db.execute(get("k"));
    }
    assert_eq!(db.dropped_log_entries(), 3);
    assert_eq!(stream.drain().len(), 2);

    db.execute(get("k"));
    assert_eq!(stream.drain(), vec!["Key k not set"]);
}

#[tokio::test]
async fn async_consumer_sees_every_entry_until_close() {
    let db = db();
    let mut stream = db.subscribe().unwrap();

    let consumer = tokio::spawn(async move {
        let mut entries = Vec::new();
        while let Some(entry) = stream.recv().await {
            entries.push(entry);
        }
        entries
    });

    let writer = {
        let db = db.clone();
        tokio::task::spawn_blocking(move || {
            for i in 0..10 {
                db.execute(set(&format!("k{}", i), "v"));
            }
            db.execute(Command::Count { value: "v".into() });
        })
    };
    writer.await.unwrap();
    drop(db);

    assert_eq!(consumer.await.unwrap(), vec!["10"]);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn database_from_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "log_capacity = 1\nio_latency_ms = 1\n").unwrap();

    let db = Database::new(SnapConfig::from_file(&path).unwrap()).unwrap();
    assert_eq!(db.config().log_capacity, 1);
    assert!(db.store().latency().is_enabled());

    let mut stream = db.subscribe().unwrap();
    db.execute(get("a"));
    db.execute(get("b"));
    assert_eq!(stream.drain(), vec!["Key a not set"]);
    assert_eq!(db.dropped_log_entries(), 1);
}

#[test]
fn invalid_config_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "log_capacity = 0\n").unwrap();
    assert!(matches!(
        SnapConfig::from_file(&path),
        Err(SnapError::Config { .. })
    ));
}
