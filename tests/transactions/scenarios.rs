//! Literal command sequences and their textual results

use snapkv::{Command, Session};

use crate::{count, db, delete, get, set};

#[test]
fn set_and_get_value() {
    let db = db();
    db.execute(set("foo", "123"));
    assert_eq!(db.execute(get("foo")), "123");
}

#[test]
fn delete_value() {
    let db = db();
    db.execute(set("foo", "123"));
    db.execute(delete("foo"));
    assert_eq!(db.execute(get("foo")), "Key foo not set");
}

#[test]
fn count_values() {
    let db = db();
    db.execute(set("a", "123"));
    db.execute(set("b", "456"));
    db.execute(set("c", "123"));
    assert_eq!(db.execute(count("123")), "2");
    assert_eq!(db.execute(count("456")), "1");
    assert_eq!(db.execute(count("789")), "0");
}

#[test]
fn commit_with_interpreter() {
    let db = db();
    db.execute(set("bar", "123"));
    assert_eq!(db.execute(get("bar")), "123");
    assert_eq!(db.execute(Command::Begin), "");
    db.execute(set("foo", "456"));
    assert_eq!(db.execute(get("bar")), "123");
    db.execute(delete("bar"));
    assert_eq!(db.execute(Command::Commit), "");
    assert_eq!(db.execute(get("bar")), "Key bar not set");
    assert_eq!(db.execute(Command::Commit), "No transaction");
    assert_eq!(db.execute(get("foo")), "456");
}

#[test]
fn commit_with_structured_scope() {
    let db = db();
    db.execute(set("bar", "123"));
    db.with_transaction(|txn| {
        txn.set("foo", "456");
        assert_eq!(txn.get("bar"), "123");
        txn.delete("bar");
        txn.commit();
    })
    .unwrap();
    assert_eq!(db.execute(get("bar")), "Key bar not set");
    assert_eq!(db.execute(Command::Commit), "No transaction");
    assert_eq!(db.execute(get("foo")), "456");
}

#[test]
fn rollback_with_interpreter() {
    let db = db();
    db.execute(set("foo", "123"));
    db.execute(set("bar", "abc"));
    assert_eq!(db.execute(Command::Begin), "");
    db.execute(set("foo", "456"));
    assert_eq!(db.execute(get("foo")), "456");
    db.execute(set("bar", "def"));
    assert_eq!(db.execute(get("bar")), "def");
    assert_eq!(db.execute(Command::Rollback), "");
    assert_eq!(db.execute(get("foo")), "123");
    assert_eq!(db.execute(get("bar")), "abc");
    assert_eq!(db.execute(Command::Rollback), "No transaction");
}

#[test]
fn rollback_with_structured_scope() {
    let db = db();
    db.execute(set("foo", "123"));
    db.execute(set("bar", "abc"));
    db.with_transaction(|txn| {
        txn.set("foo", "456");
        assert_eq!(txn.get("foo"), "456");
        txn.set("bar", "def");
        assert_eq!(txn.get("bar"), "def");
        txn.rollback();
    })
    .unwrap();
    assert_eq!(db.execute(get("foo")), "123");
    assert_eq!(db.execute(get("bar")), "abc");
    assert_eq!(db.execute(Command::Rollback), "No transaction");
}

#[test]
fn nested_transactions() {
    let db = db();
    db.execute(set("foo", "123"));
    db.execute(set("bar", "456"));
    assert_eq!(db.execute(Command::Begin), "");
    db.execute(set("foo", "456"));
    assert_eq!(db.execute(Command::Begin), "");
    assert_eq!(db.execute(count("456")), "2");
    assert_eq!(db.execute(get("foo")), "456");
    db.execute(set("foo", "789"));
    assert_eq!(db.execute(get("foo")), "789");
    assert_eq!(db.execute(Command::Rollback), "");
    assert_eq!(db.execute(get("foo")), "456");
    db.execute(delete("foo"));
    assert_eq!(db.execute(get("foo")), "Key foo not set");
    assert_eq!(db.execute(Command::Rollback), "");
    assert_eq!(db.execute(get("foo")), "123");
}

#[test]
fn many_sequential_transactions() {
    let db = db();
    for i in 0..100 {
        db.with_transaction(|txn| {
            txn.set(&i.to_string(), "abc");
            txn.commit();
        })
        .unwrap();
    }
    assert_eq!(db.execute(count("abc")), "100");
}

#[test]
fn empty_stack_commit_and_rollback_change_nothing() {
    let db = db();
    db.execute(set("k", "v"));
    let before = db.metrics();
    assert_eq!(db.execute(Command::Commit), "No transaction");
    assert_eq!(db.execute(Command::Rollback), "No transaction");
    let after = db.metrics();
    assert_eq!(after.total_started, before.total_started);
    assert_eq!(db.execute(get("k")), "v");
    assert_eq!(db.depth(), 0);
}

#[test]
fn text_session_transcript() {
    let session = Session::new(db());
    let transcript: Vec<String> = [
        "set bar 123",
        "BEGIN",
        "set foo 456",
        "delete bar",
        "bogus",
        "commit",
        "get bar",
        "get foo",
    ]
    .iter()
    .map(|line| match session.submit(line) {
        snapkv::Submission::Executed { echo, result } => format!("{} => {}", echo, result),
        snapkv::Submission::Rejected { error } => format!("! {}", error),
    })
    .collect();

    assert_eq!(
        transcript,
        vec![
            "> set bar 123 => ",
            "> BEGIN => ",
            "> set foo 456 => ",
            "> delete bar => ",
            "! Unknown command: bogus",
            "> commit => ",
            "> get bar => Key bar not set",
            "> get foo => 456",
        ]
    );
}
