//! Integration tests for the environment hierarchy.

use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use pilot_core::ErrorKind;
use pilot_env::{EnvPayload, SetOptions};

use crate::helpers::{Journal, root_env};

#[test]
fn test_child_resolves_through_ancestors() {
    let root = root_env();
    root.set_one("theme", json!("dark")).unwrap();
    let child = root.child();
    let grandchild = child.child();

    assert_eq!(grandchild.get("theme"), Some(json!("dark")));
    assert!(grandchild.has("theme"));
    assert!(!grandchild.has_local("theme"));
    assert_eq!(grandchild.depth(), 2);
    assert!(grandchild.parent().unwrap().ptr_eq(&child));
    assert!(Arc::ptr_eq(grandchild.settings(), root.settings()));
}

#[test]
fn test_child_shadows_without_touching_parent() {
    let root = root_env();
    root.set_one("mode", json!("insert")).unwrap();
    let child = root.child();

    child.set_one("mode", json!("normal")).unwrap();

    assert_eq!(child.get("mode"), Some(json!("normal")));
    assert_eq!(root.get("mode"), Some(json!("insert")));
}

#[test]
fn test_change_is_announced_on_setting_scope_only() {
    let root = root_env();
    let child = root.child();
    let journal = Journal::new();

    let sink = journal.clone();
    root.listen("change", move |_| {
        sink.push("root");
        Ok(())
    });
    let sink = journal.clone();
    let expected = child.clone();
    child.listen("change:count", move |event| {
        assert!(event.env.ptr_eq(&expected));
        if let EnvPayload::Change { previous, value, .. } = &event.payload {
            sink.push(format!("child {previous:?} -> {value}"));
        }
        Ok(())
    });

    child.set_one("count", json!(1)).unwrap();

    assert_eq!(journal.entries(), vec!["child None -> 1"]);
}

#[test]
fn test_equal_value_is_not_announced() {
    let root = root_env();
    let journal = Journal::new();
    let sink = journal.clone();
    root.listen("change", move |_| {
        sink.push("change");
        Ok(())
    });

    root.set_one("list", json!([1, 2, 3])).unwrap();
    root.set_one("list", json!([1, 2, 3])).unwrap();
    root.set_one("list", json!([1, 2])).unwrap();

    assert_eq!(journal.count("change"), 2);
}

#[test]
fn test_silent_set_binds_quietly() {
    let root = root_env();
    let journal = Journal::new();
    let sink = journal.clone();
    root.listen("change", move |_| {
        sink.push("change");
        Ok(())
    });

    root.set([("a", json!(1)), ("b", json!(2))], SetOptions::silent())
        .unwrap();

    assert!(journal.entries().is_empty());
    assert_eq!(root.local_keys(), vec!["a", "b"]);
}

#[test]
fn test_batch_sees_listener_writes() {
    let root = root_env();
    let writer = root.clone();
    root.listen("change:first", move |_| writer.set_one("second", json!("from listener")));

    let previous = Arc::new(Mutex::new(Vec::new()));
    let sink = previous.clone();
    root.listen("change:second", move |event| {
        if let EnvPayload::Change { previous, .. } = &event.payload {
            sink.lock().push(previous.clone());
        }
        Ok(())
    });

    root.set(
        [("first", json!(1)), ("second", json!("from batch"))],
        SetOptions::default(),
    )
    .unwrap();

    assert_eq!(root.get("second"), Some(json!("from batch")));
    assert_eq!(
        *previous.lock(),
        vec![None, Some(json!("from listener"))]
    );
}

#[test]
fn test_listener_error_stops_batch() {
    let root = root_env();
    root.listen("change:b", |_| Err(pilot_core::AppError::validation("b refused")));

    let err = root
        .set(
            [("a", json!(1)), ("b", json!(2)), ("c", json!(3))],
            SetOptions::default(),
        )
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Listener);
    assert_eq!(root.get("a"), Some(json!(1)));
    assert_eq!(root.get("b"), Some(json!(2)));
    assert_eq!(root.get("c"), None);
}

#[test]
fn test_custom_events_carry_source() {
    let root = root_env();
    let child = root.child();
    let journal = Journal::new();
    let sink = journal.clone();
    child.listen("focus", move |event| {
        if let EnvPayload::Custom(value) = &event.payload {
            sink.push(format!("depth {} {value}", event.env.depth()));
        }
        Ok(())
    });

    child
        .emit("focus", EnvPayload::Custom(json!("editor")))
        .unwrap();
    root.emit("focus", EnvPayload::Custom(json!("ignored")))
        .unwrap();

    assert_eq!(journal.entries(), vec!["depth 1 \"editor\""]);
}
