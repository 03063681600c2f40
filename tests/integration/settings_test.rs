//! Integration tests for typed settings shared by an environment tree.

use serde_json::json;

use pilot_core::ErrorKind;
use pilot_env::SettingSpec;

use crate::helpers::{Journal, root_env};

#[test]
fn test_settings_shared_across_hierarchy() {
    let root = root_env();
    let child = root.child();
    root.settings()
        .define(SettingSpec::new("tabSize", "integer", json!(4)).with_description("Indent width"))
        .unwrap();

    child.settings().set_from_str("tabSize", "8").unwrap();

    assert_eq!(root.settings().get("tabSize"), Some(json!(8)));
    let info = root.settings().describe("tabSize").unwrap();
    assert_eq!(info.default, json!(4));
    assert_eq!(info.description, "Indent width");
}

#[test]
fn test_define_fails_fast() {
    let root = root_env();
    let settings = root.settings();

    let err = settings
        .define(SettingSpec::new("x", "colour", json!("red")))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownType);

    let err = settings
        .define(SettingSpec::new("x", "integer", json!("many")))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    settings
        .define(SettingSpec::new("x", "integer", json!(1)))
        .unwrap();
    let err = settings
        .define(SettingSpec::new("x", "integer", json!(2)))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(settings.get("x"), Some(json!(1)));
}

#[test]
fn test_step_reset_and_change_events() {
    let root = root_env();
    let settings = root.settings();
    settings
        .define(SettingSpec::new("depth", "integer", json!(0)))
        .unwrap();

    let journal = Journal::new();
    let sink = journal.clone();
    settings.listen("change:depth", move |change| {
        sink.push(format!("{} -> {}", change.previous, change.value));
        Ok(())
    });

    settings.increment("depth").unwrap();
    settings.increment("depth").unwrap();
    settings.decrement("depth").unwrap();
    settings.reset("depth").unwrap();
    settings.reset("depth").unwrap();

    assert_eq!(journal.entries(), vec!["0 -> 1", "1 -> 2", "2 -> 1", "1 -> 0"]);
}

#[test]
fn test_suggestion_type_accepts_first_candidate() {
    let root = root_env();
    let settings = root.settings();
    settings
        .define(SettingSpec::new("title", "text", json!("untitled")))
        .unwrap();

    assert_eq!(settings.set("title", json!("draft")).unwrap(), json!("draft"));
    let err = settings.set("title", json!(42)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(settings.to_display("title").as_deref(), Some("draft"));

    let err = settings.increment("title").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(settings.options("title").is_none());
}

#[test]
fn test_unknown_setting_is_not_found() {
    let root = root_env();
    let err = root.settings().set("missing", json!(1)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}
