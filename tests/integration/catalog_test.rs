//! Integration tests for plugin registration and signalling.

use std::sync::Arc;

use serde_json::{Value, json};

use pilot_plugin::prelude::*;

use crate::helpers::{Journal, recording_plugin, watch};

#[test]
fn test_plug_broadcasts_to_every_plugin() {
    let journal = Journal::new();
    let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let catalog = PluginCatalog::new();

    let sink = seen.clone();
    catalog.listen(PLUG, move |event| {
        if let CatalogEvent::Action { plugin, data, .. } = event {
            sink.lock().push((plugin.name().to_string(), data.clone()));
        }
        Ok(())
    });

    let a = recording_plugin("a", &[PLUG], &journal);
    let b = ActionPlugin::builder("b").shared();
    catalog.register([a, b]).unwrap();

    let data = json!({ "session": 7 });
    catalog.plug(data.clone(), None).unwrap();

    assert_eq!(journal.entries(), vec!["a.plug"]);
    assert_eq!(
        *seen.lock(),
        vec![
            ("a".to_string(), vec![data.clone()]),
            ("b".to_string(), vec![data]),
        ]
    );
}

#[test]
fn test_register_then_unregister_events() {
    let journal = Journal::new();
    let catalog = PluginCatalog::new();
    watch(&catalog, REGISTER, &journal);
    watch(&catalog, UNREGISTER, &journal);

    let a = ActionPlugin::builder("a").shared();
    catalog.register([a.clone(), ActionPlugin::builder("a").shared()]).unwrap();
    catalog.unregister([&a]).unwrap();
    catalog.unregister(["a"]).unwrap();

    assert_eq!(
        journal.entries(),
        vec!["register:a", "unregister:a", "unregister:a"]
    );
    assert!(catalog.is_empty());
}

#[test]
fn test_signal_target_list_is_fixed_before_delivery() {
    let journal = Journal::new();
    let catalog = PluginCatalog::new();

    let late = recording_plugin("late", &["ping"], &journal);
    let eager = ActionPlugin::builder("eager")
        .on("ping", |_, catalog| {
            catalog.unregister(["late"])?;
            catalog.register([ActionPlugin::builder("newcomer")
                .on("ping", |_, _| Err(AppError::internal("newcomer must not run")))
                .shared()])?;
            Ok(())
        })
        .shared();
    catalog.register([eager, late]).unwrap();

    let report = catalog.signal_with_report(catalog.plugins(), "ping", &[]);

    assert_eq!(journal.entries(), vec!["late.ping"]);
    assert_eq!(report.visited, 2);
    assert!(report.is_clean());
    assert_eq!(catalog.names(), vec!["eager", "newcomer"]);
}

#[test]
fn test_handler_can_signal_reentrantly() {
    let journal = Journal::new();
    let catalog = PluginCatalog::new();
    let relay = ActionPlugin::builder("relay")
        .on("outer", |params, catalog| {
            catalog.signal_all("inner", params);
            Ok(())
        })
        .shared();
    catalog
        .register([relay, recording_plugin("sink", &["inner"], &journal)])
        .unwrap();

    catalog.signal_all("outer", &[json!(1)]);

    assert_eq!(journal.entries(), vec!["sink.inner"]);
}

#[test]
fn test_failures_are_isolated_per_plugin() {
    let journal = Journal::new();
    let catalog = PluginCatalog::new();
    watch(&catalog, ERROR, &journal);

    catalog
        .register([
            recording_plugin("first", &[PLUG], &journal),
            ActionPlugin::builder("broken")
                .on(PLUG, |_, _| Err(AppError::plugin("cannot start")))
                .shared(),
            ActionPlugin::builder("panicky")
                .on(PLUG, |_, _| panic!("handler blew up"))
                .shared(),
            recording_plugin("last", &[PLUG], &journal),
        ])
        .unwrap();

    catalog.plug(Value::Null, None).unwrap();

    assert_eq!(
        journal.entries(),
        vec!["first.plug", "error:broken", "error:panicky", "last.plug"]
    );
}

#[test]
fn test_unplug_subset_leaves_membership() {
    let journal = Journal::new();
    let a = recording_plugin("a", &[UNPLUG], &journal);
    let b = recording_plugin("b", &[UNPLUG], &journal);
    let catalog = PluginCatalog::with_plugins([a, b.clone()]).unwrap();

    catalog.unplug(json!("shutdown"), Some(vec![b]));

    assert_eq!(journal.entries(), vec!["b.unplug"]);
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_plug_with_list_skips_already_known_names() {
    let journal = Journal::new();
    let original = recording_plugin("dup", &[PLUG], &journal);
    let catalog = PluginCatalog::with_plugins([original.clone()]).unwrap();
    watch(&catalog, REGISTER, &journal);

    let stranger = recording_plugin("dup", &[PLUG], &journal);
    catalog.plug(json!({}), Some(vec![stranger])).unwrap();

    // The registered plugin is kept; the given object still receives `plug`.
    assert!(Arc::ptr_eq(&catalog.get("dup").unwrap(), &original));
    assert_eq!(journal.entries(), vec!["dup.plug"]);
}

#[test]
fn test_action_plugin_macro_plugs() {
    let journal = Journal::new();
    let sink = journal.clone();
    let plugin = action_plugin!("macro", {
        PLUG => move |params: &[Value], _: &PluginCatalog| {
            sink.push(format!("plugged with {}", params.len()));
            Ok(())
        },
    });
    let catalog = PluginCatalog::with_plugins([plugin]).unwrap();

    catalog.plug(json!(true), None).unwrap();

    assert_eq!(journal.entries(), vec!["plugged with 1"]);
}
