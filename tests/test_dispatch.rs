use anyhow::anyhow;
use serde::Deserialize;
use serde_json::{json, Value};

use hostlink::api::{from_params, Dispatcher, RegistryBuilder, API_VERSION};

fn dispatcher() -> Dispatcher {
    let registry = RegistryBuilder::new()
        .register("greet", |params| {
            #[derive(Deserialize)]
            #[serde(deny_unknown_fields)]
            struct GreetParams {
                name: String,
            }
            let GreetParams { name } = from_params(params)?;
            Ok(Value::String(format!("hello {}", name)))
        })
        .register("boom", |_| Err(anyhow!("kaboom")))
        .register_aliased(
            "foo_v1",
            vec![(2, "foo".to_string()), (5, "bar".to_string())],
            |_| Ok(json!("foo result")),
        )
        .build();

    Dispatcher::new(registry)
}

#[test]
fn test_version_resolution_prefers_highest_qualifying_alias() {
    let d = dispatcher();

    // Below every alias threshold the declared name answers
    let reply = d.dispatch(&json!({"action": "foo_v1", "version": 1}));
    assert_eq!(reply, json!("foo result"));

    // Version 3 qualifies only the (2, "foo") alias
    let reply = d.dispatch(&json!({"action": "foo", "version": 3}));
    assert_eq!(reply, json!("foo result"));

    // Version 10 qualifies both; the higher threshold wins
    let reply = d.dispatch(&json!({"action": "bar", "version": 10}));
    assert_eq!(reply, json!({"result": "foo result", "error": null}));
}

#[test]
fn test_aliased_entry_stops_answering_to_other_names() {
    let d = dispatcher();

    // Once an alias qualifies, the declared name no longer matches
    let reply = d.dispatch(&json!({"action": "foo_v1", "version": 3}));
    assert_eq!(reply["result"], Value::Null);
    assert!(reply["error"].as_str().unwrap().contains("unsupported action"));

    // And an alias never answers below its own threshold
    let reply = d.dispatch(&json!({"action": "bar", "version": 3}));
    assert!(reply["error"].as_str().unwrap().contains("unsupported action"));
}

#[test]
fn test_compatibility_unwrap_for_old_versions() {
    let d = dispatcher();

    // Omitted version defaults to 4: bare result, no envelope
    let reply = d.dispatch(&json!({"action": "greet", "params": {"name": "ada"}}));
    assert_eq!(reply, json!("hello ada"));

    // Explicit version 4 behaves the same
    let reply = d.dispatch(&json!({"action": "greet", "version": 4, "params": {"name": "ada"}}));
    assert_eq!(reply, json!("hello ada"));

    // Version 6 gets the full envelope
    let reply = d.dispatch(&json!({"action": "greet", "version": 6, "params": {"name": "ada"}}));
    assert_eq!(reply, json!({"result": "hello ada", "error": null}));
}

#[test]
fn test_errors_keep_the_envelope_even_for_old_versions() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({"action": "nope"}));

    assert_eq!(reply["result"], Value::Null);
    assert!(reply["error"].as_str().unwrap().contains("unsupported action"));
}

#[test]
fn test_handler_error_becomes_reply_error() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({"action": "boom", "version": 6}));

    assert_eq!(reply["result"], Value::Null);
    assert_eq!(reply["error"], json!("kaboom"));
}

#[test]
fn test_builtin_version_action() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({"action": "version", "version": 6}));

    assert_eq!(reply, json!({"result": API_VERSION, "error": null}));
}

#[test]
fn test_unexpected_parameter_fails_the_call() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({
        "action": "version",
        "version": 6,
        "params": {"surprise": 1}
    }));

    assert_eq!(reply["result"], Value::Null);
    assert!(reply["error"].as_str().unwrap().contains("surprise"));
}

#[test]
fn test_extra_and_missing_params_are_rejected() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({
        "action": "greet",
        "version": 6,
        "params": {"name": "ada", "extra": true}
    }));
    assert!(reply["error"].as_str().unwrap().contains("invalid params"));

    let reply = d.dispatch(&json!({"action": "greet", "version": 6, "params": {}}));
    assert!(reply["error"].as_str().unwrap().contains("invalid params"));
}

#[test]
fn test_params_must_be_an_object() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({"action": "greet", "version": 6, "params": 5}));

    assert!(reply["error"].as_str().unwrap().contains("params must be an object"));
}

#[test]
fn test_batch_isolation() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({
        "action": "multi",
        "version": 6,
        "params": {"actions": [
            {"action": "greet", "params": {"name": "a"}},
            {"action": "nope"},
            {"action": "greet", "params": {"name": "c"}}
        ]}
    }));

    assert_eq!(reply["error"], Value::Null);
    let results = reply["result"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    // Sub-requests default to version 4, so successes come back bare
    assert_eq!(results[0], json!("hello a"));
    assert_eq!(results[2], json!("hello c"));

    // Only the malformed slot carries an error
    assert_eq!(results[1]["result"], Value::Null);
    assert!(results[1]["error"]
        .as_str()
        .unwrap()
        .contains("unsupported action"));
}

#[test]
fn test_batch_entries_apply_their_own_version() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({
        "action": "multi",
        "version": 6,
        "params": {"actions": [
            {"action": "greet", "version": 6, "params": {"name": "a"}}
        ]}
    }));

    let results = reply["result"].as_array().unwrap();
    assert_eq!(results[0], json!({"result": "hello a", "error": null}));
}

#[test]
fn test_batch_requires_the_actions_key() {
    let d = dispatcher();

    let reply = d.dispatch(&json!({
        "action": "multi",
        "version": 6,
        "params": {"requests": []}
    }));

    assert!(reply["error"].as_str().unwrap().contains("invalid params"));
}
