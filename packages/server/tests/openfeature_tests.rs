//! Integration tests for the OpenFeature variant's typed evaluation.

mod common;

use crate::common::{location, value, TestHarness};
use axum::http::StatusCode;
use proxy_core::ProxyVariant;
use serde_json::{json, Value};

async fn setup() -> (TestHarness, String, String) {
    let ctx = TestHarness::new(ProxyVariant::OpenFeature);
    let client = ctx.client("of").await;
    let user = ctx.user().await;
    (ctx, client, user)
}

fn typed(user: &str, key: Value, default: Value, kind: &str) -> Vec<Value> {
    vec![location(user), value(key), value(default), value(json!(kind))]
}

#[tokio::test]
async fn spec_advertises_openfeature() {
    let (ctx, _, _) = setup().await;

    let res = ctx.get("/spec").await;

    assert_eq!(res.body["name"], "OF-Rust");
    assert!(res.body["capabilities"]
        .as_array()
        .unwrap()
        .contains(&json!("OpenFeature")));
}

#[tokio::test]
async fn each_kind_evaluates_through_its_typed_call() {
    let (ctx, client, user) = setup().await;

    for (key, default, kind, served, label) in [
        ("bool-var", json!(false), "boolean", json!(true), "Boolean"),
        ("number-var", json!(0), "number", json!(7), "Number"),
        ("string-var", json!("default"), "string", json!("served"), "String"),
        ("json-var", json!({}), "JSON", json!({"facts": true}), "JSON"),
    ] {
        let res = ctx
            .command_async(&client, "variable", typed(&user, json!(key), default.clone(), kind))
            .await;

        res.created();
        assert_eq!(
            res.body["data"],
            json!({
                "key": key,
                "value": served,
                "defaultValue": default,
                "isDefaulted": false,
                "type": label
            }),
            "{kind}"
        );
    }
}

#[tokio::test]
async fn unknown_flag_is_described_as_defaulted() {
    let (ctx, client, user) = setup().await;

    let res = ctx
        .command(&client, "variable", typed(&user, json!("flag"), json!("default"), "string"))
        .await;

    assert_eq!(res.created(), "command/variable/0");
    assert_eq!(
        res.body["data"],
        json!({
            "key": "flag",
            "value": "default",
            "defaultValue": "default",
            "isDefaulted": true,
            "type": "String"
        })
    );
}

#[tokio::test]
async fn variable_value_returns_the_typed_value() {
    let (ctx, client, user) = setup().await;

    let res = ctx
        .command(&client, "variableValue", typed(&user, json!("bool-var"), json!(false), "boolean"))
        .await;

    assert_eq!(res.created(), "command/variableValue/0");
    assert_eq!(res.body, json!({"entityType": "Object", "data": true, "logs": []}));
}

#[tokio::test]
async fn unknown_kind_is_rejected() {
    let (ctx, client, user) = setup().await;

    let res = ctx
        .command_async(&client, "variable", typed(&user, json!("bool-var"), json!(true), "bool"))
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["asyncError"], "Invalid default value type");
}

#[tokio::test]
async fn default_of_another_shape_is_served_back_as_defaulted() {
    let (ctx, client, user) = setup().await;

    for (key, default, kind, label) in [
        ("json-var", json!("str"), "JSON", "String"),
        ("number-var", json!("5"), "number", "String"),
        ("bool-var", json!("yes"), "boolean", "String"),
    ] {
        let res = ctx
            .command(&client, "variable", typed(&user, json!(key), default.clone(), kind))
            .await;

        res.created();
        assert_eq!(
            res.body["data"],
            json!({
                "key": key,
                "value": default,
                "defaultValue": default,
                "isDefaulted": true,
                "type": label
            }),
            "{kind}"
        );
    }
}

#[tokio::test]
async fn missing_key_and_default_are_reported() {
    let (ctx, client, user) = setup().await;

    let no_key = ctx
        .command(&client, "variable", typed(&user, Value::Null, json!(true), "boolean"))
        .await;
    let no_default = ctx
        .command(&client, "variable", typed(&user, json!("bool-var"), Value::Null, "boolean"))
        .await;

    assert_eq!(no_key.body["exception"], "Missing parameter: key");
    assert_eq!(no_default.body["exception"], "Missing parameter: defaultValue");
}

#[tokio::test]
async fn missing_parameter_resolution_errors_are_reraised() {
    let (ctx, client, _) = setup().await;
    let anonymous = ctx.post("/user", json!({"email": "nobody@example.com"})).await;

    let res = ctx
        .command_async(
            &client,
            "variable",
            typed(anonymous.created(), json!("bool-var"), json!(false), "boolean"),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["asyncError"], "Missing parameter: targetingKey");
}

#[tokio::test]
async fn type_mismatch_is_suppressed_and_defaulted() {
    let (ctx, client, user) = setup().await;

    // string-var serves a string; asking for a number falls back.
    let res = ctx
        .command(&client, "variable", typed(&user, json!("string-var"), json!(3), "number"))
        .await;

    res.created();
    assert_eq!(res.body["data"]["value"], 3);
    assert_eq!(res.body["data"]["isDefaulted"], true);
    assert_eq!(res.body["data"]["type"], "Number");
}

#[tokio::test]
async fn other_commands_use_the_generic_table() {
    let (ctx, client, user) = setup().await;

    let all = ctx.command(&client, "allVariables", vec![location(&user)]).await;
    let flushed = ctx.command(&client, "flush", vec![]).await;

    assert_eq!(all.body["data"]["number-var"], 7);
    assert_eq!(flushed.created(), "command/flush/0");
    assert_eq!(ctx.sdk("of").flushes(), 1);
}
