//! Integration tests for command invocation on stored entities.

mod common;

use crate::common::{
    callback, event_param, location, test_event, test_user, user_param, value, TestHarness,
};
use axum::{extract::Json, routing::post, Router};
use axum::http::StatusCode;
use serde_json::{json, Value};
use test_context::test_context;
use tokio::sync::mpsc;

/// Spin up a server that forwards every callback body to a channel.
async fn callback_receiver() -> (String, mpsc::UnboundedReceiver<Value>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new().route(
        "/callback",
        post(move |Json(body): Json<Value>| {
            let tx = tx.clone();
            async move {
                let _ = tx.send(body);
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/callback", addr), rx)
}

// =============================================================================
// Client commands
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn variable_for_unknown_flag_is_defaulted(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;

    let res = ctx
        .command(
            &client,
            "variable",
            vec![location(&user), value(json!("flag")), value(json!("default"))],
        )
        .await;

    assert_eq!(res.created(), "command/variable/0");
    assert_eq!(
        res.body,
        json!({
            "entityType": "Variable",
            "data": {
                "key": "flag",
                "value": "default",
                "defaultValue": "default",
                "isDefaulted": true,
                "type": "String"
            },
            "logs": []
        })
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn variable_for_served_flag(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;

    let res = ctx
        .command_async(
            &client,
            "variable",
            vec![location(&user), value(json!("json-var")), value(json!({}))],
        )
        .await;

    res.created();
    assert_eq!(res.body["data"]["value"], json!({"facts": true}));
    assert_eq!(res.body["data"]["isDefaulted"], false);
    assert_eq!(res.body["data"]["type"], "JSON");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn variable_value_returns_the_bare_value(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;

    let res = ctx
        .command(
            &client,
            "variableValue",
            vec![location(&user), value(json!("number-var")), value(json!(0))],
        )
        .await;

    assert_eq!(res.created(), "command/variableValue/0");
    assert_eq!(res.body, json!({"entityType": "Object", "data": 7, "logs": []}));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn all_variables_and_all_features(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;

    let variables = ctx.command(&client, "allVariables", vec![location(&user)]).await;
    let features = ctx.command(&client, "allFeatures", vec![location(&user)]).await;

    variables.created();
    assert_eq!(variables.body["entityType"], "Object");
    assert_eq!(variables.body["data"]["string-var"], "served");
    assert_eq!(variables.body["data"]["bool-var"], true);
    assert_eq!(features.body["data"], json!({}));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn track_resolves_role_params_from_the_request(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    let res = ctx
        .post(
            &format!("/{}", client),
            json!({
                "command": "track",
                "params": [user_param(), event_param()],
                "user": test_user(),
                "event": test_event(),
                "isAsync": true
            }),
        )
        .await;

    assert_eq!(res.created(), "command/track/0");
    assert_eq!(res.body, json!({"entityType": "Void", "logs": []}));
    assert_eq!(ctx.sdk("c1").tracked(), vec![test_event()]);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn omitted_role_payload_reaches_the_sdk_as_null(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;

    let res = ctx
        .command_async(&client, "track", vec![location(&user), event_param()])
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["asyncError"], "Invalid Event");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn flush_and_close_return_void(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    let flushed = ctx.command_async(&client, "flush", vec![]).await;
    let closed = ctx.command(&client, "close", vec![]).await;

    assert_eq!(flushed.created(), "command/flush/0");
    assert_eq!(closed.created(), "command/close/0");
    assert!(closed.body.get("data").is_none());
    assert_eq!(ctx.sdk("c1").flushes(), 1);
    assert!(ctx.sdk("c1").is_closed());
}

// =============================================================================
// Failures
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_command_is_a_domain_failure(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    let sync = ctx.command(&client, "nonexistentOp", vec![]).await;
    let not_sync = ctx.command_async(&client, "nonexistentOp", vec![]).await;

    assert_eq!(sync.status, StatusCode::OK);
    assert_eq!(sync.body["exception"], "nonexistentOp is not a supported operation on Client");
    assert!(sync.body["stack"].is_string());
    assert!(sync.body.get("asyncError").is_none());
    assert_eq!(not_sync.status, StatusCode::OK);
    assert_eq!(not_sync.body["asyncError"], "nonexistentOp is not a supported operation on Client");
    assert!(not_sync.body.get("exception").is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn sdk_errors_use_the_mode_of_the_request(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;
    let params = vec![location(&user), value(Value::Null), value(json!("default"))];

    let sync = ctx.command(&client, "variable", params.clone()).await;
    let not_sync = ctx.command_async(&client, "variable", params).await;

    assert_eq!(sync.body["exception"], "Missing parameter: key");
    assert_eq!(not_sync.body["asyncError"], "Missing parameter: key");
    assert!(sync.location.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn missing_entity_is_not_found(ctx: &TestHarness) {
    for path in ["client/nope", "user/3", "command/variable/0", "widgets"] {
        let res = ctx.command(path, "flush", vec![]).await;

        assert_eq!(res.status, StatusCode::NOT_FOUND, "{path}");
        assert_eq!(res.body, json!({"message": "Invalid request: missing entity"}));
    }
}

#[test_context(TestHarness)]
#[tokio::test]
async fn missing_command_is_not_found(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    let res = ctx.post(&format!("/{}", client), json!({"params": []})).await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({"message": "Invalid request: missing command"}));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unresolvable_param_fails_before_invocation(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    let res = ctx
        .command(&client, "flush", vec![value(json!(1)), location("user/99")])
        .await;

    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body, json!({"message": "Invalid request: missing entity from param"}));
    assert_eq!(ctx.sdk("c1").flushes(), 0);
    assert_eq!(ctx.command(&client, "flush", vec![]).await.created(), "command/flush/0");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn malformed_params_are_bad_requests(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    let ambiguous = ctx
        .command(&client, "flush", vec![json!({"value": 1, "type": "user"})])
        .await;
    let bad_url = ctx.command(&client, "flush", vec![callback("not a url")]).await;

    assert_eq!(ambiguous.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_url.status, StatusCode::BAD_REQUEST);
    assert!(bad_url.body["message"].is_string());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn command_names_must_fit_a_location(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    for name in ["flush/0", "with space", "fl\u{fc}sh"] {
        let res = ctx.command(&client, name, vec![]).await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST, "{name:?}");
        assert!(res.location.is_none());
    }
    assert_eq!(ctx.sdk("c1").flushes(), 0);
    assert_eq!(ctx.command(&client, "flush", vec![]).await.created(), "command/flush/0");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn commands_must_be_posted(ctx: &TestHarness) {
    let client = ctx.client("c1").await;

    let res = ctx.get(&format!("/{}", client)).await;

    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
}

// =============================================================================
// Chained locations
// =============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn command_results_are_addressable(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;
    let (url, mut deliveries) = callback_receiver().await;

    let variable = ctx
        .command(
            &client,
            "variable",
            vec![location(&user), value(json!("string-var")), value(json!("default"))],
        )
        .await;
    let variable_location = variable.created().to_string();

    let updated = ctx.command(&variable_location, "onUpdate", vec![callback(&url)]).await;

    assert_eq!(updated.created(), "command/onUpdate/0");
    assert_eq!(updated.body["entityType"], "Variable");
    assert_eq!(updated.body["data"], variable.body["data"]);

    let delivered = tokio::time::timeout(std::time::Duration::from_secs(5), deliveries.recv())
        .await
        .expect("callback was not delivered")
        .expect("callback channel closed");
    assert_eq!(delivered, json!({"data": variable.body["data"]}));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn stored_results_can_be_passed_as_params(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;
    let key = ctx
        .command(
            &client,
            "variableValue",
            vec![location(&user), value(json!("string-var")), value(json!("default"))],
        )
        .await;

    // The stored Object("served") is used as the key of the next evaluation.
    let res = ctx
        .command(
            &client,
            "variable",
            vec![location(&user), location(key.created()), value(json!("default"))],
        )
        .await;

    assert_eq!(res.body["data"]["key"], "served");
    assert_eq!(res.body["data"]["isDefaulted"], true);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn results_never_carry_both_data_and_an_error(ctx: &TestHarness) {
    let client = ctx.client("c1").await;
    let user = ctx.user().await;

    let responses = vec![
        ctx.command(&client, "allVariables", vec![location(&user)]).await,
        ctx.command(&client, "nonexistentOp", vec![]).await,
        ctx.command_async(&client, "track", vec![location(&user), value(json!({}))]).await,
        ctx.command(&client, "close", vec![]).await,
    ];

    for res in responses {
        let fields = ["data", "exception", "asyncError"]
            .iter()
            .filter(|field| res.body.get(**field).is_some())
            .count();
        assert!(fields <= 1, "{:?}", res.body);
    }
}
