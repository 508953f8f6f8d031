//! Test fixtures: flag sets, users and wire parameters.

#![allow(dead_code)]

use proxy_core::kernel::MockClientFactory;
use proxy_core::ProxyVariant;
use serde_json::{json, Value};

/// Factory whose clients serve a small fixed set of flags, one per kind.
pub fn flag_factory(variant: ProxyVariant) -> MockClientFactory {
    MockClientFactory::new(variant)
        .with_flag("string-var", json!("served"))
        .with_flag("bool-var", json!(true))
        .with_flag("number-var", json!(7))
        .with_flag("json-var", json!({"facts": true}))
}

pub fn test_user() -> Value {
    json!({"user_id": "test-user", "email": "test@example.com"})
}

pub fn test_event() -> Value {
    json!({"type": "custom-event", "target": "button"})
}

pub fn value(value: Value) -> Value {
    json!({ "value": value })
}

pub fn location(location: &str) -> Value {
    json!({ "location": location })
}

pub fn user_param() -> Value {
    json!({"type": "user"})
}

pub fn event_param() -> Value {
    json!({"type": "event"})
}

pub fn callback(url: &str) -> Value {
    json!({ "callbackURL": url })
}
