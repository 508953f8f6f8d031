use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Runtime kind of a variable value, serialized with the labels the bucketing
/// API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableType {
    Boolean,
    Number,
    String,
    #[serde(rename = "JSON")]
    Json,
}

impl VariableType {
    /// Classify a JSON value by shape. Anything object-like (including arrays
    /// and null) is `JSON`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => VariableType::Boolean,
            Value::Number(_) => VariableType::Number,
            Value::String(_) => VariableType::String,
            Value::Object(_) | Value::Array(_) | Value::Null => VariableType::Json,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VariableType::Boolean => "Boolean",
            VariableType::Number => "Number",
            VariableType::String => "String",
            VariableType::Json => "JSON",
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable as returned by `POST /v1/variables/{key}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub is_defaulted: bool,
    #[serde(rename = "type")]
    pub variable_type: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval: Option<Value>,
}

impl Variable {
    /// The variable served when the API could not supply a usable value.
    pub fn defaulted(key: &str, default_value: Value) -> Self {
        Self {
            key: key.to_string(),
            variable_type: VariableType::of(&default_value),
            value: default_value.clone(),
            default_value,
            is_defaulted: true,
            eval: None,
        }
    }
}

/// Body of `POST /v1/track`.
#[derive(Debug, Clone, Serialize)]
pub struct TrackRequest<'a> {
    pub user: &'a Value,
    pub events: Vec<&'a Value>,
}

/// Platform fields merged into every user sent to the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformData {
    pub platform: &'static str,
    pub sdk_type: &'static str,
    pub sdk_version: &'static str,
}

impl Default for PlatformData {
    fn default() -> Self {
        Self {
            platform: "Rust",
            sdk_type: "server",
            sdk_version: env!("CARGO_PKG_VERSION"),
        }
    }
}

impl PlatformData {
    /// Copy `user` with the platform fields filled in. Fields the caller set
    /// explicitly win.
    pub fn apply(&self, user: &Map<String, Value>) -> Map<String, Value> {
        let mut merged = Map::new();
        if let Ok(Value::Object(platform)) = serde_json::to_value(self) {
            merged.extend(platform);
        }
        merged.extend(user.clone());
        merged
    }
}
