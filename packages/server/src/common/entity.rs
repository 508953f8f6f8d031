//! Stored entities and their classification.
//!
//! Every value the proxy hands out a location for is an [`Entity`]. Adapters
//! tag their results with the right variant when they produce them, so
//! classification is a plain match rather than an inspection of the value.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use crate::kernel::ClientHandle;

/// Semantic type reported to the test driver as `entityType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityType {
    User,
    Variable,
    Feature,
    Client,
    Object,
    Void,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::User => "User",
            EntityType::Variable => "Variable",
            EntityType::Feature => "Feature",
            EntityType::Client => "Client",
            EntityType::Object => "Object",
            EntityType::Void => "Void",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capitalized kind label of a variable value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ValueKind {
    Boolean,
    Number,
    String,
    #[serde(rename = "JSON")]
    Json,
}

impl ValueKind {
    /// Label a value by its runtime shape; object-shaped values (including
    /// arrays and null) are `JSON`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Object(_) | Value::Array(_) | Value::Null => ValueKind::Json,
        }
    }

    /// Parse the lower-case kind tag the test driver declares for typed
    /// evaluation. Structured values are declared as `JSON`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "boolean" => Some(ValueKind::Boolean),
            "number" => Some(ValueKind::Number),
            "string" => Some(ValueKind::String),
            "JSON" => Some(ValueKind::Json),
            _ => None,
        }
    }
}

/// Canonical description of an evaluated variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub key: String,
    pub value: Value,
    pub default_value: Value,
    pub is_defaulted: bool,
    #[serde(rename = "type")]
    pub kind: ValueKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eval: Option<Value>,
}

#[derive(Clone)]
pub enum Entity {
    Client(Arc<ClientHandle>),
    User(Value),
    Variable(Arc<Variable>),
    Feature(Value),
    Object(Value),
    Void,
}

impl Entity {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Entity::Client(_) => EntityType::Client,
            Entity::User(_) => EntityType::User,
            Entity::Variable(_) => EntityType::Variable,
            Entity::Feature(_) => EntityType::Feature,
            Entity::Object(_) => EntityType::Object,
            Entity::Void => EntityType::Void,
        }
    }

    /// Payload for the response body. Clients are elided to `{}` so no
    /// internal handle is ever serialized; `Void` has no payload.
    pub fn data(&self) -> Option<Value> {
        match self {
            Entity::Client(_) => Some(json!({})),
            Entity::User(value) | Entity::Feature(value) | Entity::Object(value) => {
                Some(value.clone())
            }
            Entity::Variable(variable) => serde_json::to_value(variable.as_ref()).ok(),
            Entity::Void => None,
        }
    }
}

impl From<Variable> for Entity {
    fn from(variable: Variable) -> Self {
        Entity::Variable(Arc::new(variable))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Client(handle) => f
                .debug_tuple("Client")
                .field(&Arc::as_ptr(handle))
                .finish(),
            Entity::User(value) => f.debug_tuple("User").field(value).finish(),
            Entity::Variable(variable) => f.debug_tuple("Variable").field(variable).finish(),
            Entity::Feature(value) => f.debug_tuple("Feature").field(value).finish(),
            Entity::Object(value) => f.debug_tuple("Object").field(value).finish(),
            Entity::Void => f.write_str("Void"),
        }
    }
}

/// Clients compare by identity, everything else by value.
impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Entity::Client(a), Entity::Client(b)) => Arc::ptr_eq(a, b),
            (Entity::User(a), Entity::User(b)) => a == b,
            (Entity::Variable(a), Entity::Variable(b)) => a == b,
            (Entity::Feature(a), Entity::Feature(b)) => a == b,
            (Entity::Object(a), Entity::Object(b)) => a == b,
            (Entity::Void, Entity::Void) => true,
            _ => false,
        }
    }
}
