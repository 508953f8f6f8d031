//! Wire parameters and their resolution into call arguments.

use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use super::callback::Callback;
use super::entity::Entity;
use super::entity_store::EntityStore;
use super::errors::{CommandError, ProtocolError};
use super::location::Location;

/// Request payload a role parameter refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Event,
}

/// One wire parameter. Exactly one of `value`, `location`, `type` or
/// `callbackURL` may be set; an empty object is an absent literal.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub enum Param {
    Value(Value),
    Location(String),
    Role(Role),
    Callback(Url),
}

impl TryFrom<Map<String, Value>> for Param {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        // `value: null` is a real literal; the other tags only count when set.
        let value = map.remove("value");
        let location = map.remove("location").filter(|v| !v.is_null());
        let role = map.remove("type").filter(|v| !v.is_null());
        let callback = map.remove("callbackURL").filter(|v| !v.is_null());

        let tags = [
            value.is_some(),
            location.is_some(),
            role.is_some(),
            callback.is_some(),
        ];
        if tags.iter().filter(|set| **set).count() > 1 {
            return Err("parameter sets more than one of value, location, type, callbackURL".into());
        }

        if let Some(location) = location {
            return match location {
                Value::String(location) => Ok(Param::Location(location)),
                other => Err(format!("location must be a string, got {}", other)),
            };
        }
        if let Some(role) = role {
            return serde_json::from_value(role)
                .map(Param::Role)
                .map_err(|_| "type must be \"user\" or \"event\"".to_string());
        }
        if let Some(callback) = callback {
            let raw = callback
                .as_str()
                .ok_or_else(|| "callbackURL must be a string".to_string())?;
            return Url::parse(raw)
                .map(Param::Callback)
                .map_err(|e| format!("invalid callbackURL {:?}: {}", raw, e));
        }
        Ok(Param::Value(value.unwrap_or(Value::Null)))
    }
}

/// A resolved positional argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    Entity(Entity),
    Callback(Callback),
}

impl Arg {
    fn kind(&self) -> &'static str {
        match self {
            Arg::Value(Value::Null) | Arg::Entity(Entity::Void) => "null",
            Arg::Value(Value::Bool(_)) => "boolean",
            Arg::Value(Value::Number(_)) => "number",
            Arg::Value(Value::String(_)) => "string",
            Arg::Value(Value::Array(_)) => "array",
            Arg::Value(Value::Object(_)) => "object",
            Arg::Entity(Entity::Client(_)) => "client",
            Arg::Entity(_) => "object",
            Arg::Callback(_) => "callback",
        }
    }
}

/// Positional arguments for one invocation. Reads past the end are absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(pub Vec<Arg>);

impl Args {
    pub fn get(&self, index: usize) -> Option<&Arg> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Argument as plain JSON. Stored entities contribute their payload;
    /// clients and callbacks are not data.
    pub fn json(&self, index: usize) -> Result<Value, CommandError> {
        match self.get(index) {
            None | Some(Arg::Value(Value::Null)) | Some(Arg::Entity(Entity::Void)) => {
                Ok(Value::Null)
            }
            Some(Arg::Value(value)) => Ok(value.clone()),
            Some(arg @ Arg::Entity(Entity::Client(_))) | Some(arg @ Arg::Callback(_)) => {
                Err(CommandError::InvalidArgument {
                    index,
                    expected: "JSON value",
                    found: arg.kind(),
                })
            }
            Some(Arg::Entity(entity)) => Ok(entity.data().unwrap_or(Value::Null)),
        }
    }

    pub fn optional_str(&self, index: usize) -> Result<Option<String>, CommandError> {
        match self.json(index)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            _ => Err(CommandError::InvalidArgument {
                index,
                expected: "string",
                found: self.get(index).map_or("null", Arg::kind),
            }),
        }
    }

    pub fn callback(&self, index: usize) -> Result<&Callback, CommandError> {
        match self.get(index) {
            Some(Arg::Callback(callback)) => Ok(callback),
            other => Err(CommandError::InvalidArgument {
                index,
                expected: "callback",
                found: other.map_or("null", Arg::kind),
            }),
        }
    }
}

/// The request's own role payloads.
#[derive(Debug, Clone, Copy, Default)]
pub struct Roles<'a> {
    pub user: Option<&'a Value>,
    pub event: Option<&'a Value>,
}

/// Resolve wire parameters into arguments, in order.
///
/// Fails on the first location that does not decode or is not in the store,
/// so nothing is invoked with a partial argument list.
pub fn marshal(
    params: &[Param],
    roles: Roles<'_>,
    store: &EntityStore,
    http: &reqwest::Client,
) -> Result<Args, ProtocolError> {
    params
        .iter()
        .map(|param| match param {
            Param::Value(value) => Ok(Arg::Value(value.clone())),
            Param::Location(raw) => raw
                .parse::<Location>()
                .ok()
                .and_then(|location| store.get(&location))
                .map(Arg::Entity)
                .ok_or(ProtocolError::MissingEntityFromParam),
            Param::Role(Role::User) => Ok(Arg::Value(roles.user.cloned().unwrap_or(Value::Null))),
            Param::Role(Role::Event) => {
                Ok(Arg::Value(roles.event.cloned().unwrap_or(Value::Null)))
            }
            Param::Callback(url) => Ok(Arg::Callback(Callback::new(url.clone(), http.clone()))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Args)
}
