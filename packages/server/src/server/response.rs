//! Response envelopes.
//!
//! A handler ends in exactly one of: a stored entity (201 with a `Location`
//! header), a domain failure (200 with `exception` or `asyncError`), or a
//! protocol error (4xx with `message`).

use axum::{
    http::{header::LOCATION, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::common::{Entity, EntityType, Location, ProtocolError};

/// Which field a domain failure is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Exception,
    AsyncError,
}

impl FailureMode {
    pub fn for_request(is_async: bool) -> Self {
        if is_async {
            FailureMode::AsyncError
        } else {
            FailureMode::Exception
        }
    }

    fn field(&self) -> &'static str {
        match self {
            FailureMode::Exception => "exception",
            FailureMode::AsyncError => "asyncError",
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EntityBody {
    entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    logs: Vec<Value>,
}

pub enum ProxyResponse {
    Entity {
        location: Location,
        entity: Entity,
    },
    ClientCreated {
        location: Location,
        /// Initialization failure, reported without discarding the client.
        async_error: Option<String>,
    },
    Failure {
        mode: FailureMode,
        error: anyhow::Error,
    },
    Protocol(ProtocolError),
}

impl ProxyResponse {
    pub fn failure(is_async: bool, error: impl Into<anyhow::Error>) -> Self {
        ProxyResponse::Failure {
            mode: FailureMode::for_request(is_async),
            error: error.into(),
        }
    }
}

impl From<ProtocolError> for ProxyResponse {
    fn from(error: ProtocolError) -> Self {
        ProxyResponse::Protocol(error)
    }
}

fn created(location: &Location, body: Value) -> Response {
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    match HeaderValue::from_str(&location.to_string()) {
        Ok(value) => {
            response.headers_mut().insert(LOCATION, value);
        }
        Err(e) => warn!(%location, error = %e, "Location is not a valid header value"),
    }
    response
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        match self {
            ProxyResponse::Entity { location, entity } => {
                let body = EntityBody {
                    entity_type: entity.entity_type(),
                    data: entity.data(),
                    logs: Vec::new(),
                };
                let body = serde_json::to_value(body).unwrap_or_else(|_| json!({}));
                created(&location, body)
            }
            ProxyResponse::ClientCreated {
                location,
                async_error,
            } => {
                let body = match async_error {
                    Some(message) => json!({ "asyncError": message }),
                    None => json!({ "message": "success" }),
                };
                created(&location, body)
            }
            ProxyResponse::Failure { mode, error } => {
                let mut body = serde_json::Map::new();
                body.insert(mode.field().to_string(), json!(error.to_string()));
                body.insert("stack".to_string(), json!(format!("{:?}", error)));
                (StatusCode::OK, Json(Value::Object(body))).into_response()
            }
            ProxyResponse::Protocol(error) => error.into_response(),
        }
    }
}

impl IntoResponse for ProtocolError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}
