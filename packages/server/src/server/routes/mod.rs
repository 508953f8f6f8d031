// HTTP routes
pub mod client;
pub mod health;
pub mod location;
pub mod spec;
pub mod user;

pub use client::*;
pub use health::*;
pub use location::*;
pub use spec::*;
pub use user::*;

use axum::body::Bytes;
use serde::de::DeserializeOwned;

use crate::common::ProtocolError;

/// Decode a JSON request body. An empty body reads as `{}`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ProtocolError> {
    let raw: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        &b"{}"[..]
    } else {
        &body[..]
    };
    serde_json::from_slice(raw).map_err(|e| ProtocolError::InvalidBody(e.to_string()))
}
