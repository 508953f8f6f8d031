use anyhow::anyhow;
use axum::{body::Bytes, extract::Extension};
use serde_json::Value;
use tracing::debug;

use super::parse_body;
use crate::common::{Category, Entity};
use crate::server::app::AxumAppState;
use crate::server::response::ProxyResponse;

/// `POST /user` - store an evaluation-context record.
pub async fn create_user_handler(
    Extension(state): Extension<AxumAppState>,
    body: Bytes,
) -> ProxyResponse {
    let user: Value = match parse_body(&body) {
        Ok(user) => user,
        Err(e) => return e.into(),
    };
    if !user.is_object() {
        return ProxyResponse::failure(false, anyhow!("User must be a JSON object"));
    }

    let entity = Entity::User(user);
    let location = state.store.put(Category::User, entity.clone());
    debug!(%location, "User created");

    ProxyResponse::Entity { location, entity }
}
