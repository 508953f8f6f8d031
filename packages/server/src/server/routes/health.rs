use axum::{extract::Extension, http::StatusCode, Json};
use serde::Serialize;

use crate::server::app::AxumAppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    entities: usize,
}

/// Health check endpoint
///
/// The proxy has no backing services of its own, so it is healthy whenever it
/// answers. Reports the number of live entities.
pub async fn health_handler(
    Extension(state): Extension<AxumAppState>,
) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            entities: state.store.len(),
        }),
    )
}
