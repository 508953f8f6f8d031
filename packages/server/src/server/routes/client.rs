use std::sync::Arc;

use axum::{body::Bytes, extract::Extension};
use tracing::{info, warn};

use super::parse_body;
use crate::common::{ClientRequest, Entity, ProtocolError};
use crate::server::app::AxumAppState;
use crate::server::response::ProxyResponse;

/// `POST /client` - construct an SDK client and register it under the
/// caller's `clientId`.
pub async fn create_client_handler(
    Extension(state): Extension<AxumAppState>,
    body: Bytes,
) -> ProxyResponse {
    create_client(&state, &body)
        .await
        .unwrap_or_else(ProxyResponse::from)
}

async fn create_client(state: &AxumAppState, body: &Bytes) -> Result<ProxyResponse, ProtocolError> {
    let request: ClientRequest = parse_body(body)?;
    let client_id = request
        .client_id()
        .ok_or(ProtocolError::MissingClientId)?
        .to_string();

    let handle = match state.factory.create(&request) {
        Ok(handle) => handle,
        Err(e) => {
            warn!(client_id = %client_id, error = %e, "Failed to create client");
            return Ok(ProxyResponse::failure(false, e));
        }
    };

    // The client is registered even when initialization fails.
    let async_error = match handle.initialize(request.wait_for_initialization).await {
        Ok(()) => None,
        Err(e) => {
            warn!(client_id = %client_id, error = %e, "Client initialization failed");
            Some(e.to_string())
        }
    };

    let location = state
        .store
        .put_client(&client_id, Entity::Client(Arc::new(handle)));
    info!(%location, cloud = request.enable_cloud_bucketing, "Client created");

    Ok(ProxyResponse::ClientCreated {
        location,
        async_error,
    })
}
