use axum::{extract::Extension, Json};

use crate::config::ProxySpec;
use crate::server::app::AxumAppState;

/// `GET /spec` - name, version and capabilities of this proxy.
pub async fn spec_handler(Extension(state): Extension<AxumAppState>) -> Json<ProxySpec> {
    Json(state.spec.as_ref().clone())
}
