use axum::{
    body::Bytes,
    extract::Extension,
    http::{Method, Uri},
};
use tracing::{debug, warn};

use super::parse_body;
use crate::common::{marshal, Category, CommandRequest, Location, ProtocolError};
use crate::server::app::AxumAppState;
use crate::server::response::ProxyResponse;

/// `POST /<location>` - invoke a command on a stored entity and store the
/// result under `command/<command>/<n>`.
///
/// Mounted as the router fallback, so any path that is not an explicit route
/// is treated as a location.
pub async fn command_handler(
    Extension(state): Extension<AxumAppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> ProxyResponse {
    run_command(&state, &method, uri.path(), &body)
        .await
        .unwrap_or_else(ProxyResponse::from)
}

async fn run_command(
    state: &AxumAppState,
    method: &Method,
    path: &str,
    body: &Bytes,
) -> Result<ProxyResponse, ProtocolError> {
    let target = path
        .parse::<Location>()
        .ok()
        .and_then(|location| state.store.get(&location))
        .ok_or(ProtocolError::MissingEntity)?;
    if *method != Method::POST {
        return Err(ProtocolError::MethodNotAllowed);
    }

    let request: CommandRequest = parse_body(body)?;
    let command = request
        .command()
        .ok_or(ProtocolError::MissingCommand)?
        .to_string();
    if !Category::is_command_name(&command) {
        return Err(ProtocolError::InvalidBody(format!(
            "command {:?} is not a single path segment",
            command
        )));
    }
    let args = marshal(request.params(), request.roles(), &state.store, &state.http)?;
    let is_async = request.is_async();

    debug!(path, command = %command, is_async, "Invoking command");
    match state.invoker.invoke(&target, &command, args, is_async).await {
        Ok(entity) => {
            let location = state.store.put(Category::command(&command), entity.clone());
            Ok(ProxyResponse::Entity { location, entity })
        }
        Err(e) => {
            warn!(path, command = %command, error = %e, "Command failed");
            Ok(ProxyResponse::failure(is_async, e))
        }
    }
}
