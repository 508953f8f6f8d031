//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::common::EntityStore;
use crate::config::{Config, ProxySpec, ProxyVariant};
use crate::kernel::{BaseClientFactory, CloudClientFactory, Invoker};
use crate::server::routes::{
    command_handler, create_client_handler, create_user_handler, health_handler, spec_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub store: EntityStore,
    pub invoker: Arc<Invoker>,
    pub factory: Arc<dyn BaseClientFactory>,
    /// Shared HTTP client for callback deliveries
    pub http: reqwest::Client,
    pub spec: Arc<ProxySpec>,
}

impl AxumAppState {
    pub fn new(variant: ProxyVariant, spec: ProxySpec, factory: Arc<dyn BaseClientFactory>) -> Self {
        Self {
            store: EntityStore::new(),
            invoker: Arc::new(Invoker::new(variant)),
            factory,
            http: reqwest::Client::new(),
            spec: Arc::new(spec),
        }
    }

    /// State backed by the cloud bucketing client.
    pub fn from_config(config: &Config) -> Self {
        let factory = CloudClientFactory::new(config.variant, config.bucketing_api_uri.clone());
        Self::new(config.variant, config.spec(), Arc::new(factory))
    }
}

/// Build the Axum application router
///
/// `/client`, `/user`, `/spec` and `/health` are explicit routes. Every other
/// path is a location and is served by the command handler.
pub fn build_app(state: AxumAppState) -> Router {
    // CORS configuration - the test driver may run in a browser
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .expose_headers([axum::http::header::LOCATION]);

    Router::new()
        .route("/client", post(create_client_handler))
        .route("/user", post(create_user_handler))
        .route("/spec", get(spec_handler))
        .route("/health", get(health_handler))
        .fallback(command_handler)
        .layer(Extension(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
