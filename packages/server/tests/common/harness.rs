//! Test harness driving the router in-process.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so no port is bound. Each
//! harness owns a fresh entity store and a mock client factory.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::LOCATION, Request, StatusCode},
    Router,
};
use proxy_core::kernel::{MockClientFactory, MockSdkClient};
use proxy_core::server::{build_app, AxumAppState};
use proxy_core::{ProxySpec, ProxyVariant};
use serde_json::{json, Value};
use test_context::AsyncTestContext;
use tower::ServiceExt;

use super::{flag_factory, test_user};

/// What a test sees of a response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Value,
}

impl TestResponse {
    /// The `Location` header of a 201, failing the test otherwise.
    pub fn created(&self) -> &str {
        assert_eq!(self.status, StatusCode::CREATED, "unexpected response: {:?}", self.body);
        self.location.as_deref().expect("201 without a Location header")
    }
}

pub struct TestHarness {
    pub app: Router,
    pub state: AxumAppState,
    pub factory: Arc<MockClientFactory>,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new(ProxyVariant::Generic)
    }

    async fn teardown(self) {
        // Store is dropped with the harness
    }
}

impl TestHarness {
    pub fn new(variant: ProxyVariant) -> Self {
        Self::with_factory(variant, flag_factory(variant))
    }

    pub fn with_factory(variant: ProxyVariant, factory: MockClientFactory) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let factory = Arc::new(factory);
        let spec = ProxySpec {
            name: variant.default_name().to_string(),
            version: "0.0.0-test".to_string(),
            capabilities: variant.capabilities(),
        };
        let state = AxumAppState::new(variant, spec, factory.clone());

        Self {
            app: build_app(state.clone()),
            state,
            factory,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            location,
            body,
        }
    }

    pub async fn post_raw(&self, path: &str, body: impl Into<Body>) -> TestResponse {
        let request = Request::post(path)
            .header("content-type", "application/json")
            .body(body.into())
            .expect("valid request");
        self.send(request).await
    }

    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.post_raw(path, body.to_string()).await
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::get(path).body(Body::empty()).expect("valid request");
        self.send(request).await
    }

    pub async fn create_client(&self, client_id: &str) -> TestResponse {
        self.post(
            "/client",
            json!({"clientId": client_id, "sdkKey": "dvc_server_test", "enableCloudBucketing": true}),
        )
        .await
    }

    /// Register a client and return its location.
    pub async fn client(&self, client_id: &str) -> String {
        self.create_client(client_id).await.created().to_string()
    }

    /// Store the default test user and return its location.
    pub async fn user(&self) -> String {
        self.post("/user", test_user()).await.created().to_string()
    }

    pub async fn command(&self, location: &str, command: &str, params: Vec<Value>) -> TestResponse {
        self.post(
            &format!("/{}", location),
            json!({"command": command, "params": params}),
        )
        .await
    }

    pub async fn command_async(
        &self,
        location: &str,
        command: &str,
        params: Vec<Value>,
    ) -> TestResponse {
        self.post(
            &format!("/{}", location),
            json!({"command": command, "params": params, "isAsync": true}),
        )
        .await
    }

    /// The mock SDK client registered under `client_id`.
    pub fn sdk(&self, client_id: &str) -> Arc<MockSdkClient> {
        self.factory
            .client(client_id)
            .expect("client was created through the factory")
    }
}
