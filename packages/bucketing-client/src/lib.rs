//! Pure cloud bucketing REST API client.
//!
//! A minimal client for the remote bucketing API. Flag evaluation happens
//! server-side; this client only validates inputs, ships the user to the API
//! and maps the responses back. Supports single-variable evaluation, the
//! variable and feature maps, and event tracking.
//!
//! # Example
//!
//! ```rust,ignore
//! use bucketing_client::{BucketingClient, BucketingOptions};
//! use serde_json::json;
//!
//! let client = BucketingClient::new(BucketingOptions {
//!     sdk_key: Some("dvc_server_key".into()),
//!     base_url: "http://localhost:8000".into(),
//!     enable_edge_db: false,
//! })?;
//!
//! let user = json!({ "user_id": "u1" });
//! let variable = client.variable(&user, Some("new-checkout"), &json!(false)).await?;
//! println!("{} = {}", variable.key, variable.value);
//! ```

pub mod error;
pub mod types;

pub use error::{BucketingError, Result};
pub use types::{PlatformData, TrackRequest, Variable, VariableType};

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde_json::{Map, Value};

/// Attempts per request, counting the first one.
const MAX_ATTEMPTS: u32 = 3;

/// Base delay between attempts; multiplied by the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Prefixes of keys issued for server SDKs.
const SERVER_KEY_PREFIXES: [&str; 2] = ["server", "dvc_server"];

/// Check that `sdk_key` is present and is a server key.
pub fn validate_sdk_key(sdk_key: Option<&str>) -> Result<&str> {
    let sdk_key = sdk_key
        .filter(|key| !key.is_empty())
        .ok_or(BucketingError::MissingSdkKey)?;
    if SERVER_KEY_PREFIXES
        .iter()
        .any(|prefix| sdk_key.starts_with(prefix))
    {
        Ok(sdk_key)
    } else {
        Err(BucketingError::InvalidSdkKey)
    }
}

#[derive(Debug, Clone)]
pub struct BucketingOptions {
    pub sdk_key: Option<String>,
    pub base_url: String,
    pub enable_edge_db: bool,
}

#[derive(Debug, Clone)]
pub struct BucketingClient {
    client: reqwest::Client,
    sdk_key: String,
    base_url: String,
    enable_edge_db: bool,
    platform: PlatformData,
}

impl BucketingClient {
    pub fn new(options: BucketingOptions) -> Result<Self> {
        let sdk_key = validate_sdk_key(options.sdk_key.as_deref())?.to_string();

        Ok(Self {
            client: reqwest::Client::new(),
            sdk_key,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            enable_edge_db: options.enable_edge_db,
            platform: PlatformData::default(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Evaluate a single variable for `user`.
    ///
    /// Input errors are returned as errors. Everything that goes wrong after
    /// the request is sent (transport failure, bad status, unparsable body,
    /// value of the wrong type) degrades to the defaulted variable.
    pub async fn variable(
        &self,
        user: &Value,
        key: Option<&str>,
        default_value: &Value,
    ) -> Result<Variable> {
        let key = key
            .filter(|key| !key.is_empty())
            .ok_or(BucketingError::MissingParameter("key"))?;
        if default_value.is_null() {
            return Err(BucketingError::MissingParameter("defaultValue"));
        }
        let user = self.populated_user(user)?;

        let served = match self.post(&["variables", key], &user).await {
            Ok(resp) => resp
                .json::<Option<Variable>>()
                .await
                .map_err(BucketingError::from),
            Err(e) => Err(e),
        };

        let variable = match served {
            Ok(Some(variable))
                if VariableType::of(&variable.value) == VariableType::of(default_value) =>
            {
                Variable {
                    default_value: default_value.clone(),
                    ..variable
                }
            }
            Ok(Some(variable)) => {
                tracing::warn!(
                    key,
                    served = %VariableType::of(&variable.value),
                    expected = %VariableType::of(default_value),
                    "Variable type mismatch, serving default"
                );
                Variable::defaulted(key, default_value.clone())
            }
            Ok(None) => Variable::defaulted(key, default_value.clone()),
            Err(e) => {
                tracing::warn!(key, error = %e, "Variable request failed, serving default");
                Variable::defaulted(key, default_value.clone())
            }
        };

        Ok(variable)
    }

    /// All variables bucketed for `user`, keyed by variable key.
    pub async fn all_variables(&self, user: &Value) -> Result<Map<String, Value>> {
        let user = self.populated_user(user)?;
        self.fetch_map(&["variables"], &user).await
    }

    /// All features bucketed for `user`, keyed by feature key.
    pub async fn all_features(&self, user: &Value) -> Result<Map<String, Value>> {
        let user = self.populated_user(user)?;
        self.fetch_map(&["features"], &user).await
    }

    /// Send a single custom event for `user`.
    pub async fn track(&self, user: &Value, event: &Value) -> Result<()> {
        let user = Value::Object(self.populated_user(user)?);
        let has_type = event
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|event_type| !event_type.is_empty());
        if !has_type {
            return Err(BucketingError::InvalidEvent);
        }

        let body = TrackRequest {
            user: &user,
            events: vec![event],
        };
        self.post(&["track"], &body).await?;
        Ok(())
    }

    /// Variable and feature maps degrade to empty on server-side failures but
    /// surface client-side (4xx) failures.
    async fn fetch_map(&self, path: &[&str], user: &Map<String, Value>) -> Result<Map<String, Value>> {
        match self.post(path, user).await {
            Ok(resp) => Ok(resp
                .json::<Option<Map<String, Value>>>()
                .await?
                .unwrap_or_default()),
            Err(e) if e.is_retryable() => {
                tracing::warn!(path = ?path, error = %e, "Bucketing request failed, returning empty map");
                Ok(Map::new())
            }
            Err(e) => Err(e),
        }
    }

    fn populated_user(&self, user: &Value) -> Result<Map<String, Value>> {
        let fields = user.as_object().ok_or(BucketingError::InvalidUser)?;
        match fields.get("user_id") {
            Some(Value::String(id)) if !id.is_empty() => Ok(self.platform.apply(fields)),
            _ => Err(BucketingError::InvalidUser),
        }
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &[&str], body: &B) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        let mut attempt = 1;
        loop {
            match self.send(&url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    tracing::debug!(url = %url, attempt, error = %e, "Retrying bucketing request");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// `<base_url>/v1/<segments..>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let invalid = || BucketingError::InvalidBaseUrl(self.base_url.clone());
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push("v1")
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(&self, url: &Url, body: &B) -> Result<reqwest::Response> {
        let mut request = self
            .client
            .post(url.clone())
            .header(AUTHORIZATION, &self.sdk_key)
            .json(body);
        if self.enable_edge_db {
            request = request.query(&[("enableEdgeDB", "true")]);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BucketingError::Api {
                status: status.as_u16(),
                message: api_message(status, &body),
            });
        }
        Ok(resp)
    }
}

/// Prefer the server's `{ "message": .. }`, then the raw body, then the
/// status reason.
fn api_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(message)) = fields.get("message") {
            return message.clone();
        }
    }
    if !body.trim().is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Bucketing API error")
        .to_string()
}
