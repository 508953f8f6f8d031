//! Adapters over the cloud bucketing client.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bucketing_client::{BucketingClient, BucketingError, BucketingOptions};
use serde_json::{Map, Value};
use tracing::info;

use super::evaluation::{ErrorCode, EvaluationDetails};
use super::traits::{BaseClientFactory, BaseFlagEvaluator, BaseSdkClient, ClientHandle};
use crate::common::{ClientRequest, ValueKind, Variable};
use crate::config::ProxyVariant;

impl From<bucketing_client::Variable> for Variable {
    fn from(variable: bucketing_client::Variable) -> Self {
        Self {
            kind: ValueKind::of(&variable.value),
            key: variable.key,
            value: variable.value,
            default_value: variable.default_value,
            is_defaulted: variable.is_defaulted,
            eval: variable.eval,
        }
    }
}

// =============================================================================
// CloudSdkClient (implements BaseSdkClient)
// =============================================================================

pub struct CloudSdkClient(pub BucketingClient);

#[async_trait]
impl BaseSdkClient for CloudSdkClient {
    async fn variable(&self, user: &Value, key: Option<&str>, default: &Value) -> Result<Variable> {
        Ok(self.0.variable(user, key, default).await?.into())
    }

    async fn all_variables(&self, user: &Value) -> Result<Value> {
        Ok(Value::Object(self.0.all_variables(user).await?))
    }

    async fn all_features(&self, user: &Value) -> Result<Value> {
        Ok(Value::Object(self.0.all_features(user).await?))
    }

    async fn track(&self, user: &Value, event: &Value) -> Result<()> {
        Ok(self.0.track(user, event).await?)
    }
}

// =============================================================================
// CloudFlagEvaluator (implements BaseFlagEvaluator)
// =============================================================================

pub struct CloudFlagEvaluator(pub BucketingClient);

impl CloudFlagEvaluator {
    /// An evaluation context identifies its user by `targetingKey`; the
    /// bucketing API expects `user_id`.
    fn user(context: &Value) -> Value {
        let mut user = context.as_object().cloned().unwrap_or_else(Map::new);
        if !user.contains_key("user_id") {
            if let Some(targeting_key) = user.remove("targetingKey") {
                user.insert("user_id".to_string(), targeting_key);
            }
        }
        Value::Object(user)
    }

    async fn resolve<T>(
        &self,
        key: &str,
        default: T,
        context: &Value,
        to_value: impl FnOnce(&T) -> Value,
        from_value: impl FnOnce(Value) -> Option<T>,
    ) -> EvaluationDetails<T> {
        let default_value = to_value(&default);
        let variable = match self
            .0
            .variable(&Self::user(context), Some(key), &default_value)
            .await
        {
            Ok(variable) => variable,
            Err(e) => {
                let code = match e {
                    BucketingError::InvalidUser | BucketingError::MissingParameter(_) => {
                        ErrorCode::InvalidContext
                    }
                    _ => ErrorCode::General,
                };
                return EvaluationDetails::failed(key, default, code, e.to_string());
            }
        };

        if variable.is_defaulted {
            return EvaluationDetails::defaulted(key, default);
        }
        match from_value(variable.value) {
            Some(value) => EvaluationDetails::matched(key, value),
            None => EvaluationDetails::failed(
                key,
                default,
                ErrorCode::TypeMismatch,
                "Served value does not match the requested type",
            ),
        }
    }
}

#[async_trait]
impl BaseFlagEvaluator for CloudFlagEvaluator {
    async fn boolean_details(&self, key: &str, default: bool, context: &Value) -> EvaluationDetails<bool> {
        self.resolve(key, default, context, |d| Value::Bool(*d), |v| v.as_bool())
            .await
    }

    async fn number_details(&self, key: &str, default: f64, context: &Value) -> EvaluationDetails<f64> {
        self.resolve(key, default, context, |d| Value::from(*d), |v| v.as_f64())
            .await
    }

    async fn string_details(
        &self,
        key: &str,
        default: String,
        context: &Value,
    ) -> EvaluationDetails<String> {
        self.resolve(
            key,
            default,
            context,
            |d| Value::String(d.clone()),
            |v| match v {
                Value::String(s) => Some(s),
                _ => None,
            },
        )
        .await
    }

    async fn object_details(&self, key: &str, default: Value, context: &Value) -> EvaluationDetails<Value> {
        self.resolve(
            key,
            default,
            context,
            Value::clone,
            |v| (v.is_object() || v.is_array()).then_some(v),
        )
        .await
    }
}

// =============================================================================
// CloudClientFactory (implements BaseClientFactory)
// =============================================================================

pub struct CloudClientFactory {
    variant: ProxyVariant,
    default_bucketing_url: String,
}

impl CloudClientFactory {
    pub fn new(variant: ProxyVariant, default_bucketing_url: impl Into<String>) -> Self {
        Self {
            variant,
            default_bucketing_url: default_bucketing_url.into(),
        }
    }
}

impl BaseClientFactory for CloudClientFactory {
    fn create(&self, request: &ClientRequest) -> Result<ClientHandle> {
        let options = request.options.clone().unwrap_or_default();
        if !request.enable_cloud_bucketing {
            info!(
                client_id = ?request.client_id(),
                "Local bucketing requested, serving through the cloud bucketing API"
            );
        }

        let client = BucketingClient::new(BucketingOptions {
            sdk_key: request.sdk_key.clone(),
            base_url: options
                .bucketing_api_uri
                .unwrap_or_else(|| self.default_bucketing_url.clone()),
            enable_edge_db: options.enable_edge_db,
        })?;
        info!(base_url = client.base_url(), variant = %self.variant, "Created cloud client");

        let handle = ClientHandle::new(Arc::new(CloudSdkClient(client.clone())));
        Ok(match self.variant {
            ProxyVariant::Generic => handle,
            ProxyVariant::OpenFeature => handle.with_flags(Arc::new(CloudFlagEvaluator(client))),
        })
    }
}
