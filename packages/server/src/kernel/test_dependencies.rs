// TestDependencies - in-memory SDK implementations for testing
//
// Provides a client factory whose clients serve flags from a fixed map, so the
// protocol can be exercised end to end without a bucketing API.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use bucketing_client::validate_sdk_key;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::evaluation::{ErrorCode, EvaluationDetails};
use super::{BaseClientFactory, BaseFlagEvaluator, BaseSdkClient, ClientHandle};
use crate::common::{ClientRequest, CommandError, ValueKind, Variable};
use crate::config::ProxyVariant;

fn user_id(user: &Value) -> Option<&str> {
    user.get("user_id")
        .or_else(|| user.get("targetingKey"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
}

// =============================================================================
// Mock SDK Client
// =============================================================================

pub struct MockSdkClient {
    flags: Arc<HashMap<String, Value>>,
    tracked: Mutex<Vec<Value>>,
    flushes: Mutex<usize>,
    closed: Mutex<bool>,
    init_error: Option<String>,
}

impl MockSdkClient {
    pub fn new() -> Self {
        Self::with_flags(Arc::new(HashMap::new()))
    }

    pub fn with_flags(flags: Arc<HashMap<String, Value>>) -> Self {
        Self {
            flags,
            tracked: Mutex::new(Vec::new()),
            flushes: Mutex::new(0),
            closed: Mutex::new(false),
            init_error: None,
        }
    }

    pub fn with_init_error(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    pub fn tracked(&self) -> Vec<Value> {
        self.tracked.lock().unwrap().clone()
    }

    pub fn flushes(&self) -> usize {
        *self.flushes.lock().unwrap()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }

    fn served(&self) -> Map<String, Value> {
        self.flags
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl Default for MockSdkClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseSdkClient for MockSdkClient {
    async fn variable(&self, user: &Value, key: Option<&str>, default: &Value) -> Result<Variable> {
        let key = key.ok_or(CommandError::MissingParameter("key"))?;
        if default.is_null() {
            bail!(CommandError::MissingParameter("defaultValue"));
        }
        if user_id(user).is_none() {
            bail!("Must have a user_id set on the user");
        }

        let kind = ValueKind::of(default);
        let served = self
            .flags
            .get(key)
            .filter(|value| ValueKind::of(value) == kind);

        Ok(Variable {
            key: key.to_string(),
            value: served.cloned().unwrap_or_else(|| default.clone()),
            default_value: default.clone(),
            is_defaulted: served.is_none(),
            kind,
            eval: None,
        })
    }

    async fn all_variables(&self, user: &Value) -> Result<Value> {
        user_id(user).ok_or_else(|| anyhow!("Must have a user_id set on the user"))?;
        Ok(Value::Object(self.served()))
    }

    async fn all_features(&self, user: &Value) -> Result<Value> {
        user_id(user).ok_or_else(|| anyhow!("Must have a user_id set on the user"))?;
        Ok(Value::Object(Map::new()))
    }

    async fn track(&self, user: &Value, event: &Value) -> Result<()> {
        user_id(user).ok_or_else(|| anyhow!("Must have a user_id set on the user"))?;
        if event.get("type").and_then(Value::as_str).map_or(true, str::is_empty) {
            bail!("Invalid Event");
        }
        self.tracked.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        *self.flushes.lock().unwrap() += 1;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }

    async fn wait_for_initialization(&self) -> Result<()> {
        match &self.init_error {
            Some(message) => bail!("{}", message),
            None => Ok(()),
        }
    }
}

// =============================================================================
// Mock Flag Evaluator
// =============================================================================

pub struct MockFlagEvaluator {
    flags: Arc<HashMap<String, Value>>,
}

impl MockFlagEvaluator {
    pub fn new(flags: Arc<HashMap<String, Value>>) -> Self {
        Self { flags }
    }

    fn resolve<T>(
        &self,
        key: &str,
        default: T,
        context: &Value,
        extract: impl FnOnce(&Value) -> Option<T>,
    ) -> EvaluationDetails<T> {
        if user_id(context).is_none() {
            return EvaluationDetails::failed(
                key,
                default,
                ErrorCode::InvalidContext,
                "Missing parameter: targetingKey",
            );
        }
        match self.flags.get(key) {
            None => EvaluationDetails::failed(key, default, ErrorCode::FlagNotFound, "Flag not found"),
            Some(value) => match extract(value) {
                Some(value) => EvaluationDetails::matched(key, value),
                None => EvaluationDetails::failed(
                    key,
                    default,
                    ErrorCode::TypeMismatch,
                    "Flag type does not match default",
                ),
            },
        }
    }
}

#[async_trait]
impl BaseFlagEvaluator for MockFlagEvaluator {
    async fn boolean_details(&self, key: &str, default: bool, context: &Value) -> EvaluationDetails<bool> {
        self.resolve(key, default, context, Value::as_bool)
    }

    async fn number_details(&self, key: &str, default: f64, context: &Value) -> EvaluationDetails<f64> {
        self.resolve(key, default, context, Value::as_f64)
    }

    async fn string_details(
        &self,
        key: &str,
        default: String,
        context: &Value,
    ) -> EvaluationDetails<String> {
        self.resolve(key, default, context, |v| v.as_str().map(String::from))
    }

    async fn object_details(&self, key: &str, default: Value, context: &Value) -> EvaluationDetails<Value> {
        self.resolve(key, default, context, |v| {
            (v.is_object() || v.is_array()).then(|| v.clone())
        })
    }
}

// =============================================================================
// Mock Client Factory
// =============================================================================

/// Builds clients over a shared flag map. Created SDK clients are kept by
/// client id for inspection.
pub struct MockClientFactory {
    variant: ProxyVariant,
    flags: Arc<HashMap<String, Value>>,
    init_error: Option<String>,
    created: Mutex<HashMap<String, Arc<MockSdkClient>>>,
}

impl MockClientFactory {
    pub fn new(variant: ProxyVariant) -> Self {
        Self {
            variant,
            flags: Arc::new(HashMap::new()),
            init_error: None,
            created: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_flag(mut self, key: &str, value: Value) -> Self {
        Arc::make_mut(&mut self.flags).insert(key.to_string(), value);
        self
    }

    /// Clients created from now on fail `wait_for_initialization`.
    pub fn with_init_error(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    pub fn client(&self, client_id: &str) -> Option<Arc<MockSdkClient>> {
        self.created.lock().unwrap().get(client_id).cloned()
    }
}

impl BaseClientFactory for MockClientFactory {
    fn create(&self, request: &ClientRequest) -> Result<ClientHandle> {
        validate_sdk_key(request.sdk_key.as_deref())?;

        let mut sdk = MockSdkClient::with_flags(self.flags.clone());
        if let Some(message) = &self.init_error {
            sdk = sdk.with_init_error(message);
        }
        let sdk = Arc::new(sdk);
        if let Some(id) = request.client_id() {
            self.created.lock().unwrap().insert(id.to_string(), sdk.clone());
        }

        let handle = ClientHandle::new(sdk);
        Ok(match self.variant {
            ProxyVariant::Generic => handle,
            ProxyVariant::OpenFeature => {
                handle.with_flags(Arc::new(MockFlagEvaluator::new(self.flags.clone())))
            }
        })
    }
}
