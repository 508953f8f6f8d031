// Trait definitions for the wrapped SDK
//
// These are the seams between the protocol layer and a concrete SDK. The
// command tables only ever talk to these traits; adapters over a real client
// live in `cloud`, fakes for tests in `test_dependencies`.
//
// Naming convention: Base* for trait names (e.g., BaseSdkClient, BaseFlagEvaluator)

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use super::evaluation::EvaluationDetails;
use crate::common::{ClientRequest, CommandError, Variable};

// =============================================================================
// SDK Client Trait (generic evaluation of flags of unknown type)
// =============================================================================

#[async_trait]
pub trait BaseSdkClient: Send + Sync {
    /// Evaluate `key` for `user`, falling back to `default`.
    async fn variable(&self, user: &Value, key: Option<&str>, default: &Value)
        -> Result<Variable>;

    /// Evaluate and return the value only
    async fn variable_value(
        &self,
        user: &Value,
        key: Option<&str>,
        default: &Value,
    ) -> Result<Value> {
        Ok(self.variable(user, key, default).await?.value)
    }

    /// All variables served to `user`, keyed by variable key
    async fn all_variables(&self, user: &Value) -> Result<Value>;

    /// All features served to `user`, keyed by feature key
    async fn all_features(&self, user: &Value) -> Result<Value>;

    async fn track(&self, user: &Value, event: &Value) -> Result<()>;

    /// Flush queued events. Clients that send eagerly have nothing to flush.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn wait_for_initialization(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Flag Evaluator Trait (type-specialized evaluation, OpenFeature-style)
// =============================================================================

/// Evaluation failures are reported inside the returned details, never as
/// an error.
#[async_trait]
pub trait BaseFlagEvaluator: Send + Sync {
    async fn boolean_details(
        &self,
        key: &str,
        default: bool,
        context: &Value,
    ) -> EvaluationDetails<bool>;

    async fn number_details(&self, key: &str, default: f64, context: &Value)
        -> EvaluationDetails<f64>;

    async fn string_details(
        &self,
        key: &str,
        default: String,
        context: &Value,
    ) -> EvaluationDetails<String>;

    async fn object_details(
        &self,
        key: &str,
        default: Value,
        context: &Value,
    ) -> EvaluationDetails<Value>;

    async fn boolean_value(&self, key: &str, default: bool, context: &Value) -> bool {
        self.boolean_details(key, default, context).await.value
    }

    async fn number_value(&self, key: &str, default: f64, context: &Value) -> f64 {
        self.number_details(key, default, context).await.value
    }

    async fn string_value(&self, key: &str, default: String, context: &Value) -> String {
        self.string_details(key, default, context).await.value
    }

    async fn object_value(&self, key: &str, default: Value, context: &Value) -> Value {
        self.object_details(key, default, context).await.value
    }

    async fn wait_until_ready(&self) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// Client Handle
// =============================================================================

/// A configured client as stored under `client/<clientId>`.
pub struct ClientHandle {
    pub sdk: Arc<dyn BaseSdkClient>,
    /// Present only for the OpenFeature-style variant.
    pub flags: Option<Arc<dyn BaseFlagEvaluator>>,
}

impl ClientHandle {
    pub fn new(sdk: Arc<dyn BaseSdkClient>) -> Self {
        Self { sdk, flags: None }
    }

    pub fn with_flags(mut self, flags: Arc<dyn BaseFlagEvaluator>) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn flags(&self) -> Result<&Arc<dyn BaseFlagEvaluator>, CommandError> {
        self.flags.as_ref().ok_or(CommandError::NoFlagEvaluator)
    }

    /// Bring the client up. A flag evaluator is always awaited; the SDK's own
    /// initialization only when the caller asked to wait for it.
    pub async fn initialize(&self, wait: bool) -> Result<()> {
        if let Some(flags) = &self.flags {
            flags.wait_until_ready().await?;
        }
        if wait {
            self.sdk.wait_for_initialization().await?;
        }
        Ok(())
    }
}

// =============================================================================
// Client Factory Trait
// =============================================================================

pub trait BaseClientFactory: Send + Sync {
    /// Construct a client from a `POST /client` body. Initialization is the
    /// caller's job (`ClientHandle::initialize`).
    fn create(&self, request: &ClientRequest) -> Result<ClientHandle>;
}
