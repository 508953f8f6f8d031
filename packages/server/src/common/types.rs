// Request bodies shared by the HTTP layer and the client factories.

use serde::Deserialize;
use serde_json::Value;

use super::params::{Param, Roles};

/// Body of `POST /client`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRequest {
    pub client_id: Option<String>,
    pub sdk_key: Option<String>,
    #[serde(default)]
    pub enable_cloud_bucketing: bool,
    #[serde(default)]
    pub wait_for_initialization: bool,
    pub options: Option<ClientOptions>,
}

impl ClientRequest {
    /// Caller-chosen client id, if present and non-empty.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// SDK options passed through at client construction. Options that only
/// apply to local bucketing, and unknown keys, are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientOptions {
    #[serde(rename = "bucketingAPIURI", alias = "baseURLOverride")]
    pub bucketing_api_uri: Option<String>,
    #[serde(rename = "enableEdgeDB", default)]
    pub enable_edge_db: bool,
}

/// Body of `POST /<location>`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    pub command: Option<String>,
    pub params: Option<Vec<Param>>,
    pub user: Option<Value>,
    pub event: Option<Value>,
    pub is_async: Option<bool>,
}

impl CommandRequest {
    /// Command name, if present and non-empty.
    pub fn command(&self) -> Option<&str> {
        self.command.as_deref().filter(|c| !c.is_empty())
    }

    pub fn params(&self) -> &[Param] {
        self.params.as_deref().unwrap_or_default()
    }

    pub fn is_async(&self) -> bool {
        self.is_async.unwrap_or(false)
    }

    pub fn roles(&self) -> Roles<'_> {
        Roles {
            user: self.user.as_ref(),
            event: self.event.as_ref(),
        }
    }
}
