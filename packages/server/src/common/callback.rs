use std::fmt;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;

/// A callback URL passed as an argument. Notifying it POSTs `{ data }`.
#[derive(Clone)]
pub struct Callback {
    url: Url,
    http: reqwest::Client,
}

impl Callback {
    pub fn new(url: Url, http: reqwest::Client) -> Self {
        Self { url, http }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn notify(&self, data: Value) -> Result<()> {
        self.http
            .post(self.url.clone())
            .json(&json!({ "data": data }))
            .send()
            .await
            .with_context(|| format!("Failed to reach callback {}", self.url))?
            .error_for_status()
            .with_context(|| format!("Callback {} rejected delivery", self.url))?;
        Ok(())
    }

    /// Deliver without holding up the caller.
    pub fn notify_in_background(&self, data: Value) {
        let callback = self.clone();
        tokio::spawn(async move {
            match callback.notify(data).await {
                Ok(()) => debug!(url = %callback.url, "Callback delivered"),
                Err(e) => warn!(url = %callback.url, error = %e, "Callback delivery failed"),
            }
        });
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("url", &self.url.as_str()).finish()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}
