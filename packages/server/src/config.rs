use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use serde::Serialize;

/// Which protocol variant the proxy speaks.
///
/// `OpenFeature` wraps clients that have no generic "evaluate a flag of unknown
/// type" entry point, so `variable`/`variableValue` go through type-specialized
/// dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyVariant {
    Generic,
    OpenFeature,
}

impl ProxyVariant {
    pub fn default_name(&self) -> &'static str {
        match self {
            ProxyVariant::Generic => "Rust",
            ProxyVariant::OpenFeature => "OF-Rust",
        }
    }

    pub fn capabilities(&self) -> Vec<String> {
        let mut capabilities = vec!["EdgeDB", "CloudBucketing", "Events", "VariableValue"];
        if *self == ProxyVariant::OpenFeature {
            capabilities.push("OpenFeature");
        }
        capabilities.into_iter().map(String::from).collect()
    }
}

impl FromStr for ProxyVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "generic" => Ok(ProxyVariant::Generic),
            "openfeature" | "open-feature" => Ok(ProxyVariant::OpenFeature),
            other => anyhow::bail!("Unknown proxy variant: {}", other),
        }
    }
}

impl fmt::Display for ProxyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyVariant::Generic => write!(f, "generic"),
            ProxyVariant::OpenFeature => write!(f, "openfeature"),
        }
    }
}

/// What `GET /spec` reports to the test driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxySpec {
    pub name: String,
    pub version: String,
    pub capabilities: Vec<String>,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub variant: ProxyVariant,
    pub sdk_name: String,
    pub sdk_version: String,
    pub bucketing_api_uri: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let variant: ProxyVariant = env::var("PROXY_VARIANT")
            .unwrap_or_else(|_| "generic".to_string())
            .parse()
            .context("PROXY_VARIANT must be `generic` or `openfeature`")?;

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            variant,
            sdk_name: env::var("SDK_NAME").unwrap_or_else(|_| variant.default_name().to_string()),
            sdk_version: env::var("SDK_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            bucketing_api_uri: env::var("BUCKETING_API_URI")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
        })
    }

    pub fn spec(&self) -> ProxySpec {
        ProxySpec {
            name: self.sdk_name.clone(),
            version: self.sdk_version.clone(),
            capabilities: self.variant.capabilities(),
        }
    }
}
