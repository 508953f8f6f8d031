//! Error types for the bucketing client.

use thiserror::Error;

/// Result type for bucketing client operations.
pub type Result<T> = std::result::Result<T, BucketingError>;

/// Bucketing client errors.
///
/// The `Display` strings are part of the harness contract: the test driver
/// compares them verbatim, so keep them stable.
#[derive(Debug, Error)]
pub enum BucketingError {
    /// Client constructed without an SDK key
    #[error("Missing SDK key! Call build with a valid server SDK key")]
    MissingSdkKey,

    /// SDK key is not a server key
    #[error("Invalid SDK key provided. Call build with a valid server SDK key")]
    InvalidSdkKey,

    /// A required call argument was null or empty
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// User is not an object or carries no `user_id`
    #[error("Must have a user_id set on the user")]
    InvalidUser,

    /// Event is not an object or carries no `type`
    #[error("Invalid Event")]
    InvalidEvent,

    /// Base URL cannot carry a request path
    #[error("Invalid bucketing API URL: {0}")]
    InvalidBaseUrl(String),

    /// Non-2xx response; `message` is the server's own message when it sent one
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Network error (connection refused, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl BucketingError {
    /// Whether the request that produced this error may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            BucketingError::Api { status, .. } => *status >= 500,
            BucketingError::Network(_) => true,
            _ => false,
        }
    }
}
