use axum::http::StatusCode;
use thiserror::Error;

use super::entity::EntityType;

/// Malformed requests. These are answered with a 4xx status and a
/// `{message}` body; they never reach an adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid request: missing entity")]
    MissingEntity,

    #[error("Invalid request: missing command")]
    MissingCommand,

    #[error("Invalid request: missing entity from param")]
    MissingEntityFromParam,

    #[error("Invalid request: missing clientId")]
    MissingClientId,

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl ProtocolError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProtocolError::MissingEntity
            | ProtocolError::MissingCommand
            | ProtocolError::MissingEntityFromParam => StatusCode::NOT_FOUND,
            ProtocolError::MissingClientId | ProtocolError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ProtocolError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }
}

/// Failures raised by dispatch or by a type-specialized adapter. They travel
/// inside `anyhow::Error` and are reported as domain failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("{command} is not a supported operation on {target}")]
    UnknownCommand { command: String, target: EntityType },

    #[error("Invalid argument at position {index}: expected {expected}, found {found}")]
    InvalidArgument {
        index: usize,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Invalid default value type")]
    InvalidValueKind,

    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    #[error("{0}")]
    Resolution(String),

    #[error("Client has no flag evaluator")]
    NoFlagEvaluator,
}

impl CommandError {
    pub fn unknown(command: &str, target: EntityType) -> Self {
        CommandError::UnknownCommand {
            command: command.to_string(),
            target,
        }
    }
}
