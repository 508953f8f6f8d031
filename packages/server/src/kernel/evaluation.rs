//! Typed flag evaluation results, as produced by a `BaseFlagEvaluator`.

use std::fmt;

/// The flag was served by a targeting rule.
pub const TARGETING_MATCH: &str = "TARGETING_MATCH";
/// The supplied default was returned.
pub const DEFAULT: &str = "DEFAULT";
/// Evaluation failed; `error` carries the cause.
pub const ERROR: &str = "ERROR";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    FlagNotFound,
    TypeMismatch,
    InvalidContext,
    General,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationDetails<T> {
    pub flag_key: String,
    pub value: T,
    pub reason: String,
    pub error: Option<ResolutionError>,
}

impl<T> EvaluationDetails<T> {
    pub fn matched(flag_key: impl Into<String>, value: T) -> Self {
        Self {
            flag_key: flag_key.into(),
            value,
            reason: TARGETING_MATCH.to_string(),
            error: None,
        }
    }

    pub fn defaulted(flag_key: impl Into<String>, default: T) -> Self {
        Self {
            flag_key: flag_key.into(),
            value: default,
            reason: DEFAULT.to_string(),
            error: None,
        }
    }

    /// Details for a failed evaluation. The default stands in for the value.
    pub fn failed(
        flag_key: impl Into<String>,
        default: T,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            flag_key: flag_key.into(),
            value: default,
            reason: ERROR.to_string(),
            error: Some(ResolutionError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn is_targeting_match(&self) -> bool {
        self.reason == TARGETING_MATCH
    }

    pub fn map_value<U>(self, f: impl FnOnce(T) -> U) -> EvaluationDetails<U> {
        EvaluationDetails {
            flag_key: self.flag_key,
            value: f(self.value),
            reason: self.reason,
            error: self.error,
        }
    }
}
