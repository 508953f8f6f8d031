//! Type-specialized dispatch for the OpenFeature variant.
//!
//! An OpenFeature client has no "evaluate a flag of unknown type" call, so
//! `variable` and `variableValue` take a trailing kind tag and are redirected
//! to the matching typed evaluator call. Every other client command is served
//! by the generic table.

use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use serde_json::{Number, Value};
use tracing::info;

use super::commands;
use super::evaluation::{ErrorCode, EvaluationDetails};
use super::invoker::{CommandTable, Deferred};
use super::traits::{BaseFlagEvaluator, ClientHandle};
use crate::common::{Args, CommandError, Entity, ValueKind, Variable};

const MISSING_PARAMETER: &str = "Missing parameter:";

pub fn client_commands() -> CommandTable<ClientHandle> {
    commands::client_commands()
        .deferred("variable", describe)
        .deferred("variableValue", value_only)
}

/// Default value that fits the declared kind.
#[derive(Debug, Clone, PartialEq)]
enum TypedDefault {
    Boolean(bool),
    Number(f64),
    String(String),
    Json(Value),
}

impl TypedDefault {
    fn fit(kind: ValueKind, default: &Value) -> Option<Self> {
        match (kind, default) {
            (ValueKind::Boolean, Value::Bool(b)) => Some(TypedDefault::Boolean(*b)),
            (ValueKind::Number, Value::Number(n)) => n.as_f64().map(TypedDefault::Number),
            (ValueKind::String, Value::String(s)) => Some(TypedDefault::String(s.clone())),
            (ValueKind::Json, Value::Object(_) | Value::Array(_)) => {
                Some(TypedDefault::Json(default.clone()))
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
struct TypedRequest {
    context: Value,
    key: String,
    kind: ValueKind,
    default: Value,
}

impl TypedRequest {
    /// Arguments are `(context, key, default, kind)`. Only the kind tag picks
    /// the typed call; a default of another shape fails at evaluation.
    fn from_args(args: &Args) -> Result<Self, CommandError> {
        let kind = args
            .optional_str(3)
            .ok()
            .flatten()
            .and_then(|tag| ValueKind::from_tag(&tag))
            .ok_or(CommandError::InvalidValueKind)?;
        let key = args
            .optional_str(1)?
            .ok_or(CommandError::MissingParameter("key"))?;
        let default = args.json(2)?;
        if default.is_null() {
            return Err(CommandError::MissingParameter("defaultValue"));
        }

        Ok(Self {
            context: args.json(0)?,
            key,
            kind,
            default,
        })
    }
}

async fn evaluate(flags: &dyn BaseFlagEvaluator, request: &TypedRequest) -> EvaluationDetails<Value> {
    let key = request.key.as_str();
    let context = &request.context;
    let Some(typed) = TypedDefault::fit(request.kind, &request.default) else {
        return EvaluationDetails::failed(
            key,
            request.default.clone(),
            ErrorCode::TypeMismatch,
            format!("Default value is not of type {:?}", request.kind),
        );
    };

    match typed {
        TypedDefault::Boolean(default) => flags
            .boolean_details(key, default, context)
            .await
            .map_value(Value::Bool),
        TypedDefault::Number(default) => flags
            .number_details(key, default, context)
            .await
            .map_value(number),
        TypedDefault::String(default) => flags
            .string_details(key, default, context)
            .await
            .map_value(Value::String),
        TypedDefault::Json(default) => flags.object_details(key, default, context).await,
    }
}

/// Integral results are reported as integers.
fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Normalize typed details into a variable description. Missing-parameter
/// failures surface as errors; any other failure yields the default.
fn describe_details(details: EvaluationDetails<Value>, default: Value) -> Result<Variable> {
    if let Some(error) = &details.error {
        if error.message.starts_with(MISSING_PARAMETER) {
            return Err(CommandError::Resolution(error.message.clone()).into());
        }
        info!(flag = %details.flag_key, error = %error, "Flag evaluation failed, serving default");
    }

    Ok(Variable {
        is_defaulted: !details.is_targeting_match(),
        kind: ValueKind::of(&details.value),
        key: details.flag_key,
        value: details.value,
        default_value: default,
        eval: None,
    })
}

fn describe(client: Arc<ClientHandle>, args: Args) -> Deferred {
    async move {
        let request = TypedRequest::from_args(&args)?;
        let flags = client.flags()?;
        let details = evaluate(flags.as_ref(), &request).await;
        Ok(Entity::from(describe_details(details, request.default)?))
    }
    .boxed()
}

fn value_only(client: Arc<ClientHandle>, args: Args) -> Deferred {
    async move {
        let request = TypedRequest::from_args(&args)?;
        let flags = client.flags()?;
        Ok(Entity::Object(evaluate(flags.as_ref(), &request).await.value))
    }
    .boxed()
}
