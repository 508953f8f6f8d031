//! Command tables of the generic variant.

use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use tracing::info;

use super::invoker::{CommandTable, Deferred};
use super::traits::ClientHandle;
use crate::common::{Args, Entity, EntityType, Variable};

pub fn client_commands() -> CommandTable<ClientHandle> {
    CommandTable::new(EntityType::Client)
        .deferred("variable", variable)
        .deferred("variableValue", variable_value)
        .deferred("allVariables", all_variables)
        .deferred("allFeatures", all_features)
        .deferred("track", track)
        .deferred("flush", flush)
        .immediate("close", close)
}

pub fn variable_commands() -> CommandTable<Variable> {
    CommandTable::new(EntityType::Variable).immediate("onUpdate", on_update)
}

// =============================================================================
// Client commands
// =============================================================================

fn variable(client: Arc<ClientHandle>, args: Args) -> Deferred {
    async move {
        let user = args.json(0)?;
        let key = args.optional_str(1)?;
        let default = args.json(2)?;
        let variable = client.sdk.variable(&user, key.as_deref(), &default).await?;
        Ok(Entity::from(variable))
    }
    .boxed()
}

fn variable_value(client: Arc<ClientHandle>, args: Args) -> Deferred {
    async move {
        let user = args.json(0)?;
        let key = args.optional_str(1)?;
        let default = args.json(2)?;
        let value = client
            .sdk
            .variable_value(&user, key.as_deref(), &default)
            .await?;
        Ok(Entity::Object(value))
    }
    .boxed()
}

fn all_variables(client: Arc<ClientHandle>, args: Args) -> Deferred {
    async move {
        let user = args.json(0)?;
        Ok(Entity::Object(client.sdk.all_variables(&user).await?))
    }
    .boxed()
}

fn all_features(client: Arc<ClientHandle>, args: Args) -> Deferred {
    async move {
        let user = args.json(0)?;
        Ok(Entity::Object(client.sdk.all_features(&user).await?))
    }
    .boxed()
}

fn track(client: Arc<ClientHandle>, args: Args) -> Deferred {
    async move {
        let user = args.json(0)?;
        let event = args.json(1)?;
        client.sdk.track(&user, &event).await?;
        Ok(Entity::Void)
    }
    .boxed()
}

fn flush(client: Arc<ClientHandle>, _args: Args) -> Deferred {
    async move {
        client.sdk.flush().await?;
        Ok(Entity::Void)
    }
    .boxed()
}

fn close(client: &Arc<ClientHandle>, _args: &Args) -> Result<Entity> {
    client.sdk.close()?;
    Ok(Entity::Void)
}

// =============================================================================
// Variable commands
// =============================================================================

/// Deliver the variable's current state to the callback and hand the same
/// variable back.
fn on_update(variable: &Arc<Variable>, args: &Args) -> Result<Entity> {
    let callback = args.callback(0)?;
    info!(key = %variable.key, url = %callback.url(), "Registering variable callback");
    callback.notify_in_background(serde_json::to_value(variable.as_ref())?);
    Ok(Entity::Variable(variable.clone()))
}
