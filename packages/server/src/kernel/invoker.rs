//! Command dispatch.
//!
//! Each invocable entity kind has a closed table from operation name to
//! handler, built once at startup. Nothing outside a table can be called.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use futures::future::BoxFuture;
use tracing::debug;

use super::traits::ClientHandle;
use super::{commands, typed_dispatch};
use crate::common::{Args, CommandError, Entity, EntityType, Variable};
use crate::config::ProxyVariant;

/// Pending result of a deferred operation.
pub type Deferred = BoxFuture<'static, Result<Entity>>;

pub enum Operation<T> {
    /// Completes without awaiting anything.
    Immediate(fn(&Arc<T>, &Args) -> Result<Entity>),
    /// Returns a future the invoker awaits.
    Deferred(fn(Arc<T>, Args) -> Deferred),
}

pub struct CommandTable<T> {
    target: EntityType,
    operations: HashMap<&'static str, Operation<T>>,
}

impl<T> CommandTable<T> {
    pub fn new(target: EntityType) -> Self {
        Self {
            target,
            operations: HashMap::new(),
        }
    }

    pub fn immediate(mut self, name: &'static str, op: fn(&Arc<T>, &Args) -> Result<Entity>) -> Self {
        self.operations.insert(name, Operation::Immediate(op));
        self
    }

    /// Registering a name twice keeps the later handler.
    pub fn deferred(mut self, name: &'static str, op: fn(Arc<T>, Args) -> Deferred) -> Self {
        self.operations.insert(name, Operation::Deferred(op));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    pub async fn invoke(
        &self,
        target: Arc<T>,
        command: &str,
        args: Args,
        is_async: bool,
    ) -> Result<Entity> {
        match self.operations.get(command) {
            None => Err(CommandError::unknown(command, self.target).into()),
            Some(Operation::Immediate(op)) => op(&target, &args),
            Some(Operation::Deferred(op)) => {
                if !is_async {
                    debug!(command, "Deferred operation requested in synchronous mode");
                }
                op(target, args).await
            }
        }
    }
}

/// Routes a command to the table of its target's kind.
pub struct Invoker {
    clients: CommandTable<ClientHandle>,
    variables: CommandTable<Variable>,
}

impl Invoker {
    pub fn new(variant: ProxyVariant) -> Self {
        let clients = match variant {
            ProxyVariant::Generic => commands::client_commands(),
            ProxyVariant::OpenFeature => typed_dispatch::client_commands(),
        };
        Self {
            clients,
            variables: commands::variable_commands(),
        }
    }

    pub async fn invoke(
        &self,
        target: &Entity,
        command: &str,
        args: Args,
        is_async: bool,
    ) -> Result<Entity> {
        match target {
            Entity::Client(client) => {
                self.clients
                    .invoke(client.clone(), command, args, is_async)
                    .await
            }
            Entity::Variable(variable) => {
                self.variables
                    .invoke(variable.clone(), command, args, is_async)
                    .await
            }
            other => Err(CommandError::unknown(command, other.entity_type()).into()),
        }
    }
}
