//! In-process entity store.
//!
//! Holds every live object the proxy has handed out a location for. Clients
//! are keyed by the id the test driver chose; every other category is an
//! append-only list whose index is the id. Entries are never evicted during
//! a run.
//!
//! The maps are sharded (`DashMap`), so a put or get never waits on an
//! in-flight command. Guards are dropped before returning.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;

use super::entity::Entity;
use super::location::{Category, Location};

/// Thread-safe, cloneable store of live entities.
#[derive(Clone, Default)]
pub struct EntityStore {
    clients: Arc<DashMap<String, Entity>>,
    entries: Arc<DashMap<Category, Vec<Entity>>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entity to a category and return its location. Ids within a
    /// category start at 0 and increase by one per put.
    pub fn put(&self, category: Category, entity: Entity) -> Location {
        let mut list = self.entries.entry(category.clone()).or_default();
        list.push(entity);
        Location::Entry(category, list.len() - 1)
    }

    /// Register a root client under its caller-chosen id. Re-registering an
    /// id replaces the previous client.
    pub fn put_client(&self, id: &str, entity: Entity) -> Location {
        if self.clients.insert(id.to_string(), entity).is_some() {
            warn!(client_id = %id, "Replacing existing client");
        }
        Location::client(id)
    }

    pub fn get(&self, location: &Location) -> Option<Entity> {
        match location {
            Location::Client(id) => self.clients.get(id).map(|entry| entry.value().clone()),
            Location::Entry(category, id) => self
                .entries
                .get(category)
                .and_then(|list| list.value().get(*id).cloned()),
        }
    }

    /// Total number of stored entities across all categories.
    pub fn len(&self) -> usize {
        self.clients.len()
            + self
                .entries
                .iter()
                .map(|entry| entry.value().len())
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop everything. Used between test runs only.
    pub fn reset(&self) {
        self.clients.clear();
        self.entries.clear();
    }
}
