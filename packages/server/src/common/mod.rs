// Common types and utilities shared across the application

pub mod callback;
pub mod entity;
pub mod entity_store;
pub mod errors;
pub mod location;
pub mod params;
pub mod types;

pub use callback::Callback;
pub use entity::{Entity, EntityType, ValueKind, Variable};
pub use entity_store::EntityStore;
pub use errors::{CommandError, ProtocolError};
pub use location::{Category, Location, LocationError};
pub use params::{marshal, Arg, Args, Param, Role, Roles};
pub use types::*;
