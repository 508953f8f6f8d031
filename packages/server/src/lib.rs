// SDK Harness Proxy - Core
//
// This crate exposes a feature-flag SDK over HTTP so an implementation-agnostic
// test driver can exercise it. Live objects (clients, users, command results)
// are held in an entity store and addressed by opaque locations; commands are
// dispatched through closed per-entity command tables.

pub mod common;
pub mod config;
pub mod kernel;
pub mod server;

pub use config::*;
