//! Mudwright - a runtime for persistent multi-user interactive worlds
//!
//! This crate re-exports all layers of the Mudwright system for convenient
//! access. For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: mudwright_runtime    — Snapshot files, console driver, binary
//! Layer 2: mudwright_session   — Sessions, suspendable tasks, commands
//!          mudwright_parser    — Patterns, filters, command matching
//! Layer 1: mudwright_world     — Traits, archetypes, directory, snapshots
//! Layer 0: mudwright_foundation — Core types (Value, ObjectId, Error)
//! ```

pub use mudwright_foundation as foundation;
pub use mudwright_parser as parser;
pub use mudwright_runtime as runtime;
pub use mudwright_session as session;
pub use mudwright_world as world;
