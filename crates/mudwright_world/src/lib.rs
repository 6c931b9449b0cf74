//! Entity runtime and world directory for Mudwright.
//!
//! This crate provides:
//! - [`TraitDef`]/[`TraitRegistry`] - Reusable behaviour-and-field bundles
//! - [`Archetype`] - Entity types synthesized from ordered trait lists
//! - [`World`] - The authoritative identity→object directory with
//!   hook-maintained indexes
//! - [`Snapshot`] - Reference-preserving serialization of the whole directory
//! - [`library`] - The built-in trait library (rooms, zones, exits, actors)
//! - [`DirectionRegistry`] - Compass directions for exits and movement

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod archetype;
mod direction;
pub mod library;
mod object;
mod snapshot;
mod trait_def;
mod world;

pub use archetype::Archetype;
pub use direction::{Direction, DirectionRegistry};
pub use object::Object;
pub use snapshot::{ObjectRecord, Snapshot};
pub use trait_def::{FieldDef, Hook, SerializeHook, TraitDef, TraitRegistry};
pub use world::World;
