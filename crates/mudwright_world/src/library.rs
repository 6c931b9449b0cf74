//! The built-in trait library and the derived queries over it.
//!
//! These traits cover the stock furniture of a world: rooms grouped into
//! zones, exits linking rooms, and actors that occupy rooms and talk. Games
//! register their own traits alongside these; nothing here is privileged.

use mudwright_foundation::{ObjectId, Result, Type, Value};

use crate::trait_def::{FieldDef, TraitDef, TraitRegistry};
use crate::world::World;

/// Canonical field names used by the built-in traits.
pub mod fields {
    /// Object name.
    pub const NAME: &str = "name";
    /// Object description.
    pub const DESCRIPTION: &str = "description";
    /// Location reference.
    pub const LOCATION: &str = "location";
    /// A room's owning zone.
    pub const ZONE: &str = "zone";
    /// An exit's far side.
    pub const DESTINATION: &str = "destination";
    /// An exit's direction name.
    pub const DIRECTION: &str = "direction";
    /// Who an actor is following.
    pub const FOLLOWING: &str = "following";
    /// An actor's say template.
    pub const SAY_MSG: &str = "say_msg";
    /// The session currently controlling an actor. Transient.
    pub const SESSION: &str = "session";
}

/// Names of the directory indexes the built-in traits maintain.
pub mod index {
    /// All rooms.
    pub const ROOMS: &str = "rooms";
    /// All zones.
    pub const ZONES: &str = "zones";
    /// All exits.
    pub const EXITS: &str = "exits";
    /// All actors.
    pub const ACTORS: &str = "actors";
}

/// The `base` trait: a name and a description.
#[must_use]
pub fn base() -> TraitDef {
    TraitDef::new("base")
        .with_field(FieldDef::typed(
            fields::NAME,
            "The name of this object",
            Type::Str,
            Value::Nil,
        ))
        .with_field(FieldDef::typed(
            fields::DESCRIPTION,
            "The description of this object",
            Type::Text,
            Value::Nil,
        ))
}

/// The `located` trait: adds location information.
#[must_use]
pub fn located() -> TraitDef {
    TraitDef::new("located").with_field(
        FieldDef::typed(
            fields::LOCATION,
            "The location of this object",
            Type::Ref,
            Value::Nil,
        )
        .hidden(),
    )
}

/// The `room` trait: membership in the rooms index and an owning zone.
#[must_use]
pub fn room() -> TraitDef {
    TraitDef::indexed("room", index::ROOMS).with_field(FieldDef::typed(
        fields::ZONE,
        "The zone this room is part of",
        Type::Ref,
        Value::Nil,
    ))
}

/// The `zone` trait: membership in the zones index.
#[must_use]
pub fn zone() -> TraitDef {
    TraitDef::indexed("zone", index::ZONES)
}

/// The `exit` trait: links its location to a destination room.
#[must_use]
pub fn exit() -> TraitDef {
    TraitDef::indexed("exit", index::EXITS)
        .with_field(
            FieldDef::typed(
                fields::DESTINATION,
                "The other side of this exit",
                Type::Ref,
                Value::Nil,
            )
            .hidden(),
        )
        .with_field(FieldDef::typed(
            fields::DIRECTION,
            "The direction this exit leads",
            Type::Str,
            Value::Nil,
        ))
}

/// The `actor` trait: something that occupies a room, talks, and can follow.
#[must_use]
pub fn actor() -> TraitDef {
    TraitDef::indexed("actor", index::ACTORS)
        .with_field(FieldDef::new(
            fields::SAY_MSG,
            "The social template used when this actor says something",
            r#"%1N say%1s: "{text}""#,
        ))
        .with_field(
            FieldDef::typed(
                fields::FOLLOWING,
                "The actor this actor is following",
                Type::Ref,
                Value::Nil,
            )
            .hidden(),
        )
        .with_field(FieldDef::new(
            "walk_style",
            "This actor's walk style",
            "walk%1s",
        ))
        .with_field(FieldDef::new(
            "start_follow_msg",
            "Shown when this actor starts following another",
            "%1N start%1s following %2n.",
        ))
        .with_field(FieldDef::new(
            "stop_follow_msg",
            "Shown when this actor stops following",
            "%1N stop%1s following %2n.",
        ))
        .with_field(
            FieldDef::typed(
                fields::SESSION,
                "The session controlling this actor",
                Type::Int,
                Value::Nil,
            )
            .hidden()
            .transient(),
        )
}

/// Registers the whole built-in library.
///
/// # Errors
///
/// Returns [`mudwright_foundation::Error::DuplicateTrait`] if any of the
/// names are already taken.
pub fn install(registry: &mut TraitRegistry) -> Result<()> {
    registry.register(base())?;
    registry.register(located())?;
    registry.register(room())?;
    registry.register(zone())?;
    registry.register(exit())?;
    registry.register(actor())?;
    Ok(())
}

/// Reads a reference field, yielding the target only while it is live.
/// Dangling references simply drop out of query results.
fn ref_field(world: &World, id: ObjectId, field: &str) -> Option<ObjectId> {
    world
        .object(id)?
        .get(field)
        .ok()?
        .as_ref_id()
        .filter(|&target| world.contains(target))
}

/// Actors currently located in the given room.
#[must_use]
pub fn contents(world: &World, room: ObjectId) -> Vec<ObjectId> {
    world
        .index(index::ACTORS)
        .filter(|&id| ref_field(world, id, fields::LOCATION) == Some(room))
        .collect()
}

/// Exits leading out of the given room.
#[must_use]
pub fn exits_from(world: &World, room: ObjectId) -> Vec<ObjectId> {
    world
        .index(index::EXITS)
        .filter(|&id| ref_field(world, id, fields::LOCATION) == Some(room))
        .collect()
}

/// Exits leading into the given room.
#[must_use]
pub fn entrances_to(world: &World, room: ObjectId) -> Vec<ObjectId> {
    world
        .index(index::EXITS)
        .filter(|&id| ref_field(world, id, fields::DESTINATION) == Some(room))
        .collect()
}

/// Rooms belonging to the given zone.
#[must_use]
pub fn rooms_in_zone(world: &World, zone: ObjectId) -> Vec<ObjectId> {
    world
        .index(index::ROOMS)
        .filter(|&id| ref_field(world, id, fields::ZONE) == Some(zone))
        .collect()
}

/// The exit running opposite to the given one, if the rooms are linked both
/// ways.
#[must_use]
pub fn other_side(world: &World, exit: ObjectId) -> Option<ObjectId> {
    let location = ref_field(world, exit, fields::LOCATION)?;
    let destination = ref_field(world, exit, fields::DESTINATION)?;
    world.index(index::EXITS).find(|&id| {
        ref_field(world, id, fields::LOCATION) == Some(destination)
            && ref_field(world, id, fields::DESTINATION) == Some(location)
    })
}

/// Actors currently following the given actor.
#[must_use]
pub fn followers(world: &World, actor: ObjectId) -> Vec<ObjectId> {
    world
        .index(index::ACTORS)
        .filter(|&id| ref_field(world, id, fields::FOLLOWING) == Some(actor))
        .collect()
}
