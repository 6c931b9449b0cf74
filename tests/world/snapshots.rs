//! Integration tests for snapshot/restore semantics.

use std::sync::Arc;

use mudwright_foundation::{Error, ObjectId, Type, Value};
use mudwright_world::{FieldDef, TraitDef, TraitRegistry, World};

/// The registry from the persistence scenario: a chamber trait with a zone
/// reference, an exit-list trait with a container default, and a zone trait.
fn scenario_registry() -> Arc<TraitRegistry> {
    let mut registry = TraitRegistry::new();
    registry
        .register(
            TraitDef::indexed("chamber", "chambers").with_field(FieldDef::typed(
                "zone",
                "Owning zone",
                Type::Ref,
                Value::Nil,
            )),
        )
        .unwrap();
    registry
        .register(
            TraitDef::new("has-exits").with_field(FieldDef::typed(
                "exits",
                "Exit references",
                Type::List,
                Value::empty_list(),
            )),
        )
        .unwrap();
    registry
        .register(TraitDef::indexed("zone", "zones"))
        .unwrap();
    registry
        .register(
            TraitDef::indexed("passage", "passages")
                .with_field(FieldDef::typed("from", "Near side", Type::Ref, Value::Nil))
                .with_field(FieldDef::typed("to", "Far side", Type::Ref, Value::Nil)),
        )
        .unwrap();
    Arc::new(registry)
}

#[test]
fn zone_reference_is_a_marker_and_survives_restore_by_identity() {
    let mut world = World::new(scenario_registry());
    let zone_arch = world.define_archetype("Zone", &["zone"]).unwrap();
    let room_arch = world
        .define_archetype("Room", &["chamber", "has-exits"])
        .unwrap();

    let z1 = world.create(&zone_arch, &[]).unwrap();
    let room = world.create(&room_arch, &[("zone", Value::Ref(z1))]).unwrap();

    // The room's record carries a reference marker, never an inlined zone.
    let snapshot = world.snapshot();
    let record = snapshot.objects.iter().find(|r| r.id == room).unwrap();
    assert_eq!(record.fields["zone"], Value::Ref(z1));
    let json = serde_json::to_value(&snapshot).unwrap();
    let room_json = json["objects"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["id"].as_u64() == Some(room.raw()))
        .unwrap();
    assert_eq!(room_json["fields"]["zone"]["$ref"], z1.raw());
    // The exits field still equals its default, so it is omitted.
    assert!(room_json["fields"].get("exits").is_none());

    // Restoring yields the same reconstructed zone instance, by identity.
    let mut restored = World::new(scenario_registry());
    restored.restore(&snapshot).unwrap();
    let zone_ref = restored.get_field(room, "zone").unwrap();
    let resolved = restored.resolve(&zone_ref).unwrap();
    assert_eq!(resolved.id(), z1);
    assert!(resolved.archetype().has_trait("zone"));
}

#[test]
fn cyclic_graph_roundtrips() {
    let mut world = World::new(scenario_registry());
    let room_arch = world
        .define_archetype("Room", &["chamber", "has-exits"])
        .unwrap();
    let passage_arch = world.define_archetype("Passage", &["passage"]).unwrap();

    // room A ↔ passage ↔ room B ↔ passage ↔ room A
    let a = world.create(&room_arch, &[]).unwrap();
    let b = world.create(&room_arch, &[]).unwrap();
    let ab = world
        .create(
            &passage_arch,
            &[("from", Value::Ref(a)), ("to", Value::Ref(b))],
        )
        .unwrap();
    let ba = world
        .create(
            &passage_arch,
            &[("from", Value::Ref(b)), ("to", Value::Ref(a))],
        )
        .unwrap();
    let exits_of = |from: ObjectId, passage: ObjectId| {
        let mut list = Value::empty_list();
        if let Value::List(items) = &mut list {
            items.push_back(Value::Ref(passage));
        }
        (from, list)
    };
    for (room, exits) in [exits_of(a, ab), exits_of(b, ba)] {
        world.set_field(room, "exits", exits).unwrap();
    }

    let snapshot = world.snapshot();
    let mut restored = World::new(scenario_registry());
    restored.restore(&snapshot).unwrap();

    // Walk the cycle in the restored world.
    let a_exits = restored.get_field(a, "exits").unwrap();
    let first_exit = a_exits.as_list().unwrap().get(0).unwrap().clone();
    let passage = restored.resolve(&first_exit).unwrap().id();
    let far = restored.get_field(passage, "to").unwrap();
    assert_eq!(far, Value::Ref(b));
    let back = restored.get_field(b, "exits").unwrap();
    let back_passage = restored
        .resolve(back.as_list().unwrap().get(0).unwrap())
        .unwrap()
        .id();
    assert_eq!(restored.get_field(back_passage, "to").unwrap(), Value::Ref(a));
}

#[test]
fn snapshot_twice_without_mutation_is_byte_identical() {
    let mut world = World::new(scenario_registry());
    let zone_arch = world.define_archetype("Zone", &["zone"]).unwrap();
    let room_arch = world
        .define_archetype("Room", &["chamber", "has-exits"])
        .unwrap();
    let zone = world.create(&zone_arch, &[]).unwrap();
    for _ in 0..5 {
        world.create(&room_arch, &[("zone", Value::Ref(zone))]).unwrap();
    }

    let first = serde_json::to_vec(&world.snapshot()).unwrap();
    let second = serde_json::to_vec(&world.snapshot()).unwrap();
    assert_eq!(first, second);

    // And a restored world snapshots to the same bytes again.
    let mut restored = World::new(scenario_registry());
    restored.restore(&world.snapshot()).unwrap();
    let third = serde_json::to_vec(&restored.snapshot()).unwrap();
    assert_eq!(first, third);
}

#[test]
fn restore_into_non_empty_world_fails_and_leaves_it_untouched() {
    let mut world = World::new(scenario_registry());
    let zone_arch = world.define_archetype("Zone", &["zone"]).unwrap();
    world.create(&zone_arch, &[]).unwrap();
    let snapshot = world.snapshot();

    let mut occupied = World::new(scenario_registry());
    let occupant = occupied.create(&zone_arch, &[]).unwrap();
    let before = occupied.snapshot();

    assert!(matches!(
        occupied.restore(&snapshot),
        Err(Error::NonEmptyWorld)
    ));
    assert_eq!(occupied.snapshot(), before);
    assert!(occupied.contains(occupant));
}

#[test]
fn restored_identities_never_collide_with_new_objects() {
    let mut world = World::new(scenario_registry());
    let zone_arch = world.define_archetype("Zone", &["zone"]).unwrap();
    for _ in 0..3 {
        world.create(&zone_arch, &[]).unwrap();
    }
    let snapshot = world.snapshot();

    let mut restored = World::new(scenario_registry());
    restored.restore(&snapshot).unwrap();
    let fresh_arch = restored.define_archetype("Zone", &["zone"]).unwrap();
    let fresh = restored.create(&fresh_arch, &[]).unwrap();
    assert!(snapshot.objects.iter().all(|r| fresh > r.id));
}
