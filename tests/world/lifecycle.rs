//! Integration tests for object lifecycle and identity.

use std::sync::Arc;

use proptest::prelude::*;

use mudwright_foundation::ObjectId;
use mudwright_world::{TraitRegistry, World, library};

fn library_world() -> World {
    let mut registry = TraitRegistry::new();
    library::install(&mut registry).unwrap();
    World::new(Arc::new(registry))
}

#[test]
fn create_then_delete_leaves_indexes_at_pre_create_state() {
    let mut world = library_world();
    let room_arch = world.define_archetype("Room", &["base", "room"]).unwrap();
    let zone_arch = world.define_archetype("Zone", &["base", "zone"]).unwrap();

    // Pre-existing members so the indexes are not empty.
    world.create(&room_arch, &[]).unwrap();
    world.create(&zone_arch, &[]).unwrap();
    let rooms_before: Vec<ObjectId> = world.index(library::index::ROOMS).collect();
    let zones_before: Vec<ObjectId> = world.index(library::index::ZONES).collect();

    let id = world.create(&room_arch, &[]).unwrap();
    world.delete(id).unwrap();

    let rooms_after: Vec<ObjectId> = world.index(library::index::ROOMS).collect();
    let zones_after: Vec<ObjectId> = world.index(library::index::ZONES).collect();
    assert_eq!(rooms_before, rooms_after);
    assert_eq!(zones_before, zones_after);
}

#[test]
fn deleted_object_is_gone_but_identity_is_not_recycled() {
    let mut world = library_world();
    let arch = world.define_archetype("Zone", &["base", "zone"]).unwrap();

    let first = world.create(&arch, &[]).unwrap();
    world.delete(first).unwrap();
    assert!(world.object(first).is_none());

    let second = world.create(&arch, &[]).unwrap();
    assert_ne!(first, second);
    assert!(second > first);
}

proptest! {
    /// Creating n objects, deleting any m of them, then creating one more
    /// always yields an identity strictly greater than every previous one.
    #[test]
    fn identity_never_repeats(n in 1usize..20, delete_mask in proptest::collection::vec(any::<bool>(), 20)) {
        let mut world = library_world();
        let arch = world.define_archetype("Zone", &["base", "zone"]).unwrap();

        let ids: Vec<ObjectId> = (0..n).map(|_| world.create(&arch, &[]).unwrap()).collect();
        for (id, &delete) in ids.iter().zip(&delete_mask) {
            if delete {
                world.delete(*id).unwrap();
            }
        }

        let fresh = world.create(&arch, &[]).unwrap();
        prop_assert!(ids.iter().all(|&old| fresh > old));
    }
}
