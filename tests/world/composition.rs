//! Integration tests for trait composition and defaults.

use std::sync::Arc;

use mudwright_foundation::{Type, Value};
use mudwright_world::{FieldDef, TraitDef, TraitRegistry, World};

fn registry_with(defs: Vec<TraitDef>) -> Arc<TraitRegistry> {
    let mut registry = TraitRegistry::new();
    for def in defs {
        registry.register(def).unwrap();
    }
    Arc::new(registry)
}

#[test]
fn create_with_no_overrides_yields_declared_defaults() {
    let registry = registry_with(vec![
        TraitDef::new("named")
            .with_field(FieldDef::new("name", "Name", "unnamed")),
        TraitDef::new("scored")
            .with_field(FieldDef::new("score", "Score", 10))
            .with_field(FieldDef::typed("tags", "Tags", Type::List, Value::empty_list())),
    ]);
    let mut world = World::new(registry);
    let arch = world.define_archetype("Thing", &["named", "scored"]).unwrap();

    let id = world.create(&arch, &[]).unwrap();
    let object = world.get(id).unwrap();
    assert_eq!(object.get("name").unwrap(), &Value::from("unnamed"));
    assert_eq!(object.get("score").unwrap(), &Value::Int(10));
    assert_eq!(object.get("tags").unwrap(), &Value::empty_list());
}

#[test]
fn container_defaults_are_not_shared_between_instances() {
    let registry = registry_with(vec![TraitDef::new("listed").with_field(
        FieldDef::typed("items", "Items", Type::List, Value::empty_list()),
    )]);
    let mut world = World::new(registry);
    let arch = world.define_archetype("Holder", &["listed"]).unwrap();

    let a = world.create(&arch, &[]).unwrap();
    let b = world.create(&arch, &[]).unwrap();

    // Mutate a's list in place.
    let mut items = world
        .get(a)
        .unwrap()
        .get("items")
        .unwrap()
        .as_list()
        .unwrap()
        .clone();
    items.push_back(Value::Int(1));
    world.set_field(a, "items", Value::List(items)).unwrap();

    // Neither b nor a fresh instance sees the mutation.
    assert_eq!(world.get(b).unwrap().get("items").unwrap(), &Value::empty_list());
    let c = world.create(&arch, &[]).unwrap();
    assert_eq!(world.get(c).unwrap().get("items").unwrap(), &Value::empty_list());
}

#[test]
fn later_trait_overrides_earlier_field() {
    let registry = registry_with(vec![
        TraitDef::new("dull").with_field(FieldDef::new("colour", "Colour", "grey")),
        TraitDef::new("vivid").with_field(FieldDef::new("colour", "Colour", "red")),
    ]);
    let mut world = World::new(registry);

    let dull_first = world
        .define_archetype("Painted", &["dull", "vivid"])
        .unwrap();
    assert_eq!(
        dull_first.field("colour").unwrap().default,
        Value::from("red")
    );

    let vivid_first = world
        .define_archetype("Painted", &["vivid", "dull"])
        .unwrap();
    assert_eq!(
        vivid_first.field("colour").unwrap().default,
        Value::from("grey")
    );
}

#[test]
fn unknown_override_names_every_offender() {
    let registry = registry_with(vec![
        TraitDef::new("named").with_field(FieldDef::new("name", "Name", "unnamed")),
    ]);
    let mut world = World::new(registry);
    let arch = world.define_archetype("Thing", &["named"]).unwrap();

    let err = world
        .create(
            &arch,
            &[
                ("name", "ok".into()),
                ("sprocket", Value::Int(1)),
                ("widget", Value::Int(2)),
            ],
        )
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("sprocket"));
    assert!(message.contains("widget"));
    assert!(!message.contains("ok"));
}
