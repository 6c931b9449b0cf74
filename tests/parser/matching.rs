//! Matching lines through the real command surfaces.

use std::sync::Arc;

use mudwright_foundation::{Error, ObjectId, Value};
use mudwright_parser::{Arg, MatchContext};
use mudwright_session::commands;
use mudwright_world::library::{self, fields};
use mudwright_world::{DirectionRegistry, TraitRegistry, World};

/// A room with three actors: the player, a guard, and two goblins (for
/// ambiguity).
fn populated() -> (World, ObjectId) {
    let mut registry = TraitRegistry::new();
    library::install(&mut registry).unwrap();
    let mut world = World::new(Arc::new(registry));

    let room_arch = world.define_archetype("Room", &["base", "room"]).unwrap();
    let actor_arch = world
        .define_archetype("Character", &["base", "located", "actor"])
        .unwrap();

    let room = world.create(&room_arch, &[(fields::NAME, "Yard".into())]).unwrap();
    let spawn = |world: &mut World, name: &str| {
        world
            .create(
                &actor_arch,
                &[(fields::NAME, name.into()), (fields::LOCATION, Value::Ref(room))],
            )
            .unwrap()
    };
    let player = spawn(&mut world, "Player");
    spawn(&mut world, "Guard");
    spawn(&mut world, "Goblin Alpha");
    spawn(&mut world, "Goblin Beta");
    (world, player)
}

fn resolve(
    world: &World,
    actor: ObjectId,
    line: &str,
) -> (Result<(String, mudwright_parser::Args), Error>, Vec<String>) {
    let set = commands::main_set().unwrap();
    let directions = DirectionRegistry::with_compass();
    let mut notices = Vec::new();
    let mut sink = |text: &str| notices.push(text.to_string());
    let mut ctx = MatchContext::new(world, Some(actor), false, &directions, &mut sink);
    let result = set
        .resolve(&mut ctx, line)
        .map(|r| (r.name.to_string(), r.args));
    drop(ctx);
    (result, notices)
}

#[test]
fn look_overloads_resolve_by_argument_count() {
    let (world, player) = populated();

    let (result, _) = resolve(&world, player, "look");
    let (name, args) = result.unwrap();
    assert_eq!(name, "look");
    assert!(args.is_empty());

    let (result, _) = resolve(&world, player, "look guard");
    let (name, args) = result.unwrap();
    assert_eq!(name, "look");
    assert!(args.object("thing").is_some());
}

#[test]
fn unresolvable_object_is_filter_feedback_not_no_match() {
    let (world, player) = populated();

    let (result, _) = resolve(&world, player, "look nonexistent-gibberish");
    let (_, args) = result.unwrap();
    assert_eq!(
        args.get("thing"),
        Some(&Arg::NotFound("nonexistent-gibberish".to_string()))
    );
}

#[test]
fn ambiguous_object_notifies_and_binds_sentinel() {
    let (world, player) = populated();

    let (result, notices) = resolve(&world, player, "look goblin");
    let (_, args) = result.unwrap();
    assert_eq!(args.get("thing"), Some(&Arg::Ambiguous("goblin".to_string())));
    assert_eq!(notices, vec!["I don't know which \"goblin\" you mean.".to_string()]);
}

#[test]
fn me_resolves_to_the_actor() {
    let (world, player) = populated();

    let (result, _) = resolve(&world, player, "look me");
    let (_, args) = result.unwrap();
    assert_eq!(args.object("thing"), Some(player));
}

#[test]
fn direction_words_resolve_canonically() {
    let (world, player) = populated();

    let (result, _) = resolve(&world, player, "n");
    let (name, args) = result.unwrap();
    assert_eq!(name, "go");
    assert_eq!(args.text("dir"), Some("north"));

    let (result, _) = resolve(&world, player, "go sw");
    let (_, args) = result.unwrap();
    assert_eq!(args.text("dir"), Some("southwest"));
}

#[test]
fn unknown_line_reports_no_match_with_candidates() {
    let (world, player) = populated();

    let (result, _) = resolve(&world, player, "look at the guard please");
    match result.unwrap_err() {
        Error::NoMatch { tried } => assert_eq!(tried, vec!["look".to_string()]),
        other => panic!("unexpected error: {other}"),
    }

    let (result, _) = resolve(&world, player, "somersault");
    match result.unwrap_err() {
        Error::NoMatch { tried } => assert!(tried.is_empty()),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn remainder_preserves_inner_spacing() {
    let (world, player) = populated();

    let (result, _) = resolve(&world, player, "say what  a   day");
    let (name, args) = result.unwrap();
    assert_eq!(name, "say");
    assert_eq!(args.text("text"), Some("what  a   day"));
}
