//! End-to-end scenarios through the interaction engine.

use std::sync::Arc;

use mudwright_foundation::Value;
use mudwright_session::{
    InteractionEngine, SessionId, SessionState, Transport, commands,
};
use mudwright_world::library::{self, fields};
use mudwright_world::{TraitRegistry, World};

#[derive(Default)]
struct Recorder {
    sent: Vec<(SessionId, String)>,
}

impl Transport for Recorder {
    fn send(&mut self, session: SessionId, text: &str) {
        self.sent.push((session, text.to_string()));
    }

    fn close(&mut self, session: SessionId, reason: &str) {
        self.sent.push((session, reason.to_string()));
    }
}

impl Recorder {
    fn texts_for(&self, id: SessionId) -> Vec<&str> {
        self.sent
            .iter()
            .filter(|(s, _)| *s == id)
            .map(|(_, t)| t.as_str())
            .collect()
    }
}

fn seeded_world() -> World {
    let mut registry = TraitRegistry::new();
    library::install(&mut registry).unwrap();
    let mut world = World::new(Arc::new(registry));
    let zone_arch = world.define_archetype("Zone", &["base", "zone"]).unwrap();
    let room_arch = world.define_archetype("Room", &["base", "room"]).unwrap();
    let zone = world
        .create(&zone_arch, &[(fields::NAME, "Harbour".into())])
        .unwrap();
    world
        .create(
            &room_arch,
            &[
                (fields::NAME, "Quayside".into()),
                (fields::DESCRIPTION, "Salt air and old rope.".into()),
                (fields::ZONE, Value::Ref(zone)),
            ],
        )
        .unwrap();
    world
}

fn engine() -> InteractionEngine {
    InteractionEngine::new(seeded_world(), commands::default_sets().unwrap())
}

#[test]
fn two_turn_command_suspends_resumes_and_releases_the_session() {
    let mut engine = engine();
    let mut out = Recorder::default();
    let id = SessionId::from_raw(1);
    engine.connect(id, &mut out);
    engine.line(id, "create keeper lockbox", &mut out);

    // Turn one: the command asks its question and suspends.
    engine.line(id, "@shutdown routine maintenance", &mut out);
    assert_eq!(engine.session_state(id), Some(SessionState::AwaitingInput));

    // The next line is the resumption value, not a command, even though it
    // would match one.
    engine.line(id, "no", &mut out);
    assert!(out.texts_for(id).contains(&"Cancelled."));
    assert_eq!(engine.session_state(id), Some(SessionState::Idle));
    assert!(engine.take_shutdown().is_none());

    // A third, unrelated line is matched fresh against the command set.
    engine.line(id, "look", &mut out);
    assert!(out.texts_for(id).contains(&"[Harbour; Quayside]"));
}

#[test]
fn world_survives_a_restart_mid_conversation() {
    let mut engine1 = engine();
    let mut out = Recorder::default();
    let id = SessionId::from_raw(1);
    engine1.connect(id, &mut out);
    engine1.line(id, "create keeper lockbox", &mut out);
    engine1.line(id, "@dig north", &mut out);

    // Snapshot between turns, as the driver loop would.
    let snapshot = engine1.world().snapshot();
    let accounts = engine1.accounts().export();

    // Simulated restart: fresh registry, fresh engine, restored state.
    let mut registry = TraitRegistry::new();
    library::install(&mut registry).unwrap();
    let mut world = World::new(Arc::new(registry));
    world.restore(&snapshot).unwrap();
    let mut engine2 = InteractionEngine::new(world, commands::default_sets().unwrap());
    engine2.accounts_mut().import(accounts).unwrap();

    let mut out2 = Recorder::default();
    let id2 = SessionId::from_raw(7);
    engine2.connect(id2, &mut out2);
    engine2.line(id2, "login keeper lockbox", &mut out2);
    assert!(
        out2.texts_for(id2)
            .iter()
            .any(|t| t.starts_with("Welcome back, keeper"))
    );

    // The dug room survived the round trip.
    engine2.line(id2, "north", &mut out2);
    assert!(out2.texts_for(id2).contains(&"[Harbour; New room]"));
}

#[test]
fn staff_see_fault_detail_and_others_do_not() {
    // A handler that always faults, registered alongside the defaults.
    let mut sets = commands::default_sets().unwrap();
    for set in [&mut sets.main, &mut sets.admin] {
        set.command(
            "break",
            "Always faults",
            &["break"],
            mudwright_session::simple(|_, _| {
                Err(mudwright_foundation::Error::Internal("wires crossed".into()))
            }),
        )
        .unwrap();
    }
    let mut engine = InteractionEngine::new(seeded_world(), sets);
    let mut out = Recorder::default();

    // First account is staff, second is not.
    let staff = SessionId::from_raw(1);
    let player = SessionId::from_raw(2);
    engine.connect(staff, &mut out);
    engine.connect(player, &mut out);
    engine.line(staff, "create keeper lockbox", &mut out);
    engine.line(player, "create deckhand swab", &mut out);

    engine.line(staff, "break", &mut out);
    assert!(
        out.texts_for(staff)
            .iter()
            .any(|t| t.contains("wires crossed"))
    );

    engine.line(player, "break", &mut out);
    assert!(
        out.texts_for(player)
            .contains(&"While executing your command an error occurred.")
    );
    assert!(
        !out.texts_for(player)
            .iter()
            .any(|t| t.contains("wires crossed"))
    );

    // Both sessions keep working.
    engine.line(player, "look", &mut out);
    assert!(out.texts_for(player).contains(&"[Harbour; Quayside]"));
}

#[test]
fn disconnect_detaches_the_controlling_object() {
    let mut engine = engine();
    let mut out = Recorder::default();
    let id = SessionId::from_raw(1);
    engine.connect(id, &mut out);
    engine.line(id, "create keeper lockbox", &mut out);

    let object = engine.session(id).unwrap().object().unwrap();
    assert!(
        mudwright_session::controlling_session(engine.world(), object).is_some()
    );

    engine.disconnect(id);
    assert!(
        mudwright_session::controlling_session(engine.world(), object).is_none()
    );
    // The character itself persists in the world.
    assert!(engine.world().contains(object));
}
