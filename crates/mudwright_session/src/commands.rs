//! The default command surfaces: login, main, builder, and admin sets.

use std::collections::BTreeMap;
use std::sync::Arc;

use mudwright_foundation::{Error, ObjectId, Result, Value};
use mudwright_parser::{Arg, Args, FilterOutcome, MatchContext};
use mudwright_world::library::{self, fields, index};

use crate::engine::CommandSets;
use crate::session::SetKind;
use crate::task::{
    CommandCtx, Commands, Handler, Invocation, Outcome, SuspendedTask, TaskStep, bind_control,
    location_of, simple,
};
use crate::util::{english_list, yes_or_no};

/// Builds all four default command surfaces.
///
/// # Errors
///
/// Returns a pattern error if any built-in pattern is malformed (a bug, not
/// a runtime condition).
pub fn default_sets() -> Result<CommandSets> {
    Ok(CommandSets {
        login: login_set()?,
        main: main_set()?,
        builder: builder_set()?,
        admin: admin_set()?,
    })
}

/// The unauthenticated pre-session command set.
///
/// # Errors
///
/// Returns a pattern error if a built-in pattern is malformed.
pub fn login_set() -> Result<Commands> {
    let mut set = Commands::new();
    register_filters(&mut set);
    set.command("help", "Get a list of possible commands", &["help", "commands", "?"], help())?;
    set.command(
        "login",
        "Log in to an existing character",
        &["login <username> <password>"],
        login(),
    )?;
    set.command(
        "create",
        "Create a new character",
        &["create <username> <password>"],
        create(),
    )?;
    set.command("quit", "Disconnect from the game", &["quit", "@quit"], quit())?;
    Ok(set)
}

/// The authenticated in-world command set.
///
/// # Errors
///
/// Returns a pattern error if a built-in pattern is malformed.
pub fn main_set() -> Result<Commands> {
    let mut set = Commands::new();
    register_filters(&mut set);
    set.command("help", "Get a list of possible commands", &["help", "commands", "?"], help())?;
    set.command(
        "look",
        "Look at your surroundings, or at something in particular",
        &["look", "look <object:thing>"],
        look(),
    )?;
    set.command("say", "Say something out loud", &["say <text*>"], say())?;
    set.command(
        "go",
        "Walk through an exit",
        &["go <direction:dir>", "<direction:dir>"],
        go(),
    )?;
    set.command(
        "follow",
        "Start following someone",
        &["follow <object:thing>"],
        follow(),
    )?;
    set.command("unfollow", "Stop following", &["unfollow"], unfollow())?;
    set.command("quit", "Disconnect from the game", &["quit", "@quit"], quit())?;
    Ok(set)
}

/// The builder command set: everything in the main set plus digging.
///
/// # Errors
///
/// Returns a pattern error if a built-in pattern is malformed.
pub fn builder_set() -> Result<Commands> {
    let mut set = main_set()?;
    set.command(
        "@dig",
        "Dig a new room in the given direction",
        &["@dig <direction:dir>"],
        dig(),
    )?;
    set.command(
        "@undig",
        "Remove the exit in the given direction",
        &["@undig <direction:dir>", "@destroy-exit <direction:dir>"],
        undig(),
    )?;
    Ok(set)
}

/// The admin command set: everything in the builder set plus server control.
///
/// # Errors
///
/// Returns a pattern error if a built-in pattern is malformed.
pub fn admin_set() -> Result<Commands> {
    let mut set = builder_set()?;
    set.command("@save", "Snapshot the world to disk", &["@save"], save())?;
    set.command(
        "@shutdown",
        "Shut down the server",
        &["@shutdown <reason*>", "@shutdown"],
        shutdown(),
    )?;
    Ok(set)
}

fn register_filters(set: &mut Commands) {
    set.add_filter("direction", |ctx, word| match ctx.directions.get(word) {
        Some(direction) => FilterOutcome::Resolved(Arg::Word(direction.name.to_string())),
        None => FilterOutcome::Reject,
    });
    set.add_filter("object", object_filter);
}

/// Disambiguates a word against what the actor can see.
///
/// `me` always resolves to the actor, and staff may address any object as
/// `#<id>`. No match binds the `NotFound` sentinel for the handler to report;
/// more than one match notifies the player here and binds `Ambiguous`.
fn object_filter(ctx: &mut MatchContext<'_>, word: &str) -> FilterOutcome {
    if ctx.staff {
        if let Some(raw) = word.strip_prefix('#') {
            let resolved = raw
                .parse::<u64>()
                .ok()
                .map(ObjectId::from_raw)
                .filter(|&id| ctx.world.contains(id));
            return FilterOutcome::Resolved(match resolved {
                Some(id) => Arg::Object(id),
                None => Arg::NotFound(word.to_string()),
            });
        }
    }

    let Some(actor) = ctx.actor else {
        return FilterOutcome::Resolved(Arg::NotFound(word.to_string()));
    };
    if word.eq_ignore_ascii_case("me") {
        return FilterOutcome::Resolved(Arg::Object(actor));
    }
    let Some(room) = location_of(ctx.world, actor) else {
        ctx.notify("You cannot see anything here.");
        return FilterOutcome::Resolved(Arg::NotFound(word.to_string()));
    };

    let lowered = word.to_lowercase();
    let matches: Vec<ObjectId> = library::contents(ctx.world, room)
        .into_iter()
        .filter(|&id| {
            ctx.world
                .object(id)
                .and_then(mudwright_world::Object::name)
                .is_some_and(|name| name.to_lowercase().starts_with(&lowered))
        })
        .collect();

    match matches.as_slice() {
        [only] => FilterOutcome::Resolved(Arg::Object(*only)),
        [] => FilterOutcome::Resolved(Arg::NotFound(word.to_string())),
        _ => {
            ctx.notify(&format!("I don't know which \"{word}\" you mean."));
            FilterOutcome::Resolved(Arg::Ambiguous(word.to_string()))
        }
    }
}

fn help() -> Handler {
    simple(|ctx, _| {
        let commands = ctx.commands;
        let mut lines = vec!["Commands available to you:".to_string()];
        for command in commands.commands() {
            let patterns: Vec<String> = command
                .patterns
                .iter()
                .map(|p| p.source().to_string())
                .collect();
            lines.push(format!("{}: {}.", command.name, patterns.join(", ")));
            lines.push(format!("  {}", command.help));
        }
        for line in lines {
            ctx.message(&line);
        }
        Ok(Outcome::Completed)
    })
}

/// Binds a session to an object and picks its command set by privilege.
fn attach(ctx: &mut CommandCtx<'_>, object: ObjectId) -> Result<()> {
    bind_control(ctx.world, object, ctx.session.id())?;
    ctx.session.bind_object(object);
    let kind = if ctx.accounts.is_staff(object) {
        SetKind::Admin
    } else {
        SetKind::Main
    };
    ctx.session.set_kind(kind);
    Ok(())
}

fn login() -> Handler {
    simple(|ctx, args| {
        let username = args.text("username").unwrap_or_default().to_string();
        let password = args.text("password").unwrap_or_default().to_string();
        match ctx.accounts.authenticate(&username, &password) {
            Ok(object) if ctx.world.contains(object) => {
                attach(ctx, object)?;
                let greeting = format!("Welcome back, {}.", display_name(ctx, object));
                ctx.message(&greeting);
                look_here(ctx)?;
            }
            Ok(_) | Err(Error::UnknownUsername(_) | Error::BadPassword) => {
                ctx.message("Invalid username or password.");
            }
            Err(other) => return Err(other),
        }
        // Never record lines containing passwords.
        Ok(Outcome::CompletedDoNotRecord)
    })
}

fn create() -> Handler {
    simple(|ctx, args| {
        let username = args.text("username").unwrap_or_default().to_string();
        let password = args.text("password").unwrap_or_default().to_string();
        if username.is_empty() || password.is_empty() {
            ctx.message("You need both a username and a password.");
            return Ok(Outcome::CompletedDoNotRecord);
        }
        if ctx.accounts.contains(&username) {
            ctx.message("That username is taken.");
            return Ok(Outcome::CompletedDoNotRecord);
        }

        let archetype = ctx
            .world
            .define_archetype("Character", &["base", "located", "actor"])?;
        let start = ctx.world.index(index::ROOMS).next();
        let mut overrides: Vec<(&str, Value)> =
            vec![(fields::NAME, Value::from(username.clone()))];
        if let Some(room) = start {
            overrides.push((fields::LOCATION, Value::Ref(room)));
        }
        let object = ctx.world.create(&archetype, &overrides)?;

        // The first account on a fresh store runs the place.
        let staff = ctx.accounts.is_empty();
        ctx.accounts.add_account(&username, &password, object, staff)?;
        attach(ctx, object)?;
        ctx.message(&format!("Welcome, {username}."));
        look_here(ctx)?;
        Ok(Outcome::CompletedDoNotRecord)
    })
}

fn quit() -> Handler {
    simple(|ctx, _| {
        let id = ctx.session.id();
        ctx.out.close(id, "Goodbye.");
        Ok(Outcome::Completed)
    })
}

fn display_name(ctx: &CommandCtx<'_>, object: ObjectId) -> String {
    ctx.world
        .object(object)
        .map_or_else(|| format!("object {object}"), |o| o.full_name())
}

/// Shows the actor its surroundings: zone, room, description, and exits.
fn look_here(ctx: &mut CommandCtx<'_>) -> Result<()> {
    let Some(actor) = ctx.actor() else {
        ctx.message("You are not controlling anything.");
        return Ok(());
    };
    let Some(room_id) = location_of(ctx.world, actor) else {
        ctx.message("You are nowhere at all.");
        return Ok(());
    };

    let room = ctx.world.get(room_id)?;
    let room_name = room.name().unwrap_or("Nowhere").to_string();
    let description = room.describe().to_string();
    let zone_value = room.get(fields::ZONE).ok().cloned();
    let zone_name = zone_value
        .as_ref()
        .and_then(|value| ctx.world.resolve(value))
        .and_then(|zone| zone.name().map(str::to_string))
        .unwrap_or_else(|| "Nowhere".to_string());

    let mut exit_names: Vec<String> = Vec::new();
    for exit in library::exits_from(ctx.world, room_id) {
        if let Some(direction) = ctx
            .world
            .get_field(exit, fields::DIRECTION)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
        {
            exit_names.push(direction);
        }
    }

    ctx.message(&format!("[{zone_name}; {room_name}]"));
    ctx.message(&description);
    ctx.message(&format!("Exits: {}.", english_list(&exit_names, "none")));
    Ok(())
}

fn look() -> Handler {
    simple(|ctx, args: &Args| {
        match args.get("thing") {
            None => look_here(ctx)?,
            Some(Arg::Object(id)) => {
                let id = *id;
                let name = display_name(ctx, id);
                let description = ctx
                    .world
                    .object(id)
                    .map_or_else(|| "It is gone.".to_string(), |o| o.describe().to_string());
                ctx.message(&name);
                ctx.message(&description);
            }
            Some(Arg::NotFound(word)) => {
                let word = word.clone();
                ctx.message(&format!("I don't see \"{word}\" here."));
            }
            // The filter already told the player about the ambiguity.
            Some(_) => {}
        }
        Ok(Outcome::Completed)
    })
}

fn say() -> Handler {
    simple(|ctx, args| {
        let Some(actor) = ctx.actor() else {
            ctx.message("You have no voice here.");
            return Ok(Outcome::Completed);
        };
        let text = args.text("text").unwrap_or_default().to_string();
        let template = ctx
            .world
            .get_field(actor, fields::SAY_MSG)?
            .as_str()
            .unwrap_or(r#"%1N say%1s: "{text}""#)
            .to_string();
        let mut substitutions = BTreeMap::new();
        substitutions.insert("text".to_string(), text);
        ctx.do_social(actor, &template, &[], &substitutions);
        Ok(Outcome::Completed)
    })
}

/// Finds the exit leading out of a room in the named direction.
fn exit_towards(ctx: &CommandCtx<'_>, room: ObjectId, direction: &str) -> Option<ObjectId> {
    library::exits_from(ctx.world, room).into_iter().find(|&exit| {
        ctx.world
            .get_field(exit, fields::DIRECTION)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .is_some_and(|d| d == direction)
    })
}

fn go() -> Handler {
    simple(|ctx, args| {
        let Some(actor) = ctx.actor() else {
            ctx.message("You cannot move.");
            return Ok(Outcome::Completed);
        };
        let direction = args.text("dir").unwrap_or_default().to_string();
        let Some(room) = location_of(ctx.world, actor) else {
            ctx.message("You cannot go anywhere from here.");
            return Ok(Outcome::Completed);
        };
        let Some(exit) = exit_towards(ctx, room, &direction) else {
            ctx.message("You can't go that way.");
            return Ok(Outcome::Completed);
        };
        let destination = ctx.world.get_field(exit, fields::DESTINATION)?;
        let Some(dest) = ctx.world.resolve(&destination).map(mudwright_world::Object::id)
        else {
            // The far room was deleted out from under the exit.
            ctx.message("That exit leads nowhere.");
            return Ok(Outcome::Completed);
        };

        ctx.world.set_field(actor, fields::LOCATION, Value::Ref(dest))?;
        let walker = display_name(ctx, actor);
        for follower in library::followers(ctx.world, actor) {
            if location_of(ctx.world, follower) == Some(room) {
                ctx.world
                    .set_field(follower, fields::LOCATION, Value::Ref(dest))?;
                ctx.message_object(follower, &format!("You follow {walker} {direction}."));
            }
        }
        look_here(ctx)?;
        Ok(Outcome::Completed)
    })
}

fn follow() -> Handler {
    simple(|ctx, args: &Args| {
        let Some(actor) = ctx.actor() else {
            ctx.message("You cannot follow anyone.");
            return Ok(Outcome::Completed);
        };
        match args.get("thing") {
            Some(Arg::Object(target)) => {
                let target = *target;
                if target == actor {
                    ctx.message("You cannot follow yourself.");
                    return Ok(Outcome::Completed);
                }
                let current = ctx.world.get_field(actor, fields::FOLLOWING)?.as_ref_id();
                if current == Some(target) {
                    let name = display_name(ctx, target);
                    ctx.message(&format!("You are already following {name}."));
                    return Ok(Outcome::Completed);
                }
                stop_following(ctx, actor)?;
                ctx.world
                    .set_field(actor, fields::FOLLOWING, Value::Ref(target))?;
                let template = template_field(ctx, actor, "start_follow_msg");
                ctx.do_social(actor, &template, &[target], &BTreeMap::new());
            }
            Some(Arg::NotFound(word)) => {
                let word = word.clone();
                ctx.message(&format!("I don't see \"{word}\" here."));
            }
            _ => {}
        }
        Ok(Outcome::Completed)
    })
}

fn unfollow() -> Handler {
    simple(|ctx, _| {
        let Some(actor) = ctx.actor() else {
            ctx.message("You are not following anyone.");
            return Ok(Outcome::Completed);
        };
        if ctx.world.get_field(actor, fields::FOLLOWING)?.is_nil() {
            ctx.message("You are not following anyone.");
        } else {
            stop_following(ctx, actor)?;
        }
        Ok(Outcome::Completed)
    })
}

fn template_field(ctx: &CommandCtx<'_>, object: ObjectId, field: &str) -> String {
    ctx.world
        .get_field(object, field)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn stop_following(ctx: &mut CommandCtx<'_>, actor: ObjectId) -> Result<()> {
    let followed = ctx.world.get_field(actor, fields::FOLLOWING)?.as_ref_id();
    if let Some(followed) = followed {
        let template = template_field(ctx, actor, "stop_follow_msg");
        ctx.do_social(actor, &template, &[followed], &BTreeMap::new());
        ctx.world.set_field(actor, fields::FOLLOWING, Value::Nil)?;
    }
    Ok(())
}

fn dig() -> Handler {
    simple(|ctx, args| {
        let Some(actor) = ctx.actor() else {
            ctx.message("You cannot do that here.");
            return Ok(Outcome::Completed);
        };
        let Some(room) = location_of(ctx.world, actor) else {
            ctx.message("You cannot do that here.");
            return Ok(Outcome::Completed);
        };
        let direction = args.text("dir").unwrap_or_default().to_string();
        if exit_towards(ctx, room, &direction).is_some() {
            ctx.message(&format!("There is already an exit {direction}."));
            return Ok(Outcome::Completed);
        }

        let room_arch = ctx.world.define_archetype("Room", &["base", "room"])?;
        let exit_arch = ctx
            .world
            .define_archetype("Exit", &["base", "located", "exit"])?;

        let zone = ctx.world.get_field(room, fields::ZONE)?;
        let new_room = ctx.world.create(
            &room_arch,
            &[(fields::NAME, Value::from("New room")), (fields::ZONE, zone)],
        )?;
        ctx.world.create(
            &exit_arch,
            &[
                (fields::NAME, Value::from(direction.as_str())),
                (fields::LOCATION, Value::Ref(room)),
                (fields::DESTINATION, Value::Ref(new_room)),
                (fields::DIRECTION, Value::from(direction.as_str())),
            ],
        )?;

        let opposite = ctx
            .directions
            .get(&direction)
            .and_then(|d| ctx.directions.opposite(&d));
        if let Some(opposite) = opposite {
            ctx.world.create(
                &exit_arch,
                &[
                    (fields::NAME, Value::from(&*opposite.name)),
                    (fields::LOCATION, Value::Ref(new_room)),
                    (fields::DESTINATION, Value::Ref(room)),
                    (fields::DIRECTION, Value::from(&*opposite.name)),
                ],
            )?;
        }

        ctx.message(&format!("You dig {direction}."));
        Ok(Outcome::Completed)
    })
}

fn undig() -> Handler {
    simple(|ctx, args| {
        let Some(actor) = ctx.actor() else {
            ctx.message("You cannot do that here.");
            return Ok(Outcome::Completed);
        };
        let Some(room) = location_of(ctx.world, actor) else {
            ctx.message("You cannot do that here.");
            return Ok(Outcome::Completed);
        };
        let direction = args.text("dir").unwrap_or_default().to_string();
        let Some(exit) = exit_towards(ctx, room, &direction) else {
            ctx.message("There is no exit in that direction.");
            return Ok(Outcome::Completed);
        };

        if let Some(back) = library::other_side(ctx.world, exit) {
            let name = display_name(ctx, back);
            ctx.world.delete(back)?;
            ctx.message(&format!("Deleted {name}."));
        }
        let name = display_name(ctx, exit);
        ctx.world.delete(exit)?;
        ctx.message(&format!("Deleted {name}."));
        Ok(Outcome::Completed)
    })
}

fn save() -> Handler {
    simple(|ctx, _| {
        ctx.control.save_requested = true;
        ctx.message("Saving the world.");
        Ok(Outcome::Completed)
    })
}

/// The two-turn shutdown confirmation.
struct ShutdownConfirm {
    reason: String,
}

impl SuspendedTask for ShutdownConfirm {
    fn resume(&mut self, ctx: &mut CommandCtx<'_>, input: &str) -> Result<TaskStep> {
        if yes_or_no(input) {
            ctx.control.shutdown = Some(self.reason.clone());
            ctx.message("Shutting down.");
        } else {
            ctx.message("Cancelled.");
        }
        Ok(TaskStep::Completed(Outcome::Completed))
    }
}

fn shutdown() -> Handler {
    Arc::new(|ctx: &mut CommandCtx<'_>, args: &Args| {
        let reason = args
            .text("reason")
            .unwrap_or("No reason given")
            .to_string();
        ctx.message("Are you sure you want to shut down the server now?");
        Ok(Invocation::Await(Box::new(ShutdownConfirm { reason })))
    })
}
