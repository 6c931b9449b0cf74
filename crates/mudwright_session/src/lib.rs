//! The interaction engine for Mudwright.
//!
//! This crate provides:
//! - [`InteractionEngine`] - The per-session command state machine
//! - [`SuspendedTask`]/[`Outcome`] - Suspendable command execution
//! - [`commands`] - The default login/main/builder/admin command surfaces
//! - [`Menu`] - Menus driven as suspendable tasks
//! - [`AccountStore`] - Usernames, password hashes, controlled objects
//! - [`Narrator`]/[`Transport`] - Seams to the narration and network
//!   collaborators

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod accounts;
pub mod commands;
mod engine;
mod menu;
mod narrate;
mod session;
mod task;
pub mod util;

pub use accounts::{Account, AccountStore, PasswordHasher, PlaintextHasher};
pub use engine::{CommandSets, EngineControl, InteractionEngine, Transport};
pub use menu::{Menu, MenuAction, MenuSignal};
pub use narrate::{Narration, Narrator, PlainNarrator};
pub use session::{Session, SessionId, SessionState, SetKind};
pub use task::{
    CommandCtx, Commands, Handler, Invocation, Outcome, SuspendedTask, TaskStep, bind_control,
    controlling_session, location_of, simple, unbind_control,
};
