//! Suspendable command execution.
//!
//! A command handler either completes in one step or returns a resumable
//! task that the session state machine drives with subsequent input lines.
//! Outcomes are a tagged result type rather than control-flow signals: "do
//! not record this input" is a variant, not an exception, and faults travel
//! through `Result`.

use std::collections::BTreeMap;
use std::sync::Arc;

use mudwright_foundation::{ObjectId, Result, Value};
use mudwright_parser::{Args, CommandSet};
use mudwright_world::library::{self, fields};
use mudwright_world::{DirectionRegistry, World};

use crate::accounts::AccountStore;
use crate::engine::{EngineControl, Transport};
use crate::narrate::Narrator;
use crate::session::{Session, SessionId};

/// How a command (or a resumed task) finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Finished normally; the input line is recorded as the last command.
    Completed,
    /// Finished normally, but the input line must not be recorded
    /// (passwords and the like).
    CompletedDoNotRecord,
}

/// The result of driving a task one step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskStep {
    /// The task paused again; the session stays awaiting input.
    Suspended,
    /// The task finished; the session returns to idle.
    Completed(Outcome),
}

/// A command execution paused mid-flight, waiting for the next input line.
///
/// Cancellation is handler-defined: a task that wants to be abortable must
/// recognise a sentinel input itself and complete early.
pub trait SuspendedTask {
    /// Delivers the next input line to the paused task.
    ///
    /// # Errors
    ///
    /// A returned error is a handler fault; the engine logs it, notifies the
    /// caller, and drops the task.
    fn resume(&mut self, ctx: &mut CommandCtx<'_>, input: &str) -> Result<TaskStep>;
}

/// What invoking a handler produced.
pub enum Invocation {
    /// The handler ran to completion in one step.
    Done(Outcome),
    /// The handler paused at its first suspension point.
    Await(Box<dyn SuspendedTask>),
}

/// A command handler.
pub type Handler = Arc<dyn Fn(&mut CommandCtx<'_>, &Args) -> Result<Invocation>>;

/// A command set whose payloads are [`Handler`]s.
pub type Commands = CommandSet<Handler>;

/// Wraps a single-step handler function as a [`Handler`].
pub fn simple(f: impl Fn(&mut CommandCtx<'_>, &Args) -> Result<Outcome> + 'static) -> Handler {
    Arc::new(move |ctx, args| f(ctx, args).map(Invocation::Done))
}

/// Ambient context passed to handlers and resumed tasks.
///
/// Handlers run on the single logical thread of control; they hold the world
/// mutably and run to completion or to a suspension point without
/// preemption.
pub struct CommandCtx<'a> {
    /// The authoritative world.
    pub world: &'a mut World,
    /// The session that issued the line.
    pub session: &'a mut Session,
    /// The account store.
    pub accounts: &'a mut AccountStore,
    /// Direction vocabulary.
    pub directions: &'a DirectionRegistry,
    /// The narration collaborator.
    pub narrator: &'a dyn Narrator,
    /// Requests from handlers to the driver loop (save, shutdown).
    pub control: &'a mut EngineControl,
    /// The outbound transport.
    pub out: &'a mut dyn Transport,
    /// The command set the line resolved against, for help listings.
    pub commands: &'a Commands,
}

impl CommandCtx<'_> {
    /// Sends text to this session.
    pub fn message(&mut self, text: &str) {
        let id = self.session.id();
        self.out.send(id, text);
    }

    /// Sends text to the session controlling the given object, if any.
    ///
    /// Returns false when the object is uncontrolled or not live.
    pub fn message_object(&mut self, object: ObjectId, text: &str) -> bool {
        let Some(target) = controlling_session(self.world, object) else {
            return false;
        };
        self.out.send(target, text);
        true
    }

    /// Returns the object this session controls.
    #[must_use]
    pub fn actor(&self) -> Option<ObjectId> {
        self.session.object()
    }

    /// Returns true if this session's account holds elevated privilege.
    #[must_use]
    pub fn is_staff(&self) -> bool {
        self.session
            .object()
            .is_some_and(|object| self.accounts.is_staff(object))
    }

    /// Performs a social: renders the template for the actor plus any other
    /// participants, messages each their own string, and shows bystanders in
    /// the actor's location the observer string.
    pub fn do_social(
        &mut self,
        actor: ObjectId,
        template: &str,
        others: &[ObjectId],
        substitutions: &BTreeMap<String, String>,
    ) {
        let mut participants = vec![actor];
        participants.extend_from_slice(others);

        let narration = self
            .narrator
            .render(template, &participants, self.world, substitutions);

        for (index, &participant) in participants.iter().enumerate() {
            if let Some(text) = narration.participants.get(index) {
                self.message_object(participant, text);
            }
        }

        let bystanders: Vec<ObjectId> = location_of(self.world, actor)
            .map(|room| library::contents(self.world, room))
            .unwrap_or_default()
            .into_iter()
            .filter(|id| !participants.contains(id))
            .collect();
        for bystander in bystanders {
            self.message_object(bystander, &narration.observer);
        }
    }
}

/// The location an object occupies, if it has one and it is live.
#[must_use]
pub fn location_of(world: &World, object: ObjectId) -> Option<ObjectId> {
    let location = world.object(object)?.get(fields::LOCATION).ok()?.clone();
    world.resolve(&location).map(mudwright_world::Object::id)
}

/// The session currently controlling an object, if any.
#[must_use]
pub fn controlling_session(world: &World, object: ObjectId) -> Option<SessionId> {
    let raw = world.object(object)?.get(fields::SESSION).ok()?.as_int()?;
    u64::try_from(raw).ok().map(SessionId::from_raw)
}

/// Binds an object to a session, so messages can reach it.
pub fn bind_control(world: &mut World, object: ObjectId, session: SessionId) -> Result<()> {
    let raw = i64::try_from(session.raw()).unwrap_or(i64::MAX);
    world.set_field(object, fields::SESSION, Value::Int(raw))
}

/// Detaches an object from its session.
pub fn unbind_control(world: &mut World, object: ObjectId) {
    let _ = world.set_field(object, fields::SESSION, Value::Nil);
}
