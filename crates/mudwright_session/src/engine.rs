//! The interaction engine: the session state machine over the world.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mudwright_foundation::Error;
use mudwright_parser::MatchContext;
use mudwright_world::{DirectionRegistry, World};

use crate::accounts::{AccountStore, PlaintextHasher};
use crate::narrate::{Narrator, PlainNarrator};
use crate::session::{Session, SessionId, SessionState, SetKind};
use crate::task::{CommandCtx, Commands, Invocation, Outcome, TaskStep, unbind_control};
use crate::util::english_list;

/// Outbound seam to the network layer.
///
/// The transport owns connection lifecycle; the engine only sends text and
/// may ask for a connection to be closed.
pub trait Transport {
    /// Delivers text to a session.
    fn send(&mut self, session: SessionId, text: &str);
    /// Asks the transport to close a session, with a parting reason.
    fn close(&mut self, session: SessionId, reason: &str);
}

/// Requests raised by handlers for the driver loop to act on between turns.
#[derive(Clone, Debug, Default)]
pub struct EngineControl {
    /// A shutdown was requested, with the given reason.
    pub shutdown: Option<String>,
    /// A snapshot save was requested.
    pub save_requested: bool,
}

/// The four command surfaces, one per [`SetKind`].
pub struct CommandSets {
    /// Unauthenticated pre-session commands.
    pub login: Commands,
    /// Ordinary in-world commands.
    pub main: Commands,
    /// In-world plus building commands.
    pub builder: Commands,
    /// Everything, including administration.
    pub admin: Commands,
}

impl CommandSets {
    fn get(&self, kind: SetKind) -> &Commands {
        match kind {
            SetKind::Login => &self.login,
            SetKind::Main => &self.main,
            SetKind::Builder => &self.builder,
            SetKind::Admin => &self.admin,
        }
    }
}

impl fmt::Debug for CommandSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSets").finish_non_exhaustive()
    }
}

/// Drives command execution for every connected session.
///
/// All sessions multiplex onto one logical thread of control: a handler runs
/// to completion or to its next suspension point, and no other session's
/// input is processed in between, so the world needs no internal locking.
/// Snapshots must be taken between calls into the engine, never from a
/// concurrent thread.
pub struct InteractionEngine {
    world: World,
    sessions: BTreeMap<SessionId, Session>,
    sets: CommandSets,
    accounts: AccountStore,
    directions: DirectionRegistry,
    narrator: Box<dyn Narrator>,
    control: EngineControl,
    welcome_msg: String,
    error_msg: String,
}

impl fmt::Debug for InteractionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionEngine")
            .field("sessions", &self.sessions.len())
            .field("objects", &self.world.len())
            .finish_non_exhaustive()
    }
}

impl InteractionEngine {
    /// Creates an engine over a world and command surfaces.
    ///
    /// Defaults: compass directions, the plain narrator, and an empty
    /// account store with the plaintext hasher (suitable for tests and local
    /// development; supply a real hasher via [`Self::with_accounts`]).
    #[must_use]
    pub fn new(world: World, sets: CommandSets) -> Self {
        Self {
            world,
            sessions: BTreeMap::new(),
            sets,
            accounts: AccountStore::new(Box::new(PlaintextHasher)),
            directions: DirectionRegistry::with_compass(),
            narrator: Box::new(PlainNarrator),
            control: EngineControl::default(),
            welcome_msg: "Welcome. Type help for a list of commands.".to_string(),
            error_msg: "While executing your command an error occurred.".to_string(),
        }
    }

    /// Replaces the account store.
    #[must_use]
    pub fn with_accounts(mut self, accounts: AccountStore) -> Self {
        self.accounts = accounts;
        self
    }

    /// Replaces the narrator.
    #[must_use]
    pub fn with_narrator(mut self, narrator: Box<dyn Narrator>) -> Self {
        self.narrator = narrator;
        self
    }

    /// Replaces the direction registry.
    #[must_use]
    pub fn with_directions(mut self, directions: DirectionRegistry) -> Self {
        self.directions = directions;
        self
    }

    /// Sets the greeting sent on connect.
    #[must_use]
    pub fn with_welcome_msg(mut self, text: &str) -> Self {
        self.welcome_msg = text.to_string();
        self
    }

    /// Returns the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Returns the world mutably. Only safe to use between turns.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Returns the account store.
    #[must_use]
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Returns the account store mutably.
    pub fn accounts_mut(&mut self) -> &mut AccountStore {
        &mut self.accounts
    }

    /// Returns a session.
    #[must_use]
    pub fn session(&self, id: SessionId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Returns a session's observable state.
    #[must_use]
    pub fn session_state(&self, id: SessionId) -> Option<SessionState> {
        self.sessions.get(&id).map(Session::state)
    }

    /// Takes a pending save request, clearing it.
    pub fn take_save_request(&mut self) -> bool {
        std::mem::take(&mut self.control.save_requested)
    }

    /// Takes a pending shutdown request, clearing it.
    pub fn take_shutdown(&mut self) -> Option<String> {
        self.control.shutdown.take()
    }

    /// Sends text to every connected session.
    pub fn broadcast(&mut self, text: &str, out: &mut dyn Transport) {
        for id in self.sessions.keys() {
            out.send(*id, text);
        }
    }

    /// Registers a new connection and greets it.
    pub fn connect(&mut self, id: SessionId, out: &mut dyn Transport) {
        tracing::info!(%id, "connected");
        if self.sessions.insert(id, Session::new(id)).is_some() {
            tracing::warn!(%id, "replaced an existing session");
        }
        out.send(id, &self.welcome_msg);
    }

    /// Handles a disconnect reported by the transport.
    ///
    /// Any paused task is discarded without running further hooks, and the
    /// controlling object (if any) is detached from the session.
    pub fn disconnect(&mut self, id: SessionId) {
        let Some(mut session) = self.sessions.remove(&id) else {
            return;
        };
        drop(session.take_task());
        if let Some(object) = session.unbind_object() {
            unbind_control(&mut self.world, object);
        }
        tracing::info!(%id, "disconnected");
    }

    /// Handles one line of input from a session.
    ///
    /// If the session has a paused task, the line is delivered as its
    /// resumption value; otherwise the line is matched against the session's
    /// active command set and the handler invoked. Handler faults are logged
    /// and surfaced as a generic message (with detail for staff); the
    /// session always returns to a consistent state.
    pub fn line(&mut self, id: SessionId, line: &str, out: &mut dyn Transport) {
        let Self {
            world,
            sessions,
            sets,
            accounts,
            directions,
            narrator,
            control,
            error_msg,
            ..
        } = self;

        let Some(session) = sessions.get_mut(&id) else {
            tracing::warn!(%id, "line from unknown session");
            return;
        };
        let set = sets.get(session.kind());
        let staff = session
            .object()
            .is_some_and(|object| accounts.is_staff(object));

        // A paused task gets every line until it completes.
        if let Some(mut task) = session.take_task() {
            let step = {
                let mut ctx = CommandCtx {
                    world: &mut *world,
                    session: &mut *session,
                    accounts: &mut *accounts,
                    directions,
                    narrator: &**narrator,
                    control: &mut *control,
                    out: &mut *out,
                    commands: set,
                };
                task.resume(&mut ctx, line)
            };
            match step {
                Ok(TaskStep::Suspended) => session.store_task(task),
                Ok(TaskStep::Completed(_)) => {}
                Err(error) => Self::report_fault(out, id, error_msg, staff, line, &error),
            }
            return;
        }

        if line.trim().is_empty() {
            return;
        }

        let resolved = {
            let mut sink = |text: &str| out.send(id, text);
            let mut mctx =
                MatchContext::new(&*world, session.object(), staff, directions, &mut sink);
            set.resolve(&mut mctx, line)
                .map(|r| (Arc::clone(r.handler), r.args))
        };

        match resolved {
            Err(Error::NoMatch { tried }) => {
                out.send(id, "No command found.");
                if !tried.is_empty() {
                    out.send(
                        id,
                        &format!(
                            "Commands you may have meant to try: {}.",
                            english_list(&tried, "none")
                        ),
                    );
                }
            }
            Err(error) => Self::report_fault(out, id, error_msg, staff, line, &error),
            Ok((handler, args)) => {
                let result = {
                    let mut ctx = CommandCtx {
                        world: &mut *world,
                        session: &mut *session,
                        accounts: &mut *accounts,
                        directions,
                        narrator: &**narrator,
                        control: &mut *control,
                        out: &mut *out,
                        commands: set,
                    };
                    handler(&mut ctx, &args)
                };
                match result {
                    Ok(Invocation::Done(Outcome::Completed)) => session.record_command(line),
                    Ok(Invocation::Done(Outcome::CompletedDoNotRecord)) => {}
                    Ok(Invocation::Await(task)) => {
                        session.record_command(line);
                        session.store_task(task);
                    }
                    Err(error) => Self::report_fault(out, id, error_msg, staff, line, &error),
                }
            }
        }
    }

    fn report_fault(
        out: &mut dyn Transport,
        id: SessionId,
        error_msg: &str,
        staff: bool,
        line: &str,
        error: &Error,
    ) {
        tracing::error!(%id, command = line, %error, "command handler fault");
        out.send(id, error_msg);
        if staff {
            out.send(id, &error.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc as StdArc;

    use super::*;
    use crate::task::{Handler, SuspendedTask, simple};
    use mudwright_foundation::Result;
    use mudwright_parser::Args;
    use mudwright_world::{TraitRegistry, library};

    /// Transport that records everything per session.
    #[derive(Default)]
    struct Recorder {
        sent: Vec<(SessionId, String)>,
        closed: Vec<SessionId>,
    }

    impl Transport for Recorder {
        fn send(&mut self, session: SessionId, text: &str) {
            self.sent.push((session, text.to_string()));
        }

        fn close(&mut self, session: SessionId, reason: &str) {
            self.sent.push((session, reason.to_string()));
            self.closed.push(session);
        }
    }

    impl Recorder {
        fn texts(&self) -> Vec<&str> {
            self.sent.iter().map(|(_, t)| t.as_str()).collect()
        }
    }

    /// A two-turn command: asks a question, echoes the answer.
    struct AskTask;

    impl SuspendedTask for AskTask {
        fn resume(&mut self, ctx: &mut CommandCtx<'_>, input: &str) -> Result<TaskStep> {
            ctx.message(&format!("You answered: {input}"));
            Ok(TaskStep::Completed(Outcome::Completed))
        }
    }

    fn test_sets() -> CommandSets {
        let mut set: Commands = Commands::new();
        set.command(
            "echo",
            "Echo the argument",
            &["echo <thing>"],
            simple(|ctx, args: &Args| {
                let thing = args.text("thing").unwrap_or_default().to_string();
                ctx.message(&thing);
                Ok(Outcome::Completed)
            }),
        )
        .unwrap();
        set.command(
            "whisper",
            "Unrecorded",
            &["whisper <thing>"],
            simple(|_, _| Ok(Outcome::CompletedDoNotRecord)),
        )
        .unwrap();
        let ask: Handler = StdArc::new(|ctx: &mut CommandCtx<'_>, _: &Args| {
            ctx.message("Well?");
            Ok(Invocation::Await(Box::new(AskTask)))
        });
        set.command("ask", "Two-turn question", &["ask"], ask).unwrap();
        set.command(
            "explode",
            "Always faults",
            &["explode"],
            simple(|_, _| Err(Error::Internal("boom".into()))),
        )
        .unwrap();

        CommandSets {
            login: set.clone(),
            main: set.clone(),
            builder: set.clone(),
            admin: set,
        }
    }

    fn test_engine() -> InteractionEngine {
        let mut registry = TraitRegistry::new();
        library::install(&mut registry).unwrap();
        let world = World::new(StdArc::new(registry));
        InteractionEngine::new(world, test_sets())
    }

    #[test]
    fn connect_greets() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);
        assert_eq!(out.sent.len(), 1);
        assert_eq!(out.sent[0].0, id);
    }

    #[test]
    fn simple_command_runs_and_is_recorded() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);

        engine.line(id, "echo hello", &mut out);
        assert!(out.texts().contains(&"hello"));
        assert_eq!(engine.session(id).unwrap().last_command(), Some("echo hello"));
        assert_eq!(engine.session_state(id), Some(SessionState::Idle));
    }

    #[test]
    fn do_not_record_outcome_skips_history() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);

        engine.line(id, "echo hello", &mut out);
        engine.line(id, "whisper secret", &mut out);
        assert_eq!(engine.session(id).unwrap().last_command(), Some("echo hello"));
    }

    #[test]
    fn suspension_round_trip() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);

        // First line invokes the command and suspends.
        engine.line(id, "ask", &mut out);
        assert_eq!(engine.session_state(id), Some(SessionState::AwaitingInput));

        // The second line is delivered to the paused task, even though it
        // would otherwise match a command.
        engine.line(id, "echo hijack", &mut out);
        assert!(out.texts().contains(&"You answered: echo hijack"));
        assert_eq!(engine.session_state(id), Some(SessionState::Idle));

        // A third line matches fresh against the command set.
        engine.line(id, "echo after", &mut out);
        assert!(out.texts().contains(&"after"));
    }

    #[test]
    fn empty_line_reaches_a_paused_task_but_not_the_matcher() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);

        let before = out.sent.len();
        engine.line(id, "   ", &mut out);
        assert_eq!(out.sent.len(), before);

        engine.line(id, "ask", &mut out);
        engine.line(id, "", &mut out);
        assert!(out.texts().contains(&"You answered: "));
    }

    #[test]
    fn no_match_feedback_with_candidates() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);

        engine.line(id, "echo", &mut out);
        assert!(out.texts().contains(&"No command found."));
        assert!(
            out.texts()
                .iter()
                .any(|t| t.contains("meant to try: echo"))
        );
        assert_eq!(engine.session_state(id), Some(SessionState::Idle));
    }

    #[test]
    fn handler_fault_recovers_to_idle() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);

        engine.line(id, "explode", &mut out);
        assert!(
            out.texts()
                .contains(&"While executing your command an error occurred.")
        );
        // No staff detail for an unprivileged session.
        assert!(!out.texts().iter().any(|t| t.contains("boom")));
        assert_eq!(engine.session_state(id), Some(SessionState::Idle));

        // The engine still works afterwards.
        engine.line(id, "echo ok", &mut out);
        assert!(out.texts().contains(&"ok"));
    }

    #[test]
    fn disconnect_discards_paused_task() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let id = SessionId::from_raw(1);
        engine.connect(id, &mut out);

        engine.line(id, "ask", &mut out);
        engine.disconnect(id);
        assert!(engine.session(id).is_none());

        // Lines from a gone session are ignored.
        let before = out.sent.len();
        engine.line(id, "echo ghost", &mut out);
        assert_eq!(out.sent.len(), before);
    }

    #[test]
    fn sessions_are_isolated() {
        let mut engine = test_engine();
        let mut out = Recorder::default();
        let a = SessionId::from_raw(1);
        let b = SessionId::from_raw(2);
        engine.connect(a, &mut out);
        engine.connect(b, &mut out);

        engine.line(a, "ask", &mut out);
        assert_eq!(engine.session_state(a), Some(SessionState::AwaitingInput));
        assert_eq!(engine.session_state(b), Some(SessionState::Idle));

        // Session b's input goes to the matcher, not a's task.
        engine.line(b, "echo mine", &mut out);
        assert!(out.sent.contains(&(b, "mine".to_string())));
        assert_eq!(engine.session_state(a), Some(SessionState::AwaitingInput));
    }
}
