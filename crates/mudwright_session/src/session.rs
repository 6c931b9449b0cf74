//! Per-session state.

use std::fmt;

use mudwright_foundation::ObjectId;

use crate::task::SuspendedTask;

/// Identifier for a connected session, assigned by the transport.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a session identifier from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session {}", self.0)
    }
}

/// Which command set a session currently resolves against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SetKind {
    /// Unauthenticated pre-session commands.
    #[default]
    Login,
    /// Ordinary in-world commands.
    Main,
    /// In-world plus building commands.
    Builder,
    /// Everything, including administration.
    Admin,
}

/// The session state machine's observable state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No pending multi-turn command.
    Idle,
    /// A command handler is paused awaiting the next line.
    AwaitingInput,
}

/// One connected session: command-set selection, the object it controls, and
/// at most one paused task.
///
/// While a task is paused, every input line is routed to it; a new top-level
/// command cannot start until the task completes or the session disconnects.
pub struct Session {
    id: SessionId,
    kind: SetKind,
    object: Option<ObjectId>,
    last_command: Option<String>,
    task: Option<Box<dyn SuspendedTask>>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("object", &self.object)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates a fresh session in the login command set.
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            kind: SetKind::Login,
            object: None,
            last_command: None,
            task: None,
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the active command-set kind.
    #[must_use]
    pub const fn kind(&self) -> SetKind {
        self.kind
    }

    /// Switches the active command set.
    pub fn set_kind(&mut self, kind: SetKind) {
        self.kind = kind;
    }

    /// Returns the object this session controls, if any.
    #[must_use]
    pub const fn object(&self) -> Option<ObjectId> {
        self.object
    }

    /// Binds the session to a controlling object.
    pub fn bind_object(&mut self, object: ObjectId) {
        self.object = Some(object);
    }

    /// Detaches the controlling object.
    pub fn unbind_object(&mut self) -> Option<ObjectId> {
        self.object.take()
    }

    /// Returns the last recorded command line.
    #[must_use]
    pub fn last_command(&self) -> Option<&str> {
        self.last_command.as_deref()
    }

    /// Records a command line (skipped for do-not-record outcomes).
    pub fn record_command(&mut self, line: &str) {
        self.last_command = Some(line.to_string());
    }

    /// Returns the observable state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        if self.task.is_some() {
            SessionState::AwaitingInput
        } else {
            SessionState::Idle
        }
    }

    /// Takes the paused task, leaving the session idle.
    pub fn take_task(&mut self) -> Option<Box<dyn SuspendedTask>> {
        self.task.take()
    }

    /// Parks a task, entering the awaiting-input state.
    pub fn store_task(&mut self, task: Box<dyn SuspendedTask>) {
        self.task = Some(task);
    }
}
