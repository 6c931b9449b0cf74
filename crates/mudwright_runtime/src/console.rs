//! A local single-session console driver.
//!
//! Runs one session over stdin/stdout with line editing. This is the
//! development transport; a networked deployment supplies its own transport
//! collaborator and drives the engine the same way. Snapshots happen only
//! between turns, when no handler is mid-mutation.

use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;

use mudwright_foundation::{Error, Result};
use mudwright_session::{InteractionEngine, SessionId, Transport};

use crate::persist;

/// How many turns pass between periodic snapshots.
const SAVE_INTERVAL: u32 = 50;

/// Result of reading a line from the editor.
#[derive(Debug)]
pub enum ReadResult {
    /// A line was successfully read.
    Line(String),
    /// User pressed Ctrl+C.
    Interrupted,
    /// User pressed Ctrl+D (EOF).
    Eof,
}

/// Abstraction over line editing, so the console is testable without a
/// terminal.
pub trait LineEditor {
    /// Reads a line with the given prompt.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the terminal fails.
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult>;

    /// Adds a line to history.
    fn add_history(&mut self, line: &str);
}

/// Line editor implementation using rustyline.
pub struct RustylineEditor {
    editor: Editor<(), DefaultHistory>,
}

impl RustylineEditor {
    /// Creates a new rustyline-based editor.
    ///
    /// # Errors
    ///
    /// Returns an error if rustyline initialization fails.
    pub fn new() -> Result<Self> {
        let editor = Editor::new().map_err(|e| Error::Internal(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl LineEditor for RustylineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<ReadResult> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadResult::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadResult::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadResult::Eof),
            Err(e) => Err(Error::Internal(e.to_string())),
        }
    }

    fn add_history(&mut self, line: &str) {
        let _ = self.editor.add_history_entry(line);
    }
}

/// Transport that prints to stdout and remembers when the engine asked for
/// the connection to close.
#[derive(Debug, Default)]
struct ConsoleTransport {
    closed: bool,
}

impl Transport for ConsoleTransport {
    fn send(&mut self, _session: SessionId, text: &str) {
        println!("{text}");
    }

    fn close(&mut self, _session: SessionId, reason: &str) {
        println!("{reason}");
        self.closed = true;
    }
}

/// The console driver: one engine, one session, one terminal.
pub struct Console<E: LineEditor = RustylineEditor> {
    engine: InteractionEngine,
    editor: E,
    snapshot_path: PathBuf,
    accounts_path: PathBuf,
    prompt: String,
}

impl Console<RustylineEditor> {
    /// Creates a console with the default rustyline editor.
    ///
    /// # Errors
    ///
    /// Returns an error if the editor fails to initialize.
    pub fn new(
        engine: InteractionEngine,
        snapshot_path: PathBuf,
        accounts_path: PathBuf,
    ) -> Result<Self> {
        let editor = RustylineEditor::new()?;
        Ok(Self::with_editor(engine, editor, snapshot_path, accounts_path))
    }
}

impl<E: LineEditor> Console<E> {
    /// Creates a console with the given editor.
    pub fn with_editor(
        engine: InteractionEngine,
        editor: E,
        snapshot_path: PathBuf,
        accounts_path: PathBuf,
    ) -> Self {
        Self {
            engine,
            editor,
            snapshot_path,
            accounts_path,
            prompt: "> ".to_string(),
        }
    }

    /// Returns the engine.
    #[must_use]
    pub fn engine(&self) -> &InteractionEngine {
        &self.engine
    }

    /// Runs the console loop until the session closes, the player hits EOF,
    /// or a shutdown is requested. Saves the world on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or saving fails.
    pub fn run(&mut self) -> Result<()> {
        let session = SessionId::from_raw(1);
        let mut transport = ConsoleTransport::default();
        self.engine.connect(session, &mut transport);

        let mut turns = 0u32;
        loop {
            if transport.closed {
                break;
            }
            let line = match self.editor.read_line(&self.prompt)? {
                ReadResult::Line(line) => line,
                ReadResult::Interrupted => continue,
                ReadResult::Eof => break,
            };
            if !line.trim().is_empty() {
                self.editor.add_history(&line);
            }
            self.engine.line(session, &line, &mut transport);

            // Between turns no handler is mid-mutation, so this is the safe
            // point for snapshots and shutdown.
            if self.engine.take_save_request() {
                self.save()?;
            }
            if let Some(reason) = self.engine.take_shutdown() {
                let notice = format!("The server is shutting down:\n{reason}");
                self.engine.broadcast(&notice, &mut transport);
                break;
            }
            turns += 1;
            if turns % SAVE_INTERVAL == 0 {
                self.save()?;
            }
        }

        self.engine.disconnect(session);
        self.save()
    }

    fn save(&self) -> Result<()> {
        persist::save_snapshot(&self.engine.world().snapshot(), &self.snapshot_path)?;
        persist::save_accounts(self.engine.accounts(), &self.accounts_path)?;
        tracing::info!(
            objects = self.engine.world().len(),
            accounts = self.engine.accounts().len(),
            "saved world and accounts"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use mudwright_session::commands;
    use mudwright_world::{TraitRegistry, World, library};

    /// Editor fed from a script; EOF when it runs out.
    struct ScriptedEditor {
        lines: Vec<String>,
    }

    impl ScriptedEditor {
        fn new(lines: &[&str]) -> Self {
            let mut lines: Vec<String> = lines.iter().map(|s| (*s).to_string()).collect();
            lines.reverse();
            Self { lines }
        }
    }

    impl LineEditor for ScriptedEditor {
        fn read_line(&mut self, _prompt: &str) -> Result<ReadResult> {
            Ok(self
                .lines
                .pop()
                .map_or(ReadResult::Eof, ReadResult::Line))
        }

        fn add_history(&mut self, _line: &str) {}
    }

    fn test_engine() -> InteractionEngine {
        let mut registry = TraitRegistry::new();
        library::install(&mut registry).unwrap();
        let mut world = World::new(Arc::new(registry));
        let zone_arch = world.define_archetype("Zone", &["base", "zone"]).unwrap();
        let room_arch = world.define_archetype("Room", &["base", "room"]).unwrap();
        let zone = world.create(&zone_arch, &[("name", "Zone".into())]).unwrap();
        world
            .create(
                &room_arch,
                &[
                    ("name", "Room".into()),
                    ("zone", mudwright_foundation::Value::Ref(zone)),
                ],
            )
            .unwrap();
        InteractionEngine::new(world, commands::default_sets().unwrap())
    }

    #[test]
    fn scripted_session_saves_on_exit() {
        let dir = std::env::temp_dir();
        let snapshot_path = dir.join("mudwright_console_world.json");
        let accounts_path = dir.join("mudwright_console_accounts.json");
        let _ = std::fs::remove_file(&snapshot_path);
        let _ = std::fs::remove_file(&accounts_path);

        let editor = ScriptedEditor::new(&["create polly cracker", "@dig north", "quit"]);
        let mut console = Console::with_editor(
            test_engine(),
            editor,
            snapshot_path.clone(),
            accounts_path.clone(),
        );
        console.run().expect("console run failed");

        let snapshot = persist::load_snapshot(&snapshot_path).expect("snapshot written");
        // zone + room + character + dug room + two exits
        assert_eq!(snapshot.objects.len(), 6);

        let mut accounts =
            mudwright_session::AccountStore::new(Box::new(mudwright_session::PlaintextHasher));
        persist::load_accounts(&mut accounts, &accounts_path).expect("accounts written");
        assert!(accounts.contains("polly"));

        let _ = std::fs::remove_file(&snapshot_path);
        let _ = std::fs::remove_file(&accounts_path);
    }

    #[test]
    fn shutdown_request_ends_the_loop() {
        let dir = std::env::temp_dir();
        let snapshot_path = dir.join("mudwright_console_shutdown_world.json");
        let accounts_path = dir.join("mudwright_console_shutdown_accounts.json");

        let editor = ScriptedEditor::new(&[
            "create polly cracker",
            "@shutdown closing time",
            "yes",
            "say never reached",
        ]);
        let mut console = Console::with_editor(
            test_engine(),
            editor,
            snapshot_path.clone(),
            accounts_path.clone(),
        );
        console.run().expect("console run failed");

        // The loop stopped at the shutdown; the trailing line was not read.
        assert!(console.engine().session(SessionId::from_raw(1)).is_none());

        let _ = std::fs::remove_file(&snapshot_path);
        let _ = std::fs::remove_file(&accounts_path);
    }
}
