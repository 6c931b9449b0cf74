//! The command registry and line matcher.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use mudwright_foundation::{Error, ObjectId, Result};
use mudwright_world::{DirectionRegistry, World};

use crate::args::{Arg, Args};
use crate::pattern::{Pattern, PatternToken, tokenize};

/// Ambient context available to filters while a line is being matched.
pub struct MatchContext<'a> {
    /// The world, read-only during matching.
    pub world: &'a World,
    /// The acting object, if the session controls one.
    pub actor: Option<ObjectId>,
    /// Whether the session holds elevated privilege.
    pub staff: bool,
    /// Direction vocabulary.
    pub directions: &'a DirectionRegistry,
    /// Sink for filter feedback (e.g. "which one do you mean?").
    sink: &'a mut dyn FnMut(&str),
}

impl<'a> MatchContext<'a> {
    /// Creates a match context.
    pub fn new(
        world: &'a World,
        actor: Option<ObjectId>,
        staff: bool,
        directions: &'a DirectionRegistry,
        sink: &'a mut dyn FnMut(&str),
    ) -> Self {
        Self {
            world,
            actor,
            staff,
            directions,
            sink,
        }
    }

    /// Sends feedback to the session that issued the line.
    pub fn notify(&mut self, text: &str) {
        (self.sink)(text);
    }
}

impl fmt::Debug for MatchContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchContext")
            .field("actor", &self.actor)
            .field("staff", &self.staff)
            .finish_non_exhaustive()
    }
}

/// The verdict of a filter on one word.
#[derive(Clone, Debug)]
pub enum FilterOutcome {
    /// The word resolved; bind this argument and keep matching.
    Resolved(Arg),
    /// The word does not fit this placeholder; try the next pattern.
    Reject,
}

/// A named placeholder filter.
pub type Filter = Arc<dyn Fn(&mut MatchContext<'_>, &str) -> FilterOutcome>;

/// A registered command: a name, a help line, and one or more patterns
/// sharing an opaque handler payload.
#[derive(Clone)]
pub struct Command<H> {
    /// Command name (shared by overloads and aliases).
    pub name: String,
    /// One-line help text.
    pub help: String,
    /// Patterns, tried in registration order.
    pub patterns: Vec<Pattern>,
    /// The handler payload invoked by the interaction engine.
    pub handler: H,
}

impl<H> fmt::Debug for Command<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

/// A successfully resolved line.
#[derive(Debug)]
pub struct Resolved<'a, H> {
    /// The matched command's name.
    pub name: &'a str,
    /// The matched command's handler payload.
    pub handler: &'a H,
    /// The bound arguments.
    pub args: Args,
}

/// An ordered registry of commands with their patterns and filters.
///
/// Patterns are tried in registration order; the first whose literal tokens
/// all match and whose placeholders all resolve wins. Sets are cloneable so
/// a privileged set can be built by extending a base set.
pub struct CommandSet<H> {
    commands: Vec<Command<H>>,
    filters: HashMap<String, Filter>,
}

impl<H> Clone for CommandSet<H>
where
    H: Clone,
{
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            filters: self.filters.clone(),
        }
    }
}

impl<H> fmt::Debug for CommandSet<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSet")
            .field("commands", &self.commands.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}

impl<H> Default for CommandSet<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> CommandSet<H> {
    /// Creates a set with the built-in `word` and `int` filters.
    #[must_use]
    pub fn new() -> Self {
        let mut set = Self {
            commands: Vec::new(),
            filters: HashMap::new(),
        };
        set.add_filter("word", |_, word| {
            FilterOutcome::Resolved(Arg::Word(word.to_string()))
        });
        set.add_filter("int", |_, word| match word.parse::<i64>() {
            Ok(n) => FilterOutcome::Resolved(Arg::Int(n)),
            Err(_) => FilterOutcome::Reject,
        });
        set
    }

    /// Registers a named filter.
    pub fn add_filter(
        &mut self,
        name: &str,
        filter: impl Fn(&mut MatchContext<'_>, &str) -> FilterOutcome + 'static,
    ) {
        self.filters.insert(name.to_string(), Arc::new(filter));
    }

    /// Registers a command with one or more pattern sources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PatternSyntax`] for a malformed pattern and
    /// [`Error::UnknownFilter`] for a pattern naming an unregistered filter.
    /// Registration-time validation means matching never fails structurally.
    pub fn command(&mut self, name: &str, help: &str, patterns: &[&str], handler: H) -> Result<()> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for source in patterns {
            let pattern = Pattern::compile(source)?;
            for filter in pattern.filters() {
                if !self.filters.contains_key(filter) {
                    return Err(Error::UnknownFilter {
                        filter: filter.to_string(),
                        pattern: (*source).to_string(),
                    });
                }
            }
            compiled.push(pattern);
        }
        self.commands.push(Command {
            name: name.to_string(),
            help: help.to_string(),
            patterns: compiled,
            handler,
        });
        Ok(())
    }

    /// Returns the registered commands, in registration order.
    #[must_use]
    pub fn commands(&self) -> &[Command<H>] {
        &self.commands
    }

    /// Matches a line against every registered pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMatch`] when nothing matches, carrying the names
    /// of commands whose leading literal matched the first word, for "did
    /// you mean" feedback.
    pub fn resolve<'s>(
        &'s self,
        ctx: &mut MatchContext<'_>,
        line: &str,
    ) -> Result<Resolved<'s, H>> {
        for command in &self.commands {
            for pattern in &command.patterns {
                if let Some(args) = self.try_pattern(ctx, pattern, line) {
                    return Ok(Resolved {
                        name: &command.name,
                        handler: &command.handler,
                        args,
                    });
                }
            }
        }
        Err(Error::no_match(self.tried(line)))
    }

    /// Attempts one pattern. `None` means "try the next one", whether the
    /// failure was structural or a filter rejection.
    fn try_pattern(&self, ctx: &mut MatchContext<'_>, pattern: &Pattern, line: &str) -> Option<Args> {
        let words = tokenize(line);
        let mut args = Args::new();
        let mut cursor = 0usize;

        for token in pattern.tokens() {
            match token {
                PatternToken::Literal(literal) => {
                    let word = words.get(cursor)?;
                    if !word.text.eq_ignore_ascii_case(literal) {
                        return None;
                    }
                    cursor += 1;
                }
                PatternToken::Placeholder { filter, name } => {
                    let word = words.get(cursor)?;
                    // Registration guarantees the filter exists.
                    let filter = self.filters.get(filter)?;
                    match filter(ctx, word.text) {
                        FilterOutcome::Resolved(arg) => args.insert(name, arg),
                        FilterOutcome::Reject => return None,
                    }
                    cursor += 1;
                }
                PatternToken::Remainder { name } => {
                    let word = words.get(cursor)?;
                    args.insert(name, Arg::Rest(line[word.start..].trim_end().to_string()));
                    cursor = words.len();
                }
            }
        }

        // Trailing input the pattern did not consume fails the match.
        if cursor == words.len() { Some(args) } else { None }
    }

    /// Command names whose leading literal matches the first input word.
    fn tried(&self, line: &str) -> Vec<String> {
        let words = tokenize(line);
        let Some(first) = words.first() else {
            return Vec::new();
        };
        let mut names: Vec<String> = Vec::new();
        for command in &self.commands {
            let attempted = command
                .patterns
                .iter()
                .any(|p| p.leading_literal().is_some_and(|w| w.eq_ignore_ascii_case(first.text)));
            if attempted && !names.iter().any(|n| n == &command.name) {
                names.push(command.name.clone());
            }
        }
        names
    }
}
