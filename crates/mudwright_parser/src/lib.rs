//! Pattern matching for line-oriented commands.
//!
//! This crate provides:
//! - [`Pattern`] - Compiled textual patterns with typed placeholders
//! - [`Arg`]/[`Args`] - Values bound by a successful match
//! - [`CommandSet`] - An ordered registry of commands, patterns, and filters
//!
//! The matcher is standalone: it resolves lines against patterns and binds
//! arguments, but knows nothing about sessions or handlers. Handlers travel
//! through [`CommandSet`] as an opaque payload for the interaction engine to
//! invoke.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod args;
mod command;
mod pattern;

pub use args::{Arg, Args};
pub use command::{Command, CommandSet, Filter, FilterOutcome, MatchContext, Resolved};
pub use pattern::{Pattern, PatternToken};
