//! Runtime plumbing for Mudwright.
//!
//! This crate provides:
//! - [`persist`] - Snapshot and account files (JSON)
//! - [`Console`] - A local single-session console driver

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod console;
pub mod persist;

pub use console::{Console, LineEditor, ReadResult, RustylineEditor};
