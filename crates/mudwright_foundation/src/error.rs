//! Error types for the Mudwright system.
//!
//! Uses `thiserror` for ergonomic error definition. The taxonomy follows the
//! seams of the runtime: construction errors are fatal to the single
//! operation, match errors are recoverable user feedback, persistence errors
//! abort the whole restore, and account errors surface at the login prompt.

use thiserror::Error;

use crate::id::ObjectId;

/// Convenience result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for all Mudwright operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A trait name was not found in the registry.
    #[error("unknown trait: {0}")]
    UnknownTrait(String),

    /// A trait was registered twice under the same name.
    #[error("trait already registered: {0}")]
    DuplicateTrait(String),

    /// Field names were supplied that no composing trait declares.
    #[error("unknown fields on {type_name}: {}", fields.join(", "))]
    UnknownField {
        /// The entity type that rejected the fields.
        type_name: String,
        /// The offending field names.
        fields: Vec<String>,
    },

    /// An object identity was not present in the world directory.
    #[error("no such object: {0}")]
    ObjectNotFound(ObjectId),

    /// A snapshot was restored into a directory that already holds objects.
    #[error("cannot restore into a non-empty world")]
    NonEmptyWorld,

    /// A snapshot contained the same identity twice.
    #[error("duplicate identity in snapshot: {0}")]
    DuplicateIdentity(ObjectId),

    /// A command pattern failed to compile.
    #[error("bad pattern {pattern:?}: {message}")]
    PatternSyntax {
        /// The pattern source text.
        pattern: String,
        /// What was wrong with it.
        message: String,
    },

    /// A pattern named a filter that is not registered on its command set.
    #[error("pattern {pattern:?} uses unregistered filter {filter:?}")]
    UnknownFilter {
        /// The missing filter name.
        filter: String,
        /// The pattern that referenced it.
        pattern: String,
    },

    /// No registered pattern matched the input line.
    #[error("no command matched")]
    NoMatch {
        /// Names of commands whose leading word matched, for feedback.
        tried: Vec<String>,
    },

    /// An account already exists under this username.
    #[error("username already taken: {0}")]
    DuplicateUsername(String),

    /// The object is already bound to an account.
    #[error("object {0} already has an account")]
    DuplicateObject(ObjectId),

    /// No account exists under this username.
    #[error("unknown username: {0}")]
    UnknownUsername(String),

    /// The supplied password did not verify.
    #[error("invalid password")]
    BadPassword,

    /// Accounts were loaded into a store that already holds accounts.
    #[error("cannot load into a non-empty account store")]
    NonEmptyAccounts,

    /// The object has no associated account.
    #[error("no account for object {0}")]
    NoSuchAccount(ObjectId),

    /// Encoding or decoding a snapshot failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A filesystem operation failed.
    #[error("io error: {0}")]
    Io(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Creates an unknown-field error from the offending keys.
    #[must_use]
    pub fn unknown_fields(type_name: impl Into<String>, mut fields: Vec<String>) -> Self {
        fields.sort();
        Self::UnknownField {
            type_name: type_name.into(),
            fields,
        }
    }

    /// Creates a no-match error carrying the attempted command names.
    #[must_use]
    pub fn no_match(tried: Vec<String>) -> Self {
        Self::NoMatch { tried }
    }

    /// Creates a pattern syntax error.
    #[must_use]
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PatternSyntax {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
