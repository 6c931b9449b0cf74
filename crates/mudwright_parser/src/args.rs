//! Values bound by a successful pattern match.

use std::collections::BTreeMap;

use mudwright_foundation::ObjectId;

/// A single bound argument.
///
/// The `NotFound` and `Ambiguous` variants are filter-defined sentinels: the
/// pattern matched syntactically, but resolution found nothing or found too
/// much. `Ambiguous` additionally means the filter has already told the
/// player so; handlers distinguish both from an argument that was simply not
/// supplied (absent from [`Args`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arg {
    /// A bare word.
    Word(String),
    /// The raw remainder of the line.
    Rest(String),
    /// An integer.
    Int(i64),
    /// A resolved object.
    Object(ObjectId),
    /// Resolution found no match for this word.
    NotFound(String),
    /// Resolution was ambiguous for this word; the player was notified.
    Ambiguous(String),
}

impl Arg {
    /// Returns the textual content of a `Word` or `Rest` argument.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Word(s) | Self::Rest(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the resolved object, if this argument is one.
    #[must_use]
    pub const fn object(&self) -> Option<ObjectId> {
        match self {
            Self::Object(id) => Some(*id),
            _ => None,
        }
    }
}

/// The named arguments bound by one match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Args {
    values: BTreeMap<String, Arg>,
}

impl Args {
    /// Creates an empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an argument.
    pub fn insert(&mut self, name: &str, arg: Arg) {
        self.values.insert(name.to_string(), arg);
    }

    /// Returns a bound argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arg> {
        self.values.get(name)
    }

    /// Returns the text of a bound `Word` or `Rest` argument.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Arg::text)
    }

    /// Returns a bound integer argument.
    #[must_use]
    pub fn int(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(Arg::Int(n)) => Some(*n),
            _ => None,
        }
    }

    /// Returns a bound object argument.
    #[must_use]
    pub fn object(&self, name: &str) -> Option<ObjectId> {
        self.values.get(name).and_then(Arg::object)
    }

    /// Returns the number of bound arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
