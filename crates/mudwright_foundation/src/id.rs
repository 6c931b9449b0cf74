//! Object identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Process-unique identifier for a world object.
///
/// Identities are assigned from a monotonically increasing counter and are
/// never reused, even after the object is deleted. A lookup in the world
/// directory is therefore sufficient to detect a stale reference; no
/// generation counter is needed.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Creates an identifier from a raw value.
    ///
    /// Intended for the directory's allocator and for snapshot restore;
    /// ordinary code receives identifiers from `World::create`.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns the identifier that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
