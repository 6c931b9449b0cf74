//! Compass directions for exits and movement.

use std::collections::BTreeMap;
use std::sync::Arc;

/// A direction with coordinate deltas, used to lay rooms out sensibly and to
/// find opposites when digging exit pairs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Direction {
    /// Full direction name, e.g. `northeast`.
    pub name: Arc<str>,
    /// East-west delta.
    pub x: i32,
    /// North-south delta.
    pub y: i32,
    /// Up-down delta.
    pub z: i32,
}

impl Direction {
    /// Applies this direction to starting coordinates.
    #[must_use]
    pub const fn coordinates_from(&self, start: (i32, i32, i32)) -> (i32, i32, i32) {
        (start.0 + self.x, start.1 + self.y, start.2 + self.z)
    }
}

/// Registry of directions, addressable by full name or alias.
#[derive(Clone, Debug, Default)]
pub struct DirectionRegistry {
    by_word: BTreeMap<Arc<str>, Arc<Direction>>,
}

impl DirectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with the ten standard directions and
    /// their usual single- and double-letter aliases.
    #[must_use]
    pub fn with_compass() -> Self {
        let mut registry = Self::new();
        for (name, aliases, x, y, z) in [
            ("north", &["n"][..], 0, 1, 0),
            ("northeast", &["ne"][..], 1, 1, 0),
            ("east", &["e"][..], 1, 0, 0),
            ("southeast", &["se"][..], 1, -1, 0),
            ("south", &["s"][..], 0, -1, 0),
            ("southwest", &["sw"][..], -1, -1, 0),
            ("west", &["w"][..], -1, 0, 0),
            ("northwest", &["nw"][..], -1, 1, 0),
            ("up", &["u"][..], 0, 0, 1),
            ("down", &["d"][..], 0, 0, -1),
        ] {
            registry.add(name, aliases, x, y, z);
        }
        registry
    }

    /// Adds a direction under its full name plus any aliases.
    pub fn add(&mut self, name: &str, aliases: &[&str], x: i32, y: i32, z: i32) -> Arc<Direction> {
        let direction = Arc::new(Direction {
            name: name.into(),
            x,
            y,
            z,
        });
        self.by_word.insert(name.into(), Arc::clone(&direction));
        for alias in aliases {
            self.by_word.insert((*alias).into(), Arc::clone(&direction));
        }
        direction
    }

    /// Looks up a direction by name or alias, case-insensitively.
    #[must_use]
    pub fn get(&self, word: &str) -> Option<Arc<Direction>> {
        self.by_word.get(word.to_lowercase().as_str()).cloned()
    }

    /// Returns the direction whose deltas are the exact inverse.
    #[must_use]
    pub fn opposite(&self, direction: &Direction) -> Option<Arc<Direction>> {
        self.by_word
            .values()
            .find(|d| d.x == -direction.x && d.y == -direction.y && d.z == -direction.z)
            .cloned()
    }
}
