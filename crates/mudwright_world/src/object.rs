//! Live object instances.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mudwright_foundation::{Error, ObjectId, Result, Value};

use crate::archetype::Archetype;

/// A live world object: identity, archetype, and a value for every field
/// declared by its composing traits.
///
/// Objects are owned by the world directory and mutated in place by command
/// handlers and hooks. Field access is validated against the archetype;
/// supplying a name no composing trait declares is an error, never a silent
/// insertion.
#[derive(Clone, Debug)]
pub struct Object {
    id: ObjectId,
    archetype: Arc<Archetype>,
    fields: BTreeMap<Arc<str>, Value>,
}

impl Object {
    /// Constructs an instance with every field at its declared default.
    ///
    /// Defaults are deep copies; container defaults can never alias state
    /// between instances.
    pub(crate) fn new(id: ObjectId, archetype: Arc<Archetype>) -> Self {
        let fields = archetype
            .fields()
            .iter()
            .map(|f| (Arc::clone(&f.name), f.default.clone()))
            .collect();
        Self {
            id,
            archetype,
            fields,
        }
    }

    /// Returns this object's identity.
    #[must_use]
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns this object's archetype.
    #[must_use]
    pub const fn archetype(&self) -> &Arc<Archetype> {
        &self.archetype
    }

    /// Returns a field value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if no composing trait declares the
    /// field.
    pub fn get(&self, field: &str) -> Result<&Value> {
        self.fields.get(field).ok_or_else(|| {
            Error::unknown_fields(self.archetype.name(), vec![field.to_string()])
        })
    }

    /// Sets a field value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if no composing trait declares the
    /// field.
    pub fn set(&mut self, field: &str, value: Value) -> Result<()> {
        let Some(def) = self.archetype.field(field) else {
            return Err(Error::unknown_fields(
                self.archetype.name(),
                vec![field.to_string()],
            ));
        };
        self.fields.insert(Arc::clone(&def.name), value);
        Ok(())
    }

    /// Iterates field names and current values, in field-name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (&**k, v))
    }

    /// Returns the object's name field, if set to a string.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Returns a display name including the identity, e.g. `Kitchen (#3)`.
    #[must_use]
    pub fn full_name(&self) -> String {
        match self.name() {
            Some(name) => format!("{name} ({})", self.id),
            None => format!("object {}", self.id),
        }
    }

    /// Returns the description field, or a stock phrase when unset.
    #[must_use]
    pub fn describe(&self) -> &str {
        self.fields
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("You see nothing special.")
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}
