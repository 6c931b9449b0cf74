//! Entity types synthesized from ordered trait lists.

use std::sync::Arc;

use crate::trait_def::{FieldDef, TraitDef};

/// An entity type: the merged union of one or more traits' fields and hooks.
///
/// Identified by a type name plus its ordered trait list. Archetypes are
/// never serialized structurally; on restore they are rebuilt from the
/// recorded trait names.
///
/// Field merge order: fields keep the position of their first declaration,
/// but on a name collision the later trait's declaration wins ("last wins",
/// mirroring multiple-inheritance precedence). This is a documented policy,
/// not an error.
#[derive(Clone, Debug)]
pub struct Archetype {
    name: Arc<str>,
    traits: Vec<Arc<TraitDef>>,
    fields: Vec<FieldDef>,
}

impl Archetype {
    /// Synthesizes an archetype from an ordered trait list.
    #[must_use]
    pub fn synthesize(name: &str, traits: Vec<Arc<TraitDef>>) -> Self {
        let mut fields: Vec<FieldDef> = Vec::new();
        for def in &traits {
            for field in &def.fields {
                match fields.iter_mut().find(|f| f.name == field.name) {
                    Some(existing) => *existing = field.clone(),
                    None => fields.push(field.clone()),
                }
            }
        }
        Self {
            name: name.into(),
            traits,
            fields,
        }
    }

    /// Returns the type name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the composing traits, in composition order.
    #[must_use]
    pub fn trait_defs(&self) -> &[Arc<TraitDef>] {
        &self.traits
    }

    /// Iterates the composing trait names, in composition order.
    pub fn trait_names(&self) -> impl Iterator<Item = &str> {
        self.traits.iter().map(|t| &*t.name)
    }

    /// Returns true if the archetype composes the named trait.
    #[must_use]
    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.iter().any(|t| &*t.name == name)
    }

    /// Returns the merged field table.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Returns the merged declaration for the named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| &*f.name == name)
    }
}
