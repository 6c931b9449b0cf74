//! The world directory: the authoritative identity→object mapping.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use mudwright_foundation::{Error, ObjectId, Result, Value};

use crate::archetype::Archetype;
use crate::object::Object;
use crate::trait_def::{TraitDef, TraitRegistry};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ArchetypeKey {
    name: Arc<str>,
    traits: Vec<Arc<str>>,
}

/// The authoritative in-memory object directory, plus derived indexes.
///
/// Owned by the process and mutated by exactly one logical thread of control
/// at a time: command handlers run to completion or to a suspension point
/// without preemption, so no internal locking exists. Indexes are maintained
/// exclusively by trait lifecycle hooks; an `on_init` insertion that is not
/// undone by the matching `on_delete` is a bug in the trait, not here.
#[derive(Clone, Debug)]
pub struct World {
    registry: Arc<TraitRegistry>,
    archetypes: HashMap<ArchetypeKey, Arc<Archetype>>,
    pub(crate) objects: BTreeMap<ObjectId, Object>,
    pub(crate) indexes: BTreeMap<Arc<str>, BTreeSet<ObjectId>>,
    pub(crate) next_id: ObjectId,
}

impl World {
    /// Creates an empty world over the given trait registry.
    #[must_use]
    pub fn new(registry: Arc<TraitRegistry>) -> Self {
        Self {
            registry,
            archetypes: HashMap::new(),
            objects: BTreeMap::new(),
            indexes: BTreeMap::new(),
            next_id: ObjectId::from_raw(1),
        }
    }

    /// Returns the trait registry this world composes types from.
    #[must_use]
    pub fn registry(&self) -> &Arc<TraitRegistry> {
        &self.registry
    }

    // --- Entity types ---

    /// Synthesizes (or retrieves the cached) entity type for the given name
    /// and ordered trait list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTrait`] if any trait name is not registered.
    pub fn define_archetype(&mut self, name: &str, trait_names: &[&str]) -> Result<Arc<Archetype>> {
        let mut traits = Vec::with_capacity(trait_names.len());
        for trait_name in trait_names {
            traits.push(self.registry.require(trait_name)?);
        }
        let key = ArchetypeKey {
            name: name.into(),
            traits: traits.iter().map(|t| Arc::clone(&t.name)).collect(),
        };
        if let Some(cached) = self.archetypes.get(&key) {
            return Ok(Arc::clone(cached));
        }
        let archetype = Arc::new(Archetype::synthesize(name, traits));
        self.archetypes.insert(key, Arc::clone(&archetype));
        Ok(archetype)
    }

    // --- Object lifecycle ---

    /// Creates an object of the given archetype.
    ///
    /// Unsupplied fields take their declared default. The new identity comes
    /// from a monotonic counter and is never reused. Each composing trait's
    /// `on_init` hook runs in trait order after the object is registered; a
    /// failing hook unwinds the registration (running the `on_delete` hooks
    /// of traits whose `on_init` already succeeded).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] naming every override key that no
    /// composing trait declares, or the error of a failing `on_init` hook.
    pub fn create(
        &mut self,
        archetype: &Arc<Archetype>,
        overrides: &[(&str, Value)],
    ) -> Result<ObjectId> {
        let unknown: Vec<String> = overrides
            .iter()
            .filter(|(name, _)| archetype.field(name).is_none())
            .map(|(name, _)| (*name).to_string())
            .collect();
        if !unknown.is_empty() {
            return Err(Error::unknown_fields(archetype.name(), unknown));
        }

        let id = self.next_id;
        self.next_id = id.next();

        let mut object = Object::new(id, Arc::clone(archetype));
        for (name, value) in overrides {
            object.set(name, value.clone())?;
        }
        self.objects.insert(id, object);
        tracing::debug!(%id, archetype = archetype.name(), "created object");

        let traits = archetype.trait_defs().to_vec();
        for (position, def) in traits.iter().enumerate() {
            let Some(hook) = &def.on_init else { continue };
            if let Err(e) = hook.call(self, id) {
                self.unwind_create(id, &traits[..position]);
                return Err(e);
            }
        }
        Ok(id)
    }

    fn unwind_create(&mut self, id: ObjectId, initialised: &[Arc<TraitDef>]) {
        for def in initialised {
            if let Some(hook) = &def.on_delete {
                let _ = hook.call(self, id);
            }
        }
        self.objects.remove(&id);
    }

    /// Deletes an object: runs each composing trait's `on_delete` hook in
    /// trait order, then removes the object from the directory.
    ///
    /// Deletion is terminal. The identity is never reassigned, and any
    /// reference still held by another object dangles; referrers must check
    /// liveness via [`World::resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectNotFound`] if the object is not live, or the
    /// error of a failing `on_delete` hook.
    pub fn delete(&mut self, id: ObjectId) -> Result<()> {
        let archetype = Arc::clone(self.get(id)?.archetype());
        for def in archetype.trait_defs().to_vec() {
            if let Some(hook) = &def.on_delete {
                hook.call(self, id)?;
            }
        }
        self.objects.remove(&id);
        tracing::debug!(%id, archetype = archetype.name(), "deleted object");
        Ok(())
    }

    // --- Lookup ---

    /// Looks up a live object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    /// Looks up a live object mutably.
    #[must_use]
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    /// Looks up a live object, failing if it is not live.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectNotFound`].
    pub fn get(&self, id: ObjectId) -> Result<&Object> {
        self.objects.get(&id).ok_or(Error::ObjectNotFound(id))
    }

    /// Looks up a live object mutably, failing if it is not live.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectNotFound`].
    pub fn get_mut(&mut self, id: ObjectId) -> Result<&mut Object> {
        self.objects.get_mut(&id).ok_or(Error::ObjectNotFound(id))
    }

    /// Returns true if the identity refers to a live object.
    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Returns the number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if the directory holds no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterates live objects in ascending identity order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    /// Iterates live identities in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.keys().copied()
    }

    /// Resolves a reference value to the live object it names.
    ///
    /// Returns `None` for non-reference values and for dangling references;
    /// this is the graceful-degradation path for referrers of deleted
    /// objects.
    #[must_use]
    pub fn resolve(&self, value: &Value) -> Option<&Object> {
        self.objects.get(&value.as_ref_id()?)
    }

    // --- Field convenience ---

    /// Reads a field from a live object, cloning the value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectNotFound`] or [`Error::UnknownField`].
    pub fn get_field(&self, id: ObjectId, field: &str) -> Result<Value> {
        Ok(self.get(id)?.get(field)?.clone())
    }

    /// Writes a field on a live object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ObjectNotFound`] or [`Error::UnknownField`].
    pub fn set_field(&mut self, id: ObjectId, field: &str, value: Value) -> Result<()> {
        self.get_mut(id)?.set(field, value)
    }

    // --- Indexes ---

    /// Iterates the members of a named index, in ascending identity order.
    ///
    /// An index that has never been touched iterates as empty.
    pub fn index(&self, name: &str) -> impl Iterator<Item = ObjectId> + '_ {
        self.indexes
            .get(name)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Returns true if the named index contains the identity.
    #[must_use]
    pub fn index_contains(&self, name: &str, id: ObjectId) -> bool {
        self.indexes.get(name).is_some_and(|set| set.contains(&id))
    }

    /// Inserts an identity into a named index. Intended for `on_init` hooks.
    pub fn index_insert(&mut self, name: &str, id: ObjectId) {
        self.indexes.entry(name.into()).or_default().insert(id);
    }

    /// Removes an identity from a named index. Intended for `on_delete`
    /// hooks; every insertion a trait performs must be undone here.
    pub fn index_remove(&mut self, name: &str, id: ObjectId) {
        if let Some(set) = self.indexes.get_mut(name) {
            set.remove(&id);
        }
    }
}
