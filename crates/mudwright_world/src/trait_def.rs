//! Trait definitions: named, reusable bundles of field declarations and
//! lifecycle hooks.
//!
//! Traits are pure templates. They are registered once at startup and never
//! mutated afterwards; the registry owns them for the life of the process.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mudwright_foundation::{Error, ObjectId, Result, Type, Value};

use crate::snapshot::ObjectRecord;
use crate::world::World;

/// A field declared by a trait.
#[derive(Clone, Debug)]
pub struct FieldDef {
    /// Field name.
    pub name: Arc<str>,
    /// One-line description, shown by generic editors.
    pub summary: Arc<str>,
    /// Declared type.
    pub ty: Type,
    /// Default value, deep-copied into every new instance.
    pub default: Value,
    /// Whether the field is included in snapshots.
    pub persist: bool,
    /// Whether the field is exposed to generic editors.
    pub visible: bool,
}

impl FieldDef {
    /// Creates a field whose type is inferred from its default value.
    #[must_use]
    pub fn new(name: &str, summary: &str, default: impl Into<Value>) -> Self {
        let default = default.into();
        let ty = default.value_type();
        Self {
            name: name.into(),
            summary: summary.into(),
            ty,
            default,
            persist: true,
            visible: true,
        }
    }

    /// Creates a field with an explicit type.
    ///
    /// Needed when the default is nil but the field holds something more
    /// specific, e.g. an object reference or multi-line text.
    #[must_use]
    pub fn typed(name: &str, summary: &str, ty: Type, default: impl Into<Value>) -> Self {
        Self {
            ty,
            ..Self::new(name, summary, default)
        }
    }

    /// Excludes this field from snapshots.
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.persist = false;
        self
    }

    /// Hides this field from generic editors.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }
}

type HookFn = dyn Fn(&mut World, ObjectId) -> Result<()>;

/// A named lifecycle hook invoked with the world and the affected object.
#[derive(Clone)]
pub struct Hook {
    name: &'static str,
    func: Arc<HookFn>,
}

impl Hook {
    /// Creates a hook with a name for diagnostics.
    pub fn new(name: &'static str, func: impl Fn(&mut World, ObjectId) -> Result<()> + 'static) -> Self {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// Returns the hook name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes the hook.
    pub fn call(&self, world: &mut World, id: ObjectId) -> Result<()> {
        (self.func)(world, id)
    }
}

impl fmt::Debug for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hook({})", self.name)
    }
}

type SerializeHookFn = dyn Fn(&World, ObjectId, &mut ObjectRecord);

/// A named hook that may amend an object's snapshot record.
#[derive(Clone)]
pub struct SerializeHook {
    name: &'static str,
    func: Arc<SerializeHookFn>,
}

impl SerializeHook {
    /// Creates a serialize hook with a name for diagnostics.
    pub fn new(
        name: &'static str,
        func: impl Fn(&World, ObjectId, &mut ObjectRecord) + 'static,
    ) -> Self {
        Self {
            name,
            func: Arc::new(func),
        }
    }

    /// Returns the hook name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Invokes the hook.
    pub fn call(&self, world: &World, id: ObjectId, record: &mut ObjectRecord) {
        (self.func)(world, id, record);
    }
}

impl fmt::Debug for SerializeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerializeHook({})", self.name)
    }
}

/// A named, reusable bundle of field declarations and lifecycle hooks.
///
/// Every index insertion performed by a trait's `on_init` must be undone by
/// the same trait's `on_delete`; [`TraitDef::indexed`] installs such a pair.
#[derive(Clone, Debug, Default)]
pub struct TraitDef {
    /// Trait name, unique within a registry.
    pub name: Arc<str>,
    /// Field declarations, in declaration order.
    pub fields: Vec<FieldDef>,
    /// Called after an instance is constructed and registered.
    pub on_init: Option<Hook>,
    /// Called before an instance is removed from the directory.
    pub on_delete: Option<Hook>,
    /// May amend the instance's snapshot record.
    pub on_serialize: Option<SerializeHook>,
}

impl TraitDef {
    /// Creates an empty trait.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a trait that maintains membership in a directory index,
    /// inserting on init and removing on delete.
    #[must_use]
    pub fn indexed(name: &str, index: &'static str) -> Self {
        Self::new(name)
            .with_on_init(Hook::new(index, move |world, id| {
                world.index_insert(index, id);
                Ok(())
            }))
            .with_on_delete(Hook::new(index, move |world, id| {
                world.index_remove(index, id);
                Ok(())
            }))
    }

    /// Adds a field declaration.
    #[must_use]
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the init hook.
    #[must_use]
    pub fn with_on_init(mut self, hook: Hook) -> Self {
        self.on_init = Some(hook);
        self
    }

    /// Sets the delete hook.
    #[must_use]
    pub fn with_on_delete(mut self, hook: Hook) -> Self {
        self.on_delete = Some(hook);
        self
    }

    /// Sets the serialize hook.
    #[must_use]
    pub fn with_on_serialize(mut self, hook: SerializeHook) -> Self {
        self.on_serialize = Some(hook);
        self
    }

    /// Returns the field declaration with the given name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| &*f.name == name)
    }
}

/// Lookup table from trait name to trait definition.
#[derive(Clone, Debug, Default)]
pub struct TraitRegistry {
    traits: BTreeMap<Arc<str>, Arc<TraitDef>>,
}

impl TraitRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a trait definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateTrait`] if the name is already taken.
    pub fn register(&mut self, def: TraitDef) -> Result<Arc<TraitDef>> {
        if self.traits.contains_key(&def.name) {
            return Err(Error::DuplicateTrait(def.name.to_string()));
        }
        let def = Arc::new(def);
        self.traits.insert(Arc::clone(&def.name), Arc::clone(&def));
        Ok(def)
    }

    /// Looks up a trait by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<TraitDef>> {
        self.traits.get(name).cloned()
    }

    /// Looks up a trait by name, failing if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTrait`] if the name is not registered.
    pub fn require(&self, name: &str) -> Result<Arc<TraitDef>> {
        self.get(name)
            .ok_or_else(|| Error::UnknownTrait(name.to_string()))
    }

    /// Returns the number of registered traits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.traits.len()
    }

    /// Returns true if no traits are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// Iterates registered trait names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.traits.keys().map(AsRef::as_ref)
    }
}
