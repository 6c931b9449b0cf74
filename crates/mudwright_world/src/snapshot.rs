//! Snapshot and restore: reference-preserving persistence for the whole
//! directory.
//!
//! A snapshot is a flat list of object records. Fields that reference other
//! objects are emitted as `{"$ref": identity}` markers rather than inlined,
//! which keeps the encoding acyclic and linear in object count no matter how
//! cyclic the live graph is.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mudwright_foundation::{Error, ObjectId, Result, Value};

use crate::object::Object;
use crate::world::World;

/// The serialized form of the whole world directory at a point in time.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// One record per live object, in ascending identity order.
    pub objects: Vec<ObjectRecord>,
}

/// The serialized form of one object.
///
/// `fields` holds only values whose declaration carries the persist flag and
/// which differ structurally from the trait-declared default. The entity
/// type itself is not serialized as structure; it is rebuilt on restore from
/// `type_name` and `traits`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// Recorded identity.
    pub id: ObjectId,
    /// Entity type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Composing trait names, in composition order.
    pub traits: Vec<String>,
    /// Non-default persistent field values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
}

impl World {
    /// Serializes every live object into a snapshot.
    ///
    /// The result is deterministic: snapshotting twice without intervening
    /// mutation produces an identical tree.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let objects = self.objects.values().map(|obj| self.record(obj)).collect();
        Snapshot { objects }
    }

    fn record(&self, object: &Object) -> ObjectRecord {
        let archetype = object.archetype();
        let mut fields = BTreeMap::new();
        for def in archetype.fields() {
            if !def.persist {
                continue;
            }
            // Defaults are omitted; restore reapplies them from the trait.
            if let Ok(value) = object.get(&def.name) {
                if *value != def.default {
                    fields.insert(def.name.to_string(), value.clone());
                }
            }
        }
        let mut record = ObjectRecord {
            id: object.id(),
            type_name: archetype.name().to_string(),
            traits: archetype.trait_names().map(str::to_string).collect(),
            fields,
        };
        for def in archetype.trait_defs() {
            if let Some(hook) = &def.on_serialize {
                hook.call(self, object.id(), &mut record);
            }
        }
        record
    }

    /// Reconstructs the directory from a snapshot.
    ///
    /// Restore is whole-graph-replace, never a merge, and runs in two
    /// phases. The instantiate pass validates every record (trait names,
    /// field names, identity uniqueness) and builds bare instances before
    /// the directory is touched, so a rejected snapshot leaves the existing
    /// world unchanged. The populate pass assigns recorded field values and
    /// then fires `on_init` hooks, deferred so that hooks observe fully
    /// assigned relational fields regardless of record order or cycles.
    ///
    /// # Errors
    ///
    /// - [`Error::NonEmptyWorld`] if any object is live.
    /// - [`Error::UnknownTrait`] for a trait name missing from the registry.
    /// - [`Error::DuplicateIdentity`] for a repeated identity.
    /// - [`Error::UnknownField`] for a recorded field no trait declares.
    /// - A failing `on_init` hook aborts the restore and clears the
    ///   directory; a partially-restored graph never survives.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<()> {
        if !self.objects.is_empty() {
            return Err(Error::NonEmptyWorld);
        }

        // Instantiate pass: validate and build bare instances.
        let mut built: BTreeMap<ObjectId, Object> = BTreeMap::new();
        let mut max_id = 0u64;
        for record in &snapshot.objects {
            let trait_names: Vec<&str> = record.traits.iter().map(String::as_str).collect();
            let archetype = self.define_archetype(&record.type_name, &trait_names)?;

            let unknown: Vec<String> = record
                .fields
                .keys()
                .filter(|name| archetype.field(name).is_none())
                .cloned()
                .collect();
            if !unknown.is_empty() {
                return Err(Error::unknown_fields(archetype.name(), unknown));
            }

            let object = Object::new(record.id, archetype);
            if built.insert(record.id, object).is_some() {
                return Err(Error::DuplicateIdentity(record.id));
            }
            max_id = max_id.max(record.id.raw());
        }

        self.objects = built;
        if self.next_id.raw() <= max_id {
            self.next_id = ObjectId::from_raw(max_id + 1);
        }

        let populated = self.populate(snapshot);
        if populated.is_err() {
            // Do not proceed with a partially-restored graph. The identity
            // counter stays advanced; identities are never reissued.
            self.objects.clear();
            self.indexes.clear();
        } else {
            tracing::info!(objects = self.objects.len(), "restored world from snapshot");
        }
        populated
    }

    /// Populate pass: assign every recorded field, then fire hooks.
    fn populate(&mut self, snapshot: &Snapshot) -> Result<()> {
        for record in &snapshot.objects {
            for (name, value) in &record.fields {
                self.set_field(record.id, name, value.clone())?;
            }
        }
        for record in &snapshot.objects {
            let archetype = self.get(record.id)?.archetype().clone();
            for def in archetype.trait_defs().to_vec() {
                if let Some(hook) = &def.on_init {
                    hook.call(self, record.id)?;
                }
            }
        }
        Ok(())
    }
}
