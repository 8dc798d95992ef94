//! Capture and restore of frozen instances, for external persistence.
//!
//! Restoring never runs a constructor: the captured values are loaded
//! verbatim into a fresh instance, which is then frozen.

use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::{Frozen, FrozenError, Partial, TypeDescriptor, Value, registry};

/// The captured state of a frozen instance: its exact type and every stored
/// field, in catalog order.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    descriptor: &'static TypeDescriptor,
    fields: IndexMap<&'static str, Value>,
}

impl Frozen {
    /// Captures this instance's type and stored fields
    pub fn capture(&self) -> Snapshot {
        Snapshot {
            descriptor: self.descriptor(),
            fields: self
                .fields()
                .map(|(name, value)| (name, value.clone()))
                .collect(),
        }
    }
}

impl Snapshot {
    /// The captured exact type
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// The captured fields, in catalog order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    /// Reads a captured field
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Allocates a new instance of the captured type, loads the fields and
    /// freezes it. The constructor does not run.
    ///
    /// Still fails if a captured name is no longer a field of the type, or a
    /// defining field is missing.
    pub fn restore(&self) -> Result<Frozen, FrozenError> {
        let catalog = self.descriptor.catalog()?;
        let fields = self.fields.iter().map(|(name, value)| (*name, value.clone()));
        let partial = Partial::preload(catalog, fields)?;
        trace!("Restoring {} from a snapshot", self.descriptor.name);
        partial.freeze()
    }

    /// Converts to the name-only form, for storage
    pub fn to_raw(&self) -> RawSnapshot {
        RawSnapshot {
            type_name: self.descriptor.name.into(),
            fields: self
                .fields
                .iter()
                .map(|(name, value)| ((*name).into(), value.clone()))
                .collect(),
        }
    }
}

/// A snapshot as a persistence layer stores it: the type by name, fields by
/// name. Resolved back through the [`registry`].
#[derive(Clone, Debug, PartialEq)]
pub struct RawSnapshot {
    /// Name the type was registered under
    pub type_name: String,
    /// Stored fields
    pub fields: Vec<(String, Value)>,
}

impl RawSnapshot {
    /// Looks the type up in the registry and checks every field name against
    /// its catalog.
    pub fn resolve(&self) -> Result<Snapshot, FrozenError> {
        let descriptor =
            registry::lookup(&self.type_name).ok_or_else(|| FrozenError::UnknownType {
                type_name: self.type_name.clone(),
            })?;
        let catalog = descriptor.catalog()?;

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, value) in &self.fields {
            let name = catalog.intern(name).ok_or_else(|| FrozenError::UnknownField {
                type_name: descriptor.name,
                field: name.clone(),
            })?;
            fields.insert(name, value.clone());
        }
        Ok(Snapshot { descriptor, fields })
    }
}
