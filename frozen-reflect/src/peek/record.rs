use std::collections::HashMap;

use frozen_core::{Catalog, Field, Frozen, FrozenError, TypeDescriptor, Value};
use indexmap::IndexMap;

use crate::{FieldSelection, Peek};

/// Lets you read from a frozen instance
#[derive(Clone, Copy)]
pub struct PeekFrozen<'mem> {
    frozen: &'mem Frozen,
}

impl core::fmt::Debug for PeekFrozen<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PeekFrozen")
            .field("type", &self.descriptor().name)
            .finish_non_exhaustive()
    }
}

impl<'mem> PeekFrozen<'mem> {
    /// Creates a view over `frozen`
    #[inline]
    pub fn new(frozen: &'mem Frozen) -> Self {
        Self { frozen }
    }

    /// The instance being viewed
    #[inline(always)]
    pub fn frozen(&self) -> &'mem Frozen {
        self.frozen
    }

    /// The exact type
    #[inline(always)]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.frozen.descriptor()
    }

    /// The exact type's catalog
    #[inline(always)]
    pub fn catalog(&self) -> &'static Catalog {
        self.frozen.catalog()
    }

    /// Returns the number of stored fields
    #[inline]
    pub fn field_count(&self) -> usize {
        self.frozen.len()
    }

    /// Returns the stored field at the given index, in catalog order
    pub fn field(&self, index: usize) -> Option<(&'static Field, Peek<'mem>)> {
        self.fields().nth(index)
    }

    /// Gets the value of the field with the given name
    #[inline]
    pub fn field_by_name(&self, name: &str) -> Result<Peek<'mem>, FrozenError> {
        self.frozen.field(name).map(Peek::new)
    }

    /// Iterates over all stored fields in catalog order, providing both the
    /// field and its value
    pub fn fields(&self) -> impl Iterator<Item = (&'static Field, Peek<'mem>)> + 'mem {
        let catalog = self.catalog();
        self.frozen
            .fields()
            .filter_map(move |(name, value)| Some((catalog.field(name)?, Peek::new(value))))
    }

    /// Iterates over the stored fields in `selection`
    pub fn fields_for_serialize(
        &self,
        selection: FieldSelection,
    ) -> impl Iterator<Item = (&'static Field, Peek<'mem>)> + 'mem {
        self.fields().filter(move |(field, _)| selection.includes(field))
    }

    /// Exports the selected fields as a map from field name to value
    pub fn to_dict(&self, selection: FieldSelection) -> HashMap<&'static str, Value> {
        self.fields_for_serialize(selection)
            .map(|(field, peek)| (field.name, peek.value().clone()))
            .collect()
    }

    /// Exports the selected fields in catalog order: root-most ancestor
    /// first, declaration order within a type
    pub fn to_ordered_dict(&self, selection: FieldSelection) -> IndexMap<&'static str, Value> {
        self.fields_for_serialize(selection)
            .map(|(field, peek)| (field.name, peek.value().clone()))
            .collect()
    }
}
