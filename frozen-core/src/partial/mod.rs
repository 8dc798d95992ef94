//! Construction-phase instances.
//!
//! A [`Partial`] is the only place an instance can be written to. It is handed
//! to constructor bodies as `&mut Partial`, so a body can never commit the
//! instance itself: only the code that allocated the `Partial` owns it, and
//! [`Partial::freeze`] consumes it.
//!
//! Ancestor constructors are run through [`Partial::parent`] and
//! [`Partial::ancestor`]. They write into the same `Partial`, on top of a
//! frame stack that records which constructor is currently running.

use alloc::string::String;
use alloc::vec::Vec;

use indexmap::IndexMap;

use crate::{Catalog, Constructor, Frozen, FrozenError, TypeDescriptor, Value, WriteOp};

/// State of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionState {
    /// Fields may be set, overwritten and removed
    Constructing,
    /// Every write is rejected. Terminal.
    Frozen,
}

/// Field storage shared by [`Partial`] and [`Frozen`]. Every write goes
/// through [`Record::gate`].
#[derive(Clone)]
pub(crate) struct Record {
    pub(crate) catalog: &'static Catalog,
    pub(crate) fields: IndexMap<&'static str, Value>,
    pub(crate) state: ConstructionState,
}

impl Record {
    fn new(catalog: &'static Catalog) -> Self {
        Self {
            catalog,
            fields: IndexMap::with_capacity(catalog.len()),
            state: ConstructionState::Constructing,
        }
    }

    #[inline]
    pub(crate) fn type_name(&self) -> &'static str {
        self.catalog.descriptor().name
    }

    /// The freeze gate: every write path asks here first.
    pub(crate) fn gate(&self, op: WriteOp, target: &str) -> Result<(), FrozenError> {
        match self.state {
            ConstructionState::Constructing => Ok(()),
            ConstructionState::Frozen => {
                trace!("Rejected {op} of '{target}' on frozen {}", self.type_name());
                Err(FrozenError::ImmutabilityViolation {
                    type_name: self.type_name(),
                    op,
                    target: target.into(),
                })
            }
        }
    }

    pub(crate) fn write(&mut self, name: &str, value: Value) -> Result<(), FrozenError> {
        self.gate(WriteOp::Set, name)?;
        let name = self
            .catalog
            .intern(name)
            .ok_or_else(|| FrozenError::UnknownField {
                type_name: self.type_name(),
                field: name.into(),
            })?;
        self.fields.insert(name, value);
        Ok(())
    }

    pub(crate) fn erase(&mut self, name: &str) -> Result<Option<Value>, FrozenError> {
        self.gate(WriteOp::Remove, name)?;
        Ok(self.fields.shift_remove(name))
    }

    /// The commit point. Checks that every defining field is present, puts
    /// the fields in catalog order, and closes the gate for good.
    fn freeze(&mut self) -> Result<(), FrozenError> {
        self.gate(WriteOp::Set, "<freeze>")?;
        if let Some(&field) = self
            .catalog
            .defining()
            .iter()
            .find(|name| !self.fields.contains_key(**name))
        {
            return Err(FrozenError::UninitializedField {
                type_name: self.type_name(),
                field,
            });
        }

        let catalog = self.catalog;
        self.fields.sort_by_cached_key(|name, _| catalog.index_of(name));
        self.state = ConstructionState::Frozen;
        trace!("Froze {} with {} field(s)", self.type_name(), self.fields.len());
        Ok(())
    }
}

/// An instance under construction.
///
/// Writes are accepted unconditionally (within the type's field catalog) and
/// overwrite earlier values, so ancestor constructors can run in sequence.
pub struct Partial {
    record: Record,

    /// descriptors whose constructors are running, outermost first
    frames: Vec<&'static TypeDescriptor>,
}

impl Partial {
    fn alloc(catalog: &'static Catalog) -> Self {
        let outermost = catalog
            .constructor()
            .map(|c| c.owner)
            .unwrap_or(catalog.descriptor());
        Self {
            record: Record::new(catalog),
            frames: vec![outermost],
        }
    }

    /// Runs the outermost construction: allocate, run the effective
    /// constructor, freeze. If the constructor fails the partial instance is
    /// dropped and never observed.
    pub(crate) fn run(catalog: &'static Catalog, args: Args) -> Result<Frozen, FrozenError> {
        let mut partial = Self::alloc(catalog);
        trace!("Constructing {}", catalog.descriptor().name);
        if let Some(constructor) = catalog.constructor() {
            (constructor.func)(&mut partial, &args)?;
        }
        partial.freeze()
    }

    /// Allocates a partial instance already holding `fields`, bypassing every
    /// constructor. Used by `replace` and snapshot restore.
    pub(crate) fn preload<'a>(
        catalog: &'static Catalog,
        fields: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Self, FrozenError> {
        let mut partial = Self::alloc(catalog);
        for (name, value) in fields {
            partial.record.write(name, value)?;
        }
        Ok(partial)
    }

    /// Commits the instance.
    pub(crate) fn freeze(mut self) -> Result<Frozen, FrozenError> {
        debug_assert_eq!(self.frames.len(), 1, "ancestor frames must be popped");
        self.record.freeze()?;
        Ok(Frozen::from_record(self.record))
    }

    /// The exact type being built
    #[inline]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.record.catalog.descriptor()
    }

    /// The exact type's catalog
    #[inline]
    pub fn catalog(&self) -> &'static Catalog {
        self.record.catalog
    }

    /// The descriptor whose constructor is currently running
    pub fn current(&self) -> &'static TypeDescriptor {
        self.frames[self.frames.len() - 1]
    }

    /// How many ancestor constructors are running on top of the outermost one
    pub fn depth(&self) -> usize {
        self.frames.len() - 1
    }

    /// Always [`ConstructionState::Constructing`]: a `Partial` stops existing
    /// when it freezes.
    pub fn state(&self) -> ConstructionState {
        self.record.state
    }

    /// The running constructors, e.g. `Employee > Person`
    pub fn path(&self) -> String {
        let names: Vec<_> = self.frames.iter().map(|d| d.name).collect();
        names.join(" > ")
    }

    /// Sets (or overwrites) a field. The name must be in the type's catalog.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self, FrozenError> {
        self.record.write(name, value.into())?;
        Ok(self)
    }

    /// Reads a field set so far
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.fields.get(name)
    }

    /// Removes a field set so far
    pub fn remove(&mut self, name: &str) -> Result<Option<Value>, FrozenError> {
        self.record.erase(name)
    }

    /// Copies every argument into the field of the same name
    pub fn assign_args(&mut self, args: &Args) -> Result<&mut Self, FrozenError> {
        for (name, value) in args.iter() {
            self.record.write(name, value.clone())?;
        }
        Ok(self)
    }

    /// Ancestor access for the next constructor after the one currently
    /// running, in the exact type's linearized chain.
    ///
    /// With single inheritance this is the parent's constructor (or the
    /// nearest ancestor's, if the parent declares none). In a diamond every
    /// shared ancestor runs once as long as each constructor delegates with
    /// `parent()`.
    pub fn parent(&mut self) -> Result<Ancestor<'_>, FrozenError> {
        let current = self.current();
        self.record.gate(WriteOp::AncestorInit, current.name)?;
        let catalog = self.record.catalog;
        let position = catalog
            .position(current)
            .ok_or(FrozenError::NotAnAncestor {
                type_name: catalog.descriptor().name,
                ancestor: current.name,
            })?;
        let target = catalog
            .chain()
            .nth(position + 1)
            .ok_or(FrozenError::NoParent {
                type_name: current.name,
            })?;
        let constructor = catalog.constructor_after(position).map(|(_, c)| c);
        Ok(Ancestor {
            partial: self,
            target,
            constructor,
        })
    }

    /// Ancestor access for a specific ancestor's constructor, for skip-level
    /// or diamond delegation.
    pub fn ancestor(
        &mut self,
        ancestor: &'static TypeDescriptor,
    ) -> Result<Ancestor<'_>, FrozenError> {
        self.record.gate(WriteOp::AncestorInit, ancestor.name)?;
        let catalog = self.record.catalog;
        match catalog.position(ancestor) {
            Some(position) if position > 0 => {}
            _ => {
                return Err(FrozenError::NotAnAncestor {
                    type_name: catalog.descriptor().name,
                    ancestor: ancestor.name,
                });
            }
        }
        let constructor = ancestor.catalog()?.constructor();
        Ok(Ancestor {
            partial: self,
            target: ancestor,
            constructor,
        })
    }
}

impl core::fmt::Debug for Partial {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Partial")
            .field("type", &self.descriptor().name)
            .field("path", &self.path())
            .field("fields", &self.record.fields)
            .finish()
    }
}

/// A resolved ancestor constructor, bound to the instance under construction.
///
/// Running it pushes a frame, so the ancestor body's own `parent()` calls
/// resolve relative to the ancestor, and pops it afterwards. It never freezes
/// the instance.
pub struct Ancestor<'p> {
    partial: &'p mut Partial,
    target: &'static TypeDescriptor,
    constructor: Option<Constructor>,
}

impl Ancestor<'_> {
    /// The ancestor that was asked for
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.target
    }

    /// The constructor that will run, if any ancestor from here on declares one
    pub fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }

    /// The defining fields the resolved constructor takes
    pub fn defining(&self) -> &'static [&'static str] {
        self.constructor.map(|c| c.owner.defining).unwrap_or(&[])
    }

    /// Runs the ancestor constructor with positional arguments
    pub fn init<V>(self, args: impl IntoIterator<Item = V>) -> Result<(), FrozenError>
    where
        V: Into<Value>,
    {
        let args = Args::positional(self.target, self.defining(), args.into_iter().map(Into::into))?;
        self.run(args)
    }

    /// Runs the ancestor constructor with named arguments
    pub fn init_with<K, V>(self, args: impl IntoIterator<Item = (K, V)>) -> Result<(), FrozenError>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let args = Args::named(self.target, self.defining(), args)?;
        self.run(args)
    }

    fn run(self, args: Args) -> Result<(), FrozenError> {
        let Some(constructor) = self.constructor else {
            // nothing left to delegate to
            return Ok(());
        };
        trace!(
            "{}: running {} constructor",
            self.partial.path(),
            constructor.owner.name
        );
        self.partial.frames.push(constructor.owner);
        let result = (constructor.func)(self.partial, &args);
        self.partial.frames.pop();
        result
    }
}

/// Arguments for a constructor: one value per defining field, in
/// defining-field order.
#[derive(Clone, Debug, PartialEq)]
pub struct Args {
    type_name: &'static str,
    entries: Vec<(&'static str, Value)>,
}

impl Args {
    pub(crate) fn positional(
        descriptor: &'static TypeDescriptor,
        names: &'static [&'static str],
        values: impl Iterator<Item = Value>,
    ) -> Result<Self, FrozenError> {
        let values: Vec<Value> = values.collect();
        if values.len() != names.len() {
            return Err(FrozenError::ArityMismatch {
                type_name: descriptor.name,
                expected: names.len(),
                actual: values.len(),
            });
        }
        Ok(Self {
            type_name: descriptor.name,
            entries: names.iter().copied().zip(values).collect(),
        })
    }

    pub(crate) fn named<K, V>(
        descriptor: &'static TypeDescriptor,
        names: &'static [&'static str],
        args: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Self, FrozenError>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; names.len()];
        for (name, value) in args {
            let name = name.as_ref();
            let index = names.iter().position(|n| *n == name).ok_or_else(|| {
                FrozenError::UnexpectedArgument {
                    type_name: descriptor.name,
                    name: name.into(),
                }
            })?;
            slots[index] = Some(value.into());
        }

        let mut entries = Vec::with_capacity(names.len());
        for (name, slot) in names.iter().copied().zip(slots) {
            let value = slot.ok_or_else(|| FrozenError::MissingArgument {
                type_name: descriptor.name,
                name: name.into(),
            })?;
            entries.push((name, value));
        }
        Ok(Self {
            type_name: descriptor.name,
            entries,
        })
    }

    /// Returns the argument for a defining field
    pub fn get(&self, name: &str) -> Result<&Value, FrozenError> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
            .ok_or_else(|| FrozenError::MissingArgument {
                type_name: self.type_name,
                name: name.into(),
            })
    }

    /// Returns the argument at a position
    pub fn nth(&self, index: usize) -> Option<&Value> {
        self.entries.get(index).map(|(_, v)| v)
    }

    /// Iterates over `(name, value)` pairs in defining-field order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no arguments
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests;
