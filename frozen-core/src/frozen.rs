use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

use crate::partial::Record;
use crate::{
    Catalog, ConstructionState, FrozenError, Partial, TypeDescriptor, UpdateTargetReason, Value,
    ValueKind, WriteOp,
};

/// A constructed, permanently immutable instance.
///
/// Cloning is cheap and shares the same frozen record. Reads need no
/// synchronization, so a `Frozen` can be handed to any number of threads.
#[derive(Clone)]
pub struct Frozen {
    record: Arc<Record>,
}

impl Frozen {
    pub(crate) fn from_record(record: Record) -> Self {
        debug_assert_eq!(record.state, ConstructionState::Frozen);
        Self {
            record: Arc::new(record),
        }
    }

    /// The exact type of this instance
    #[inline]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.record.catalog.descriptor()
    }

    /// The resolved catalog of the exact type
    #[inline]
    pub fn catalog(&self) -> &'static Catalog {
        self.record.catalog
    }

    /// Always [`ConstructionState::Frozen`]
    #[inline]
    pub fn state(&self) -> ConstructionState {
        self.record.state
    }

    /// Reads a field. `None` if the name is unknown or was never set.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.fields.get(name)
    }

    /// Reads a field, distinguishing unknown names from data fields the
    /// constructor left unset.
    pub fn field(&self, name: &str) -> Result<&Value, FrozenError> {
        if let Some(value) = self.record.fields.get(name) {
            return Ok(value);
        }
        match self.record.catalog.intern(name) {
            Some(field) => Err(FrozenError::UninitializedField {
                type_name: self.record.type_name(),
                field,
            }),
            None => Err(FrozenError::UnknownField {
                type_name: self.record.type_name(),
                field: name.into(),
            }),
        }
    }

    /// Every stored field, in catalog order
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.record.fields.iter().map(|(name, value)| (*name, value))
    }

    /// The defining fields, in defining-field order
    pub fn defining_values(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.record
            .catalog
            .defining()
            .iter()
            .filter_map(|name| self.record.fields.get(*name).map(|value| (*name, value)))
    }

    /// Number of stored fields
    pub fn len(&self) -> usize {
        self.record.fields.len()
    }

    /// Returns true if no field is stored
    pub fn is_empty(&self) -> bool {
        self.record.fields.is_empty()
    }

    /// Returns true if both handles share the same record
    pub fn ptr_eq(&self, other: &Frozen) -> bool {
        Arc::ptr_eq(&self.record, &other.record)
    }

    /// Feeds the type identity and the defining values into `state`. On
    /// failure, returns the first defining field that cannot be hashed.
    pub fn hash_identity<H: Hasher>(&self, state: &mut H) -> Result<(), (&'static str, ValueKind)> {
        self.descriptor().hash(state);
        for (name, value) in self.defining_values() {
            value.hash_into(state).map_err(|kind| (name, kind))?;
        }
        Ok(())
    }

    /// Hashes the instance from its exact type and defining values.
    ///
    /// Fails with [`FrozenError::NotHashable`] if a defining value is (or
    /// contains) a list or a map. Construction never checks this.
    pub fn try_hash(&self) -> Result<u64, FrozenError> {
        let mut hasher = std::hash::DefaultHasher::new();
        self.hash_identity(&mut hasher)
            .map_err(|(field, kind)| FrozenError::NotHashable {
                type_name: self.record.type_name(),
                field,
                kind,
            })?;
        Ok(hasher.finish())
    }

    /// Attempts to set a field. Always fails with
    /// [`FrozenError::ImmutabilityViolation`], leaving the instance unchanged.
    pub fn set(&self, name: &str, _value: impl Into<Value>) -> Result<(), FrozenError> {
        self.record.gate(WriteOp::Set, name)
    }

    /// Attempts to remove a field. Always fails with
    /// [`FrozenError::ImmutabilityViolation`].
    pub fn remove(&self, name: &str) -> Result<Option<Value>, FrozenError> {
        self.record.gate(WriteOp::Remove, name).map(|()| None)
    }

    /// Attempts to run an ancestor constructor against this instance. Always
    /// fails with [`FrozenError::ImmutabilityViolation`].
    pub fn init_ancestor(&self, ancestor: &'static TypeDescriptor) -> Result<(), FrozenError> {
        self.record.gate(WriteOp::AncestorInit, ancestor.name)
    }

    /// Builds a new instance by merging `changes` onto this instance's
    /// defining values and running the constructor again, so data fields are
    /// re-derived. The receiver is untouched.
    ///
    /// Every name must be a defining field of the exact type; otherwise
    /// [`FrozenError::InvalidUpdateTarget`] is returned before anything runs.
    pub fn update<K, V>(&self, changes: impl IntoIterator<Item = (K, V)>) -> Result<Frozen, FrozenError>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let catalog = self.record.catalog;
        let changes = self.validate(changes, |name| {
            if catalog.is_defining(name) {
                None
            } else {
                Some(UpdateTargetReason::DataField)
            }
        })?;

        let mut values: Vec<Value> = self.defining_values().map(|(_, v)| v.clone()).collect();
        for (name, value) in changes {
            if let Some(index) = catalog.defining().iter().position(|n| *n == name) {
                values[index] = value;
            }
        }
        trace!("Updating {} through its constructor", self.record.type_name());
        self.descriptor().construct(values)
    }

    /// Builds a new instance by copying every stored field and overwriting
    /// the named ones verbatim. No constructor runs, so derived data fields
    /// are not recomputed. The receiver is untouched.
    ///
    /// Names may be any field of the exact type; unknown names fail with
    /// [`FrozenError::InvalidUpdateTarget`] before anything is built.
    pub fn replace<K, V>(&self, changes: impl IntoIterator<Item = (K, V)>) -> Result<Frozen, FrozenError>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let changes = self.validate(changes, |_| None)?;
        let current = self.fields().map(|(name, value)| (name, value.clone()));
        let partial = Partial::preload(self.record.catalog, current.chain(changes))?;
        trace!("Replaced fields on a copy of {}", self.record.type_name());
        partial.freeze()
    }

    fn validate<K, V>(
        &self,
        changes: impl IntoIterator<Item = (K, V)>,
        refuse: impl Fn(&str) -> Option<UpdateTargetReason>,
    ) -> Result<Vec<(&'static str, Value)>, FrozenError>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        changes
            .into_iter()
            .map(|(name, value)| {
                let name = name.as_ref();
                let invalid = |reason| FrozenError::InvalidUpdateTarget {
                    type_name: self.record.type_name(),
                    field: name.into(),
                    reason,
                };
                let field = self
                    .record
                    .catalog
                    .intern(name)
                    .ok_or_else(|| invalid(UpdateTargetReason::UnknownField))?;
                match refuse(field) {
                    Some(reason) => Err(invalid(reason)),
                    None => Ok((field, value.into())),
                }
            })
            .collect()
    }
}

impl PartialEq for Frozen {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        self.descriptor() == other.descriptor()
            && self.defining_values().map(|(_, v)| v).eq(other.defining_values().map(|(_, v)| v))
    }
}

impl core::fmt::Display for Frozen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}(", self.descriptor().name)?;
        for (index, (name, value)) in self.defining_values().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        write!(f, ")")
    }
}

impl core::fmt::Debug for Frozen {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut s = f.debug_struct(self.descriptor().name);
        for (name, value) in self.fields() {
            s.field(name, value);
        }
        s.finish()
    }
}

/// A frozen instance known to be hashable, usable as a `HashMap` or
/// `HashSet` key. The hash is computed once, on conversion.
#[derive(Clone, Debug)]
pub struct HashKey {
    frozen: Frozen,
    hash: u64,
}

impl HashKey {
    /// The wrapped instance
    pub fn get(&self) -> &Frozen {
        &self.frozen
    }

    /// Unwraps the instance
    pub fn into_inner(self) -> Frozen {
        self.frozen
    }
}

impl TryFrom<Frozen> for HashKey {
    type Error = FrozenError;

    fn try_from(frozen: Frozen) -> Result<Self, Self::Error> {
        let hash = frozen.try_hash()?;
        Ok(Self { frozen, hash })
    }
}

impl PartialEq for HashKey {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash && self.frozen == other.frozen
    }
}

// NaN defining values are the one exception to reflexivity, as with `f64`.
impl Eq for HashKey {}

impl Hash for HashKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Args, ConstructionState, FrozenError, HashKey, Partial, TypeDescriptor, UpdateTargetReason,
        Value, ValueKind, WriteOp,
    };

    fn person_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
        let first = args.get("first")?.try_str()?;
        let last = args.get("last")?.try_str()?;
        let full = format!("{last}, {first}");
        this.assign_args(args)?.set("full", full)?;
        Ok(())
    }

    static PERSON: TypeDescriptor = TypeDescriptor::builder("Person")
        .defining(&["first", "last"])
        .data(&["full", "nickname"])
        .constructor(person_init)
        .build();

    #[test]
    fn writes_after_freeze_are_rejected() {
        let p = PERSON.construct(["John", "Smith"]).unwrap();
        assert_eq!(p.state(), ConstructionState::Frozen);

        let err = p.set("first", "Jane").unwrap_err();
        assert!(matches!(
            err,
            FrozenError::ImmutabilityViolation { op: WriteOp::Set, .. }
        ));
        // a brand-new name is rejected the same way
        assert!(p.set("age", 3).is_err());
        assert!(matches!(
            p.remove("full").unwrap_err(),
            FrozenError::ImmutabilityViolation { op: WriteOp::Remove, .. }
        ));
        assert_eq!(p.get("first"), Some(&Value::from("John")));
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn shared_handles_reject_writes_too() {
        let p = PERSON.construct(["John", "Smith"]).unwrap();
        let alias = p.clone();
        assert!(alias.ptr_eq(&p));
        assert!(alias.set("first", "Jane").is_err());
        assert_eq!(p.get("first"), Some(&Value::from("John")));
    }

    #[test]
    fn field_distinguishes_unknown_from_unset() {
        let p = PERSON.construct(["John", "Smith"]).unwrap();
        assert!(matches!(
            p.field("nickname").unwrap_err(),
            FrozenError::UninitializedField { field: "nickname", .. }
        ));
        assert!(matches!(
            p.field("age").unwrap_err(),
            FrozenError::UnknownField { .. }
        ));
        assert_eq!(p.field("full").unwrap(), &Value::from("Smith, John"));
    }

    #[test]
    fn data_fields_do_not_affect_identity() {
        let a = PERSON.construct(["John", "Smith"]).unwrap();
        let b = a.replace(fields! { full: "whatever" }).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.try_hash().unwrap(), b.try_hash().unwrap());

        let c = a.update(fields! { first: "Jane" }).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn unhashable_defining_value_fails_at_hash_time() {
        let p = PERSON
            .construct_with([("first", Value::from("x")), ("last", Value::List(vec![]))])
            .unwrap_err();
        // the constructor wants a string, so this fails in the body
        assert!(matches!(p, FrozenError::WrongKind { actual: ValueKind::List, .. }));

        let p = PERSON.construct(["John", "Smith"]).unwrap();
        let weird = p.replace(fields! { last: vec![Value::Int(1)] }).unwrap();
        let err = weird.try_hash().unwrap_err();
        assert!(matches!(
            err,
            FrozenError::NotHashable { field: "last", kind: ValueKind::List, .. }
        ));
        assert!(HashKey::try_from(weird).is_err());
    }

    #[test]
    fn update_rejects_data_fields() {
        let p = PERSON.construct(["John", "Smith"]).unwrap();
        let err = p.update(fields! { full: "x" }).unwrap_err();
        assert!(matches!(
            err,
            FrozenError::InvalidUpdateTarget { reason: UpdateTargetReason::DataField, .. }
        ));
        let err = p.update(fields! { age: 3 }).unwrap_err();
        assert!(matches!(
            err,
            FrozenError::InvalidUpdateTarget { reason: UpdateTargetReason::UnknownField, .. }
        ));
    }

    #[test]
    fn display_and_debug() {
        let p = PERSON.construct(["John", "Smith"]).unwrap();
        assert_eq!(p.to_string(), r#"Person(first="John", last="Smith")"#);
        assert_eq!(
            format!("{p:?}"),
            r#"Person { first: Str("John"), last: Str("Smith"), full: Str("Smith, John") }"#
        );
    }
}
