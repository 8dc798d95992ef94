use frozen_core::{Frozen, FrozenError, Value, ValueKind};

use crate::{ListLikeKind, PeekFrozen, PeekListLike, PeekMap};

/// A read-only view over a single field value
#[derive(Clone, Copy)]
pub struct Peek<'mem> {
    value: &'mem Value,
}

impl core::fmt::Debug for Peek<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self.value, f)
    }
}

impl core::fmt::Display for Peek<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(self.value, f)
    }
}

impl<'mem> Peek<'mem> {
    /// Creates a view over `value`
    #[inline]
    pub fn new(value: &'mem Value) -> Self {
        Self { value }
    }

    /// The underlying value
    #[inline(always)]
    pub fn value(&self) -> &'mem Value {
        self.value
    }

    /// The kind of the underlying value
    #[inline]
    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Views a nested record
    pub fn into_record(self) -> Result<PeekFrozen<'mem>, FrozenError> {
        Ok(PeekFrozen::new(self.value.try_record()?))
    }

    /// Views a tuple or a list
    pub fn into_list_like(self) -> Result<PeekListLike<'mem>, FrozenError> {
        match self.value {
            Value::Tuple(items) => Ok(PeekListLike::new(items, ListLikeKind::Tuple)),
            Value::List(items) => Ok(PeekListLike::new(items, ListLikeKind::List)),
            other => Err(FrozenError::WrongKind {
                expected: ValueKind::List,
                actual: other.kind(),
            }),
        }
    }

    /// Views a map
    pub fn into_map(self) -> Result<PeekMap<'mem>, FrozenError> {
        match self.value {
            Value::Map(entries) => Ok(PeekMap::new(entries)),
            other => Err(FrozenError::WrongKind {
                expected: ValueKind::Map,
                actual: other.kind(),
            }),
        }
    }
}

impl<'mem> From<&'mem Value> for Peek<'mem> {
    fn from(value: &'mem Value) -> Self {
        Self::new(value)
    }
}

impl<'mem> From<&'mem Frozen> for PeekFrozen<'mem> {
    fn from(frozen: &'mem Frozen) -> Self {
        Self::new(frozen)
    }
}
