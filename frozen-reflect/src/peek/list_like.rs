use frozen_core::Value;

use crate::Peek;

/// Whether a sequence is a (hashable when its items are) tuple or a list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLikeKind {
    /// `Value::Tuple`
    Tuple,
    /// `Value::List`
    List,
}

/// Lets you read from a tuple or a list
#[derive(Clone, Copy)]
pub struct PeekListLike<'mem> {
    items: &'mem [Value],
    kind: ListLikeKind,
}

impl core::fmt::Debug for PeekListLike<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PeekListLike")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl<'mem> PeekListLike<'mem> {
    pub(crate) fn new(items: &'mem [Value], kind: ListLikeKind) -> Self {
        Self { items, kind }
    }

    /// Tuple or list
    #[inline]
    pub fn kind(&self) -> ListLikeKind {
        self.kind
    }

    /// Number of items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no items
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`, if in bounds
    pub fn get(&self, index: usize) -> Option<Peek<'mem>> {
        self.items.get(index).map(Peek::new)
    }

    /// Iterates over the items
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Peek<'mem>> + 'mem {
        self.items.iter().map(Peek::new)
    }
}
