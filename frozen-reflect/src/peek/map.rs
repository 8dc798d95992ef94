use frozen_core::Value;

use crate::Peek;

/// Lets you read from a map, in insertion order
#[derive(Clone, Copy)]
pub struct PeekMap<'mem> {
    entries: &'mem [(Value, Value)],
}

impl core::fmt::Debug for PeekMap<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PeekMap").finish_non_exhaustive()
    }
}

impl<'mem> PeekMap<'mem> {
    pub(crate) fn new(entries: &'mem [(Value, Value)]) -> Self {
        Self { entries }
    }

    /// Number of entries
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks a key up. Linear, and the last matching entry wins.
    pub fn get(&self, key: &Value) -> Option<Peek<'mem>> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| Peek::new(v))
    }

    /// Iterates over `(key, value)` entries
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Peek<'mem>, Peek<'mem>)> + 'mem {
        self.entries.iter().map(|(k, v)| (Peek::new(k), Peek::new(v)))
    }
}
