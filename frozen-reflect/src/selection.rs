use frozen_core::Field;

/// Which fields a dictionary export or serializer includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FieldSelection {
    /// Only the effective defining fields (the instance's identity)
    Defining,
    /// Defining and data fields
    #[default]
    All,
}

impl FieldSelection {
    /// Returns true if `field` is part of this selection
    #[inline]
    pub fn includes(self, field: &Field) -> bool {
        match self {
            FieldSelection::Defining => field.is_defining(),
            FieldSelection::All => true,
        }
    }
}
