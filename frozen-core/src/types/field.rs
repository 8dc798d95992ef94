use bitflags::bitflags;

use super::TypeDescriptor;

/// One entry of a resolved [`Catalog`](super::Catalog): a field name, the role
/// it plays for the exact type, and the descriptor that declared it last.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub struct Field {
    /// Name of the field
    pub name: &'static str,

    /// Role and provenance of the field
    pub flags: FieldFlags,

    /// The descriptor whose declaration won for this name (the one nearest
    /// to the exact type in the ancestor chain)
    pub owner: &'static TypeDescriptor,
}

impl Field {
    /// Returns true if the field is one of the exact type's constructor inputs
    pub fn is_defining(&self) -> bool {
        self.flags.contains(FieldFlags::DEFINING)
    }

    /// Returns true if the field is auxiliary state set during construction
    pub fn is_data(&self) -> bool {
        self.flags.contains(FieldFlags::DATA)
    }

    /// Returns true if the winning declaration belongs to an ancestor
    pub fn is_inherited(&self) -> bool {
        self.flags.contains(FieldFlags::INHERITED)
    }

    /// Returns true if more than one type in the chain declares this name
    pub fn is_overridden(&self) -> bool {
        self.flags.contains(FieldFlags::OVERRIDDEN)
    }
}

bitflags! {
    /// Role and provenance flags of a catalog field
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldFlags: u8 {
        /// An empty set of flags
        const EMPTY = 0;

        /// The field is a constructor input of the exact type: it takes part
        /// in equality and hashing, and may be named by `update`.
        const DEFINING = 1 << 0;

        /// The field is set during construction but is not a constructor
        /// input. Never part of equality or hashing.
        const DATA = 1 << 1;

        /// The winning declaration comes from an ancestor.
        const INHERITED = 1 << 2;

        /// Several types in the chain declare this name; the one nearest to
        /// the exact type wins, and the field keeps the slot of its first
        /// declaration.
        const OVERRIDDEN = 1 << 3;
    }
}

impl Default for FieldFlags {
    #[inline(always)]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl core::fmt::Display for FieldFlags {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }

        let flags = [
            (FieldFlags::DEFINING, "defining"),
            (FieldFlags::DATA, "data"),
            (FieldFlags::INHERITED, "inherited"),
            (FieldFlags::OVERRIDDEN, "overridden"),
        ];

        let mut is_first = true;
        for (flag, name) in flags {
            if self.contains(flag) {
                if !is_first {
                    write!(f, ", ")?;
                }
                is_first = false;
                write!(f, "{}", name)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::FieldFlags;

    #[test]
    fn flags_display() {
        assert_eq!(FieldFlags::EMPTY.to_string(), "none");
        assert_eq!(FieldFlags::DEFINING.to_string(), "defining");
        assert_eq!(
            (FieldFlags::DATA | FieldFlags::INHERITED | FieldFlags::OVERRIDDEN).to_string(),
            "data, inherited, overridden"
        );
    }
}
