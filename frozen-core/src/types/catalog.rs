use indexmap::IndexMap;

use super::{ConstructFn, Field, FieldFlags, TypeDescriptor};
use crate::FrozenError;

/// The constructor a type actually runs, and the descriptor that declares it.
#[derive(Clone, Copy, Debug)]
pub struct Constructor {
    /// The descriptor that declares this constructor
    pub owner: &'static TypeDescriptor,
    /// The constructor body
    pub func: ConstructFn,
}

/// The resolved view of a [`TypeDescriptor`]: its linearized ancestor chain,
/// its effective defining fields and constructor, and its full field set.
///
/// Name collisions across the chain are resolved by override, never rejected:
/// the declaration nearest to the exact type wins the role and ownership of
/// the name, and the field keeps the slot where it was first declared
/// (root-most ancestor first).
#[derive(Debug)]
pub struct Catalog {
    descriptor: &'static TypeDescriptor,
    chain: Vec<&'static TypeDescriptor>,
    defining: &'static [&'static str],
    constructor: Option<Constructor>,
    fields: IndexMap<&'static str, Field>,
}

impl Catalog {
    pub(crate) fn resolve(descriptor: &'static TypeDescriptor) -> Result<Self, FrozenError> {
        let chain = linearize(descriptor, &mut Vec::new())?;

        let constructor = chain.iter().find_map(|owner| {
            owner.constructor.map(|func| Constructor { owner, func })
        });
        let defining = constructor.map(|c| c.owner.defining).unwrap_or(&[]);

        let mut fields: IndexMap<&'static str, Field> = IndexMap::new();
        for owner in chain.iter().rev().copied() {
            for &name in owner.defining.iter().chain(owner.data) {
                match fields.get_mut(name) {
                    Some(field) => {
                        // last write wins, but the slot stays where it was
                        field.owner = owner;
                        field.flags |= FieldFlags::OVERRIDDEN;
                    }
                    None => {
                        fields.insert(
                            name,
                            Field {
                                name,
                                flags: FieldFlags::EMPTY,
                                owner,
                            },
                        );
                    }
                }
            }
        }

        for field in fields.values_mut() {
            field.flags |= if defining.contains(&field.name) {
                FieldFlags::DEFINING
            } else {
                FieldFlags::DATA
            };
            if !core::ptr::eq(field.owner, descriptor) {
                field.flags |= FieldFlags::INHERITED;
            }
        }

        trace!(
            "Resolved {} with chain [{}] and {} field(s)",
            descriptor.name,
            chain.iter().map(|d| d.name).collect::<Vec<_>>().join(", "),
            fields.len()
        );

        Ok(Self {
            descriptor,
            chain,
            defining,
            constructor,
            fields,
        })
    }

    /// The exact type this catalog describes
    #[inline]
    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    /// The linearized chain: the type itself first, then its ancestors,
    /// nearest first
    pub fn chain(&self) -> impl Iterator<Item = &'static TypeDescriptor> + '_ {
        self.chain.iter().copied()
    }

    /// The ancestors only, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &'static TypeDescriptor> + '_ {
        self.chain.iter().skip(1).copied()
    }

    /// Position of `descriptor` in the chain, if it is the type or an ancestor
    pub fn position(&self, descriptor: &'static TypeDescriptor) -> Option<usize> {
        self.chain.iter().position(|d| core::ptr::eq(*d, descriptor))
    }

    /// The effective defining fields: the type's own constructor parameters,
    /// or those of the nearest ancestor with a constructor
    #[inline]
    pub fn defining(&self) -> &'static [&'static str] {
        self.defining
    }

    /// The effective constructor, if any type in the chain declares one
    #[inline]
    pub fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }

    /// The constructor that runs after `descriptor`'s position in the chain,
    /// and its position. Used for "call my parent" delegation.
    pub(crate) fn constructor_after(&self, position: usize) -> Option<(usize, Constructor)> {
        self.chain
            .iter()
            .enumerate()
            .skip(position + 1)
            .find_map(|(index, owner)| {
                owner
                    .constructor
                    .map(|func| (index, Constructor { owner, func }))
            })
    }

    /// All fields, in catalog order
    pub fn fields(&self) -> impl Iterator<Item = &Field> + '_ {
        self.fields.values()
    }

    /// Number of fields in the full field set
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the full field set is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Looks up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Slot of a field in catalog order
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.get_index_of(name)
    }

    /// Returns true if `name` is in the full field set
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns true if `name` is an effective defining field
    pub fn is_defining(&self, name: &str) -> bool {
        self.defining.contains(&name)
    }

    /// Returns the catalog's own `'static` spelling of `name`
    pub(crate) fn intern(&self, name: &str) -> Option<&'static str> {
        self.fields.get(name).map(|field| field.name)
    }
}

/// C3 linearization of `descriptor` and its parents. `visiting` holds the
/// descriptors currently being linearized, to reject cyclic declarations.
fn linearize(
    descriptor: &'static TypeDescriptor,
    visiting: &mut Vec<&'static TypeDescriptor>,
) -> Result<Vec<&'static TypeDescriptor>, FrozenError> {
    if visiting.iter().any(|d| core::ptr::eq(*d, descriptor)) {
        return Err(FrozenError::InconsistentHierarchy {
            type_name: descriptor.name,
        });
    }
    visiting.push(descriptor);

    let mut sequences = Vec::with_capacity(descriptor.parents.len() + 1);
    for parent in descriptor.parents {
        sequences.push(linearize(parent, visiting)?);
    }
    sequences.push(descriptor.parents.to_vec());
    visiting.pop();

    let mut out = vec![descriptor];
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(out);
        }

        // a good head appears in no sequence's tail
        let head = sequences.iter().map(|seq| seq[0]).find(|candidate| {
            !sequences
                .iter()
                .any(|seq| seq[1..].iter().any(|d| core::ptr::eq(*d, *candidate)))
        });
        let Some(head) = head else {
            return Err(FrozenError::InconsistentHierarchy {
                type_name: descriptor.name,
            });
        };

        out.push(head);
        for seq in &mut sequences {
            if core::ptr::eq(seq[0], head) {
                seq.remove(0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Args, FieldFlags, FrozenError, Partial, TypeDescriptor};

    fn noop(_this: &mut Partial, _args: &Args) -> Result<(), FrozenError> {
        Ok(())
    }

    static BASE: TypeDescriptor = TypeDescriptor::builder("Base")
        .defining(&["id"])
        .data(&["label", "shared"])
        .constructor(noop)
        .build();

    static BASE_ONLY: [&TypeDescriptor; 1] = [&BASE];
    static LEFT: TypeDescriptor = TypeDescriptor::builder("Left")
        .parents(&BASE_ONLY)
        .data(&["left"])
        .build();

    static RIGHT: TypeDescriptor = TypeDescriptor::builder("Right")
        .parents(&BASE_ONLY)
        .defining(&["id", "shared"])
        .constructor(noop)
        .build();

    static DIAMOND_PARENTS: [&TypeDescriptor; 2] = [&LEFT, &RIGHT];
    static DIAMOND: TypeDescriptor = TypeDescriptor::builder("Diamond")
        .parents(&DIAMOND_PARENTS)
        .data(&["label"])
        .build();

    static BAD_PARENTS: [&TypeDescriptor; 2] = [&BASE, &LEFT];
    static BAD: TypeDescriptor = TypeDescriptor::builder("Bad")
        .parents(&BAD_PARENTS)
        .build();

    static PING_PARENTS: [&TypeDescriptor; 1] = [&PONG];
    static PING: TypeDescriptor = TypeDescriptor::builder("Ping")
        .parents(&PING_PARENTS)
        .build();

    static PONG_PARENTS: [&TypeDescriptor; 1] = [&PING];
    static PONG: TypeDescriptor = TypeDescriptor::builder("Pong")
        .parents(&PONG_PARENTS)
        .build();

    fn names(it: impl Iterator<Item = &'static TypeDescriptor>) -> Vec<&'static str> {
        it.map(|d| d.name).collect()
    }

    #[test]
    fn c3_chain_for_diamond() {
        let catalog = DIAMOND.catalog().unwrap();
        assert_eq!(
            names(catalog.chain()),
            ["Diamond", "Left", "Right", "Base"]
        );
        assert_eq!(names(catalog.ancestors()), ["Left", "Right", "Base"]);
    }

    #[test]
    fn inherits_nearest_constructor_and_defining_fields() {
        let left = LEFT.catalog().unwrap();
        assert_eq!(left.defining(), ["id"]);
        assert!(core::ptr::eq(left.constructor().unwrap().owner, &BASE));

        // Left has no constructor, so Right's is the nearest one
        let diamond = DIAMOND.catalog().unwrap();
        assert_eq!(diamond.defining(), ["id", "shared"]);
        assert!(core::ptr::eq(diamond.constructor().unwrap().owner, &RIGHT));
    }

    #[test]
    fn overrides_keep_first_slot() {
        let catalog = DIAMOND.catalog().unwrap();
        let order: Vec<_> = catalog.fields().map(|f| f.name).collect();
        assert_eq!(order, ["id", "label", "shared", "left"]);

        let label = catalog.field("label").unwrap();
        assert!(core::ptr::eq(label.owner, &DIAMOND));
        assert!(label.is_overridden());
        assert!(label.is_data());
        assert!(!label.is_inherited());

        // declared data on Base, promoted to defining by Right's constructor
        let shared = catalog.field("shared").unwrap();
        assert!(shared.is_defining());
        assert!(shared.is_inherited());
        assert_eq!(
            shared.flags,
            FieldFlags::DEFINING | FieldFlags::INHERITED | FieldFlags::OVERRIDDEN
        );
    }

    #[test]
    fn inconsistent_order_is_rejected() {
        let err = BAD.catalog().unwrap_err();
        assert!(matches!(
            err,
            FrozenError::InconsistentHierarchy { type_name: "Bad" }
        ));
        // the failure is cached, not recomputed into a different answer
        assert!(BAD.catalog().is_err());
    }

    #[test]
    fn cyclic_parents_are_rejected() {
        assert!(matches!(
            PING.catalog().unwrap_err(),
            FrozenError::InconsistentHierarchy { type_name: "Ping" }
        ));
        assert!(matches!(
            PONG.catalog().unwrap_err(),
            FrozenError::InconsistentHierarchy { type_name: "Pong" }
        ));
    }
}
