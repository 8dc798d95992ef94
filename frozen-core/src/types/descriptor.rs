use std::sync::OnceLock;

use crate::{Args, Catalog, Frozen, FrozenError, Partial, Value};

/// Signature of a constructor body.
///
/// The body receives the instance under construction and the arguments for the
/// type's defining fields. It may call [`Partial::parent`] or
/// [`Partial::ancestor`] to run ancestor constructors against the same
/// instance; only the outermost call freezes it.
pub type ConstructFn = fn(this: &mut Partial, args: &Args) -> Result<(), FrozenError>;

/// Declaration of an immutable type.
///
/// Descriptors live in `static`s and are compared by address: two descriptors
/// are the same type only if they are the same static.
#[non_exhaustive]
pub struct TypeDescriptor {
    /// Name of the type, used in messages, `Display`, and the registry
    pub name: &'static str,

    /// Declared parents, nearest first
    pub parents: &'static [&'static TypeDescriptor],

    /// This type's own constructor inputs, in parameter order. Empty when the
    /// type declares no constructor (it then inherits the nearest ancestor's).
    pub defining: &'static [&'static str],

    /// Explicitly declared data fields
    pub data: &'static [&'static str],

    /// This type's own constructor, if it declares one
    pub constructor: Option<ConstructFn>,

    /// Doc comment lines
    pub doc: &'static [&'static str],

    catalog: OnceLock<Result<Catalog, FrozenError>>,
}

impl TypeDescriptor {
    /// Returns a builder for a descriptor named `name`
    pub const fn builder(name: &'static str) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder::new(name)
    }

    /// Returns the resolved field catalog, computing it on first use.
    pub fn catalog(&'static self) -> Result<&'static Catalog, FrozenError> {
        self.catalog
            .get_or_init(|| Catalog::resolve(self))
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Returns true if `other` is this type or one of its ancestors
    pub fn is_a(&'static self, other: &'static TypeDescriptor) -> Result<bool, FrozenError> {
        Ok(self.catalog()?.chain().any(|d| core::ptr::eq(d, other)))
    }

    /// Constructs an instance from positional arguments, one per defining
    /// field, in defining-field order.
    pub fn construct<V>(&'static self, args: impl IntoIterator<Item = V>) -> Result<Frozen, FrozenError>
    where
        V: Into<Value>,
    {
        let catalog = self.catalog()?;
        let args = Args::positional(self, catalog.defining(), args.into_iter().map(Into::into))?;
        Partial::run(catalog, args)
    }

    /// Constructs an instance from named arguments.
    pub fn construct_with<K, V>(
        &'static self,
        args: impl IntoIterator<Item = (K, V)>,
    ) -> Result<Frozen, FrozenError>
    where
        K: AsRef<str>,
        V: Into<Value>,
    {
        let catalog = self.catalog()?;
        let args = Args::named(self, catalog.defining(), args)?;
        Partial::run(catalog, args)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}

impl Eq for TypeDescriptor {}

impl core::hash::Hash for TypeDescriptor {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        core::ptr::hash(self, state)
    }
}

impl core::fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

impl core::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field(
                "parents",
                &self.parents.iter().map(|p| p.name).collect::<Vec<_>>(),
            )
            .field("defining", &self.defining)
            .field("data", &self.data)
            .field("constructor", &self.constructor.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for [`TypeDescriptor`]
pub struct TypeDescriptorBuilder {
    name: &'static str,
    parents: &'static [&'static TypeDescriptor],
    defining: &'static [&'static str],
    data: &'static [&'static str],
    constructor: Option<ConstructFn>,
    doc: &'static [&'static str],
}

impl TypeDescriptorBuilder {
    /// Creates a new builder with no parents, fields or constructor
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            parents: &[],
            defining: &[],
            data: &[],
            constructor: None,
            doc: &[],
        }
    }

    /// Sets the parents, nearest first
    #[inline]
    pub const fn parents(mut self, parents: &'static [&'static TypeDescriptor]) -> Self {
        self.parents = parents;
        self
    }

    /// Sets the defining fields (the constructor's parameter names, in order)
    #[inline]
    pub const fn defining(mut self, defining: &'static [&'static str]) -> Self {
        self.defining = defining;
        self
    }

    /// Sets the declared data fields
    #[inline]
    pub const fn data(mut self, data: &'static [&'static str]) -> Self {
        self.data = data;
        self
    }

    /// Sets the constructor body
    #[inline]
    pub const fn constructor(mut self, constructor: ConstructFn) -> Self {
        self.constructor = Some(constructor);
        self
    }

    /// Sets the doc comment lines
    #[inline]
    pub const fn doc(mut self, doc: &'static [&'static str]) -> Self {
        self.doc = doc;
        self
    }

    /// Builds the descriptor.
    ///
    /// # Panics
    ///
    /// Panics if defining fields are declared without a constructor: defining
    /// fields are the constructor's parameters, so they can't exist on their own.
    #[inline]
    pub const fn build(self) -> TypeDescriptor {
        if self.constructor.is_none() && !self.defining.is_empty() {
            panic!("defining fields require a constructor");
        }
        TypeDescriptor {
            name: self.name,
            parents: self.parents,
            defining: self.defining,
            data: self.data,
            constructor: self.constructor,
            doc: self.doc,
            catalog: OnceLock::new(),
        }
    }
}
