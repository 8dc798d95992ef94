#[cfg(feature = "log")]
macro_rules! trace {
    ($($tt:tt)*) => {
        ::log::trace!($($tt)*)
    };
}

#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($tt:tt)*) => {};
}

/// Builds a list of `(name, Value)` pairs, for keyword construction,
/// `update` and `replace`.
///
/// ```
/// use frozen_core::{Value, fields};
///
/// let changes = fields! { first: "Jane", age: 41 };
/// assert_eq!(changes[0], ("first", Value::from("Jane")));
/// assert_eq!(changes[1], ("age", Value::Int(41)));
/// ```
#[macro_export]
macro_rules! fields {
    ($($name:ident : $value:expr),* $(,)?) => {
        [$((stringify!($name), $crate::Value::from($value))),*]
    };
}

/// Declares an immutable type as a `static` [`TypeDescriptor`](crate::TypeDescriptor).
///
/// Each entry is optional, but entries must appear in this order and end with
/// a comma. `extends` lists the parents, nearest first.
///
/// ```
/// use frozen_core::{Args, FrozenError, Partial, declare_type};
///
/// fn named_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
///     this.assign_args(args)?;
///     Ok(())
/// }
///
/// declare_type! {
///     pub static NAMED: Named {
///         defining: [name],
///         constructor: named_init,
///     }
/// }
///
/// declare_type! {
///     /// Inherits both the defining fields and the constructor of `Named`.
///     pub static TAGGED: Tagged extends [NAMED] {
///         data: [tag],
///     }
/// }
///
/// let tagged = TAGGED.construct(["x"])?;
/// assert_eq!(tagged.descriptor().name, "Tagged");
/// # Ok::<(), FrozenError>(())
/// ```
#[macro_export]
macro_rules! declare_type {
    (
        $(#[$meta:meta])*
        $vis:vis static $ident:ident : $name:ident
        $(extends [$($parent:path),* $(,)?])?
        {
            $(defining: [$($defining:ident),* $(,)?],)?
            $(data: [$($data:ident),* $(,)?],)?
            $(constructor: $constructor:expr,)?
        }
    ) => {
        $(#[$meta])*
        $vis static $ident: $crate::TypeDescriptor = {
            static PARENTS: [
                &$crate::TypeDescriptor;
                <[&str]>::len(&[$($(stringify!($parent)),*)?])
            ] = [$($(&$parent),*)?];
            $crate::TypeDescriptor::builder(stringify!($name))
                .parents(&PARENTS)
                $(.defining(&[$(stringify!($defining)),*]))?
                $(.data(&[$(stringify!($data)),*]))?
                $(.constructor($constructor))?
                .build()
        };
    };
}
