use alloc::string::String;
use alloc::sync::Arc;

use owo_colors::OwoColorize;

use crate::ValueKind;

/// The kind of write that was attempted on an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum WriteOp {
    /// Assigning a field
    Set,
    /// Removing a field
    Remove,
    /// Running an ancestor constructor against the instance
    AncestorInit,
}

impl core::fmt::Display for WriteOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WriteOp::Set => write!(f, "set"),
            WriteOp::Remove => write!(f, "remove"),
            WriteOp::AncestorInit => write!(f, "run ancestor constructor"),
        }
    }
}

/// Why a field name was refused by `update` or `replace`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum UpdateTargetReason {
    /// The name is not a field of the type at all
    UnknownField,
    /// `update` only accepts defining fields; this one is a data field
    DataField,
}

/// Errors raised while declaring, constructing, comparing or rebuilding
/// immutable instances.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum FrozenError {
    /// A write reached an instance that is already frozen.
    ImmutabilityViolation {
        /// The exact type of the instance
        type_name: &'static str,
        /// What was attempted
        op: WriteOp,
        /// The field (or ancestor type) the write targeted
        target: String,
    },

    /// `update`/`replace` named a field it may not touch. Raised before any
    /// new instance is built.
    InvalidUpdateTarget {
        /// The exact type of the receiver
        type_name: &'static str,
        /// The offending field name
        field: String,
        /// Why the field was refused
        reason: UpdateTargetReason,
    },

    /// Hashing reached a defining field whose value cannot be hashed.
    NotHashable {
        /// The exact type of the instance
        type_name: &'static str,
        /// The first defining field that could not be hashed
        field: &'static str,
        /// The kind of the value that could not be hashed
        kind: ValueKind,
    },

    /// A defining field had no argument.
    MissingArgument {
        /// The type being constructed
        type_name: &'static str,
        /// The missing argument
        name: String,
    },

    /// An argument does not name a defining field.
    UnexpectedArgument {
        /// The type being constructed
        type_name: &'static str,
        /// The unexpected argument
        name: String,
    },

    /// Positional construction got the wrong number of arguments.
    ArityMismatch {
        /// The type being constructed
        type_name: &'static str,
        /// Number of defining fields
        expected: usize,
        /// Number of arguments given
        actual: usize,
    },

    /// A field name outside the type's catalog was written or read.
    UnknownField {
        /// The type of the instance
        type_name: &'static str,
        /// The unknown name
        field: String,
    },

    /// A defining field was never assigned by the time the instance froze.
    UninitializedField {
        /// The type of the instance
        type_name: &'static str,
        /// The field that wasn't initialized
        field: &'static str,
    },

    /// Ancestor access named a type that is not in the instance's ancestor chain.
    NotAnAncestor {
        /// The type being constructed
        type_name: &'static str,
        /// The type that was named
        ancestor: &'static str,
    },

    /// Ancestor access asked for the next ancestor, but there is none.
    NoParent {
        /// The type whose constructor asked
        type_name: &'static str,
    },

    /// The declared parents admit no consistent linearization (or are cyclic).
    InconsistentHierarchy {
        /// The type whose ancestor chain could not be resolved
        type_name: &'static str,
    },

    /// A typed accessor found a value of another kind.
    WrongKind {
        /// The kind that was asked for
        expected: ValueKind,
        /// The kind that was found
        actual: ValueKind,
    },

    /// Another descriptor is already registered under this name.
    DuplicateType {
        /// The contested name
        type_name: &'static str,
    },

    /// No descriptor is registered under this name.
    UnknownType {
        /// The name that was looked up
        type_name: String,
    },

    /// A constructor body failed with its own error.
    Constructor {
        /// The type whose constructor failed
        type_name: &'static str,
        /// The error raised by the constructor body
        source: Arc<dyn core::error::Error + Send + Sync>,
    },
}

impl FrozenError {
    /// Wraps an error raised inside a constructor body.
    pub fn constructor<E>(type_name: &'static str, error: E) -> Self
    where
        E: core::error::Error + Send + Sync + 'static,
    {
        FrozenError::Constructor {
            type_name,
            source: Arc::new(error),
        }
    }

    /// Builds a constructor error from a plain message.
    pub fn constructor_msg(type_name: &'static str, message: impl Into<String>) -> Self {
        FrozenError::Constructor {
            type_name,
            source: Arc::new(Message(message.into())),
        }
    }
}

#[derive(Debug)]
struct Message(String);

impl core::fmt::Display for Message {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::error::Error for Message {}

impl core::fmt::Display for FrozenError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            FrozenError::ImmutabilityViolation {
                type_name,
                op,
                target,
            } => write!(
                f,
                "Cannot {} '{}' on frozen instance of {}",
                op,
                target.yellow(),
                type_name.blue()
            ),
            FrozenError::InvalidUpdateTarget {
                type_name,
                field,
                reason,
            } => match reason {
                UpdateTargetReason::UnknownField => write!(
                    f,
                    "'{}' is not a field of {}",
                    field.red(),
                    type_name.blue()
                ),
                UpdateTargetReason::DataField => write!(
                    f,
                    "'{}' is a data field of {}; update only accepts defining fields (use replace)",
                    field.red(),
                    type_name.blue()
                ),
            },
            FrozenError::NotHashable {
                type_name,
                field,
                kind,
            } => write!(
                f,
                "{} is not hashable: defining field '{}' holds an unhashable {}",
                type_name.blue(),
                field.yellow(),
                kind.red()
            ),
            FrozenError::MissingArgument { type_name, name } => write!(
                f,
                "{} requires argument '{}'",
                type_name.blue(),
                name.red()
            ),
            FrozenError::UnexpectedArgument { type_name, name } => write!(
                f,
                "{} got unexpected argument '{}'",
                type_name.blue(),
                name.red()
            ),
            FrozenError::ArityMismatch {
                type_name,
                expected,
                actual,
            } => write!(
                f,
                "{} takes {} argument(s), got {}",
                type_name.blue(),
                expected.green(),
                actual.red()
            ),
            FrozenError::UnknownField { type_name, field } => {
                write!(f, "{} has no field '{}'", type_name.blue(), field.red())
            }
            FrozenError::UninitializedField { type_name, field } => {
                write!(f, "Field '{}::{}' was not initialized", type_name, field)
            }
            FrozenError::NotAnAncestor {
                type_name,
                ancestor,
            } => write!(
                f,
                "{} is not an ancestor of {}",
                ancestor.red(),
                type_name.blue()
            ),
            FrozenError::NoParent { type_name } => {
                write!(f, "{} has no further ancestor", type_name.blue())
            }
            FrozenError::InconsistentHierarchy { type_name } => write!(
                f,
                "Cannot linearize the ancestors of {}",
                type_name.red()
            ),
            FrozenError::WrongKind { expected, actual } => write!(
                f,
                "Wrong kind: expected {}, but got {}",
                expected.green(),
                actual.red()
            ),
            FrozenError::DuplicateType { type_name } => write!(
                f,
                "Another type is already registered as {}",
                type_name.red()
            ),
            FrozenError::UnknownType { type_name } => {
                write!(f, "No type registered as {}", type_name.red())
            }
            FrozenError::Constructor { type_name, source } => {
                write!(f, "Constructor of {} failed: {}", type_name.blue(), source)
            }
        }
    }
}

impl core::error::Error for FrozenError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            FrozenError::Constructor { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
