use alloc::string::String;
use alloc::vec::Vec;
use core::hash::{Hash, Hasher};

use crate::{Frozen, FrozenError};

/// A field value.
///
/// Values are owned by the instance that stores them; nothing is deep-copied
/// behind the caller's back, and a nested [`Frozen`] record is shared, not
/// cloned.
#[derive(Clone, Debug)]
pub enum Value {
    /// The unit value `()`
    Unit,
    /// A boolean
    Bool(bool),
    /// A signed integer
    Int(i64),
    /// A floating-point number
    Float(f64),
    /// A string
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// A fixed sequence; hashable when every element is
    Tuple(Vec<Value>),
    /// A list; never hashable
    List(Vec<Value>),
    /// An association list; never hashable
    Map(Vec<(Value, Value)>),
    /// A nested immutable instance
    Record(Frozen),
}

/// The kind of a [`Value`], without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ValueKind {
    /// `Value::Unit`
    Unit,
    /// `Value::Bool`
    Bool,
    /// `Value::Int`
    Int,
    /// `Value::Float`
    Float,
    /// `Value::Str`
    Str,
    /// `Value::Bytes`
    Bytes,
    /// `Value::Tuple`
    Tuple,
    /// `Value::List`
    List,
    /// `Value::Map`
    Map,
    /// `Value::Record`
    Record,
}

impl core::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            ValueKind::Unit => "unit",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::Bytes => "bytes",
            ValueKind::Tuple => "tuple",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Record => "record",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Returns the kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Unit => ValueKind::Unit,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::List(_) => ValueKind::List,
            Value::Map(_) => ValueKind::Map,
            Value::Record(_) => ValueKind::Record,
        }
    }

    /// Returns true if [`Value::hash_into`] would succeed
    pub fn is_hashable(&self) -> bool {
        match self {
            Value::List(_) | Value::Map(_) => false,
            Value::Tuple(items) => items.iter().all(Value::is_hashable),
            Value::Record(record) => record.defining_values().all(|(_, v)| v.is_hashable()),
            _ => true,
        }
    }

    /// Feeds this value into `state`.
    ///
    /// On failure, returns the kind of the innermost value that could not be
    /// hashed; `state` may then hold a partial write and should be dropped.
    pub fn hash_into<H: Hasher>(&self, state: &mut H) -> Result<(), ValueKind> {
        core::mem::discriminant(self).hash(state);
        match self {
            Value::Unit => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(x) => {
                // 0.0 == -0.0, so they must hash alike
                let x = if *x == 0.0 { 0.0f64 } else { *x };
                x.to_bits().hash(state)
            }
            Value::Str(s) => s.hash(state),
            Value::Bytes(b) => b.hash(state),
            Value::Tuple(items) => {
                items.len().hash(state);
                for item in items {
                    item.hash_into(state)?;
                }
            }
            Value::Record(record) => record.hash_identity(state).map_err(|(_, kind)| kind)?,
            Value::List(_) | Value::Map(_) => return Err(self.kind()),
        }
        Ok(())
    }

    /// Returns the boolean, if this is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer, if this is one
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the number as a float; integers are widened
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the string, if this is one
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the bytes, if this is a byte string
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the elements of a tuple or list
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) | Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries of a map
    pub fn as_entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the nested record, if this is one
    pub fn as_record(&self) -> Option<&Frozen> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Like [`Value::as_bool`], but reports the kind mismatch
    pub fn try_bool(&self) -> Result<bool, FrozenError> {
        self.as_bool().ok_or_else(|| self.wrong_kind(ValueKind::Bool))
    }

    /// Like [`Value::as_int`], but reports the kind mismatch
    pub fn try_int(&self) -> Result<i64, FrozenError> {
        self.as_int().ok_or_else(|| self.wrong_kind(ValueKind::Int))
    }

    /// Like [`Value::as_float`], but reports the kind mismatch
    pub fn try_float(&self) -> Result<f64, FrozenError> {
        self.as_float().ok_or_else(|| self.wrong_kind(ValueKind::Float))
    }

    /// Like [`Value::as_str`], but reports the kind mismatch
    pub fn try_str(&self) -> Result<&str, FrozenError> {
        self.as_str().ok_or_else(|| self.wrong_kind(ValueKind::Str))
    }

    /// Like [`Value::as_record`], but reports the kind mismatch
    pub fn try_record(&self) -> Result<&Frozen, FrozenError> {
        self.as_record().ok_or_else(|| self.wrong_kind(ValueKind::Record))
    }

    fn wrong_kind(&self, expected: ValueKind) -> FrozenError {
        FrozenError::WrongKind {
            expected,
            actual: self.kind(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Unit => write!(f, "()"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Bytes(b) => write!(f, "b\"{}\"", b.escape_ascii()),
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Record(record) => write!(f, "{record}"),
        }
    }
}

fn write_items(f: &mut core::fmt::Formatter<'_>, items: &[Value]) -> core::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(value: $ty) -> Self {
                    Value::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Unit
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

impl From<Frozen> for Value {
    fn from(value: Frozen) -> Self {
        Value::Record(value)
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<Value>, B: Into<Value>, C: Into<Value>> From<(A, B, C)> for Value {
    fn from((a, b, c): (A, B, C)) -> Self {
        Value::Tuple(vec![a.into(), b.into(), c.into()])
    }
}
