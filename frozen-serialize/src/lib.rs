#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

extern crate alloc;

use alloc::vec::Vec;

use frozen_core::{Frozen, Snapshot, Value};
use frozen_reflect::{FieldSelection, Peek, PeekFrozen, PeekListLike, PeekMap};
use log::debug;

mod debug_serializer;
pub use debug_serializer::*;

/// A trait for implementing format-specific serialization logic.
/// The iterative walk uses this trait to output data.
pub trait Serializer {
    /// The error type returned by serialization methods
    type Error;

    /// Serialize a unit value `()`.
    fn serialize_unit(&mut self) -> Result<(), Self::Error>;

    /// Serialize a boolean value.
    fn serialize_bool(&mut self, value: bool) -> Result<(), Self::Error>;

    /// Serialize a signed 64-bit integer.
    fn serialize_i64(&mut self, value: i64) -> Result<(), Self::Error>;

    /// Serialize a double-precision floating-point value.
    fn serialize_f64(&mut self, value: f64) -> Result<(), Self::Error>;

    /// Serialize a UTF-8 string slice.
    fn serialize_str(&mut self, value: &str) -> Result<(), Self::Error>;

    /// Serialize a raw byte slice.
    fn serialize_bytes(&mut self, value: &[u8]) -> Result<(), Self::Error>;

    /// Begin serializing a frozen instance.
    ///
    /// # Arguments
    ///
    /// * `type_name` - The exact type of the instance.
    /// * `len` - The number of fields that will follow.
    fn start_record(&mut self, type_name: &'static str, len: Option<usize>)
    -> Result<(), Self::Error>;

    /// Signal the end of serializing a frozen instance.
    fn end_record(&mut self) -> Result<(), Self::Error>;

    /// Begin serializing a tuple.
    fn start_tuple(&mut self, len: Option<usize>) -> Result<(), Self::Error>;

    /// Signal the end of serializing a tuple.
    fn end_tuple(&mut self) -> Result<(), Self::Error>;

    /// Begin serializing an array/sequence-like value.
    fn start_array(&mut self, len: Option<usize>) -> Result<(), Self::Error>;

    /// Signal the end of serializing an array/sequence-like value.
    fn end_array(&mut self) -> Result<(), Self::Error>;

    /// Begin serializing a map/dictionary-like value.
    fn start_map(&mut self, len: Option<usize>) -> Result<(), Self::Error>;

    /// Signal the end of serializing a map/dictionary-like value.
    fn end_map(&mut self) -> Result<(), Self::Error>;

    /// Serialize a field name (for records).
    fn serialize_field_name(&mut self, name: &'static str) -> Result<(), Self::Error>;

    /// Called between a map key and its value.
    fn begin_map_value(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Debug)]
enum SerializeTask<'mem> {
    Value(Peek<'mem>),
    Record(PeekFrozen<'mem>),
    RecordFields(PeekFrozen<'mem>),
    Items(PeekListLike<'mem>),
    MapEntries(PeekMap<'mem>),
    FieldName(&'static str),
    MapValue(Peek<'mem>),
    EndRecord,
    EndTuple,
    EndArray,
    EndMap,
}

struct Walk<'mem> {
    stack: Vec<SerializeTask<'mem>>,
    selection: FieldSelection,
}

impl<'mem> Walk<'mem> {
    fn new(selection: FieldSelection) -> Self {
        Self {
            stack: Vec::new(),
            selection,
        }
    }

    fn run<S>(mut self, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        while let Some(task) = self.stack.pop() {
            match task {
                SerializeTask::Value(peek) => {
                    debug!("Serializing a {}", peek.kind());
                    self.value(peek, serializer)?;
                }
                SerializeTask::Record(record) => {
                    let len = record.fields_for_serialize(self.selection).count();
                    debug!("Serializing {} with {len} field(s)", record.descriptor().name);
                    serializer.start_record(record.descriptor().name, Some(len))?;
                    self.stack.push(SerializeTask::EndRecord);
                    self.stack.push(SerializeTask::RecordFields(record));
                }
                SerializeTask::RecordFields(record) => {
                    let fields: Vec<_> = record.fields_for_serialize(self.selection).collect();
                    for (field, peek) in fields.into_iter().rev() {
                        self.stack.push(SerializeTask::Value(peek));
                        self.stack.push(SerializeTask::FieldName(field.name));
                    }
                }
                SerializeTask::Items(items) => {
                    for item in items.iter().rev() {
                        self.stack.push(SerializeTask::Value(item));
                    }
                }
                SerializeTask::MapEntries(map) => {
                    for (key, value) in map.iter().rev() {
                        self.stack.push(SerializeTask::MapValue(value));
                        self.stack.push(SerializeTask::Value(key));
                    }
                }
                SerializeTask::FieldName(name) => {
                    serializer.serialize_field_name(name)?;
                }
                SerializeTask::MapValue(peek) => {
                    serializer.begin_map_value()?;
                    self.stack.push(SerializeTask::Value(peek));
                }
                SerializeTask::EndRecord => serializer.end_record()?,
                SerializeTask::EndTuple => serializer.end_tuple()?,
                SerializeTask::EndArray => serializer.end_array()?,
                SerializeTask::EndMap => serializer.end_map()?,
            }
        }
        Ok(())
    }

    fn value<S>(&mut self, peek: Peek<'mem>, serializer: &mut S) -> Result<(), S::Error>
    where
        S: Serializer,
    {
        match peek.value() {
            Value::Unit => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Float(value) => serializer.serialize_f64(*value),
            Value::Str(value) => serializer.serialize_str(value),
            Value::Bytes(value) => serializer.serialize_bytes(value),
            Value::Tuple(items) => {
                serializer.start_tuple(Some(items.len()))?;
                self.stack.push(SerializeTask::EndTuple);
                self.push_items(peek);
                Ok(())
            }
            Value::List(items) => {
                serializer.start_array(Some(items.len()))?;
                self.stack.push(SerializeTask::EndArray);
                self.push_items(peek);
                Ok(())
            }
            Value::Map(entries) => {
                serializer.start_map(Some(entries.len()))?;
                self.stack.push(SerializeTask::EndMap);
                if let Ok(map) = peek.into_map() {
                    self.stack.push(SerializeTask::MapEntries(map));
                }
                Ok(())
            }
            Value::Record(frozen) => {
                self.stack.push(SerializeTask::Record(PeekFrozen::new(frozen)));
                Ok(())
            }
        }
    }

    fn push_items(&mut self, peek: Peek<'mem>) {
        if let Ok(items) = peek.into_list_like() {
            self.stack.push(SerializeTask::Items(items));
        }
    }
}

/// Serializes the selected fields of a frozen instance. Nested records use
/// the same selection.
pub fn serialize<S>(
    frozen: &Frozen,
    selection: FieldSelection,
    serializer: &mut S,
) -> Result<(), S::Error>
where
    S: Serializer,
{
    let mut walk = Walk::new(selection);
    walk.stack.push(SerializeTask::Record(PeekFrozen::new(frozen)));
    walk.run(serializer)
}

/// Serializes a single value. Nested records include every field.
pub fn serialize_value<S>(value: &Value, serializer: &mut S) -> Result<(), S::Error>
where
    S: Serializer,
{
    let mut walk = Walk::new(FieldSelection::All);
    walk.stack.push(SerializeTask::Value(Peek::new(value)));
    walk.run(serializer)
}

/// Serializes captured state: the type name and every captured field.
pub fn serialize_snapshot<S>(snapshot: &Snapshot, serializer: &mut S) -> Result<(), S::Error>
where
    S: Serializer,
{
    let fields: Vec<_> = snapshot.fields().collect();
    debug!(
        "Serializing a snapshot of {} with {} field(s)",
        snapshot.descriptor().name,
        fields.len()
    );
    serializer.start_record(snapshot.descriptor().name, Some(fields.len()))?;

    let mut walk = Walk::new(FieldSelection::All);
    walk.stack.push(SerializeTask::EndRecord);
    for (name, value) in fields.into_iter().rev() {
        walk.stack.push(SerializeTask::Value(Peek::new(value)));
        walk.stack.push(SerializeTask::FieldName(name));
    }
    walk.run(serializer)
}

/// Types that can drive a [`Serializer`]
pub trait Serialize {
    /// Serialize this value with the given serializer
    fn serialize<S: Serializer>(&self, serializer: &mut S) -> Result<(), S::Error>;
}

impl Serialize for Frozen {
    fn serialize<S: Serializer>(&self, serializer: &mut S) -> Result<(), S::Error> {
        serialize(self, FieldSelection::All, serializer)
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: &mut S) -> Result<(), S::Error> {
        serialize_snapshot(self, serializer)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: &mut S) -> Result<(), S::Error> {
        serialize_value(self, serializer)
    }
}
