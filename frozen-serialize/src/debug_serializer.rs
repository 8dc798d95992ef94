use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use frozen_core::Frozen;
use frozen_reflect::FieldSelection;

use crate::{Serializer, serialize};

/// Compact single-line renderer: records as `Type{"field":value, ..}`,
/// tuples as `(..)`, lists as `[..]` and maps as `{key:value, ..}`.
pub struct DebugSerializer<W> {
    writer: W,
    need_comma: Vec<bool>,
}

/// Error raised by [`DebugSerializer`]: the underlying writer failed.
#[derive(Debug)]
pub enum DebugError {
    /// The writer returned an error
    Fmt(core::fmt::Error),
}

impl core::fmt::Display for DebugError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Debug::fmt(self, f)
    }
}

impl core::error::Error for DebugError {}

impl From<core::fmt::Error> for DebugError {
    fn from(err: core::fmt::Error) -> Self {
        DebugError::Fmt(err)
    }
}

impl<W> DebugSerializer<W>
where
    W: core::fmt::Write,
{
    /// Creates a serializer writing into `writer`
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            need_comma: vec![false],
        }
    }

    /// Returns the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_comma(&mut self) -> Result<(), DebugError> {
        if let Some(&true) = self.need_comma.last() {
            write!(self.writer, ", ")?;
        }
        Ok(())
    }

    fn set_comma(&mut self) {
        if let Some(need_comma) = self.need_comma.last_mut() {
            *need_comma = true;
        }
    }

    fn clear_comma(&mut self) {
        if let Some(need_comma) = self.need_comma.last_mut() {
            *need_comma = false;
        }
    }

    fn scalar(&mut self, value: impl core::fmt::Display) -> Result<(), DebugError> {
        self.write_comma()?;
        write!(self.writer, "{value}")?;
        self.set_comma();
        Ok(())
    }

    fn open(&mut self, token: &str) -> Result<(), DebugError> {
        self.write_comma()?;
        write!(self.writer, "{token}")?;
        self.need_comma.push(false);
        Ok(())
    }

    fn close(&mut self, token: &str) -> Result<(), DebugError> {
        self.need_comma.pop();
        write!(self.writer, "{token}")?;
        self.set_comma();
        Ok(())
    }
}

impl<W> Serializer for DebugSerializer<W>
where
    W: core::fmt::Write,
{
    type Error = DebugError;

    fn serialize_unit(&mut self) -> Result<(), Self::Error> {
        self.scalar("()")
    }

    fn serialize_bool(&mut self, value: bool) -> Result<(), Self::Error> {
        self.scalar(value)
    }

    fn serialize_i64(&mut self, value: i64) -> Result<(), Self::Error> {
        self.scalar(value)
    }

    fn serialize_f64(&mut self, value: f64) -> Result<(), Self::Error> {
        self.scalar(value)
    }

    fn serialize_str(&mut self, value: &str) -> Result<(), Self::Error> {
        self.write_comma()?;
        write!(self.writer, "{value:?}")?;
        self.set_comma();
        Ok(())
    }

    fn serialize_bytes(&mut self, value: &[u8]) -> Result<(), Self::Error> {
        self.open("b[")?;
        for byte in value {
            self.scalar(byte)?;
        }
        self.close("]")
    }

    fn start_record(
        &mut self,
        type_name: &'static str,
        _len: Option<usize>,
    ) -> Result<(), Self::Error> {
        self.write_comma()?;
        write!(self.writer, "{type_name}{{")?;
        self.need_comma.push(false);
        Ok(())
    }

    fn end_record(&mut self) -> Result<(), Self::Error> {
        self.close("}")
    }

    fn start_tuple(&mut self, _len: Option<usize>) -> Result<(), Self::Error> {
        self.open("(")
    }

    fn end_tuple(&mut self) -> Result<(), Self::Error> {
        self.close(")")
    }

    fn start_array(&mut self, _len: Option<usize>) -> Result<(), Self::Error> {
        self.open("[")
    }

    fn end_array(&mut self) -> Result<(), Self::Error> {
        self.close("]")
    }

    fn start_map(&mut self, _len: Option<usize>) -> Result<(), Self::Error> {
        self.open("{")
    }

    fn end_map(&mut self) -> Result<(), Self::Error> {
        self.close("}")
    }

    fn serialize_field_name(&mut self, name: &'static str) -> Result<(), Self::Error> {
        self.write_comma()?;
        write!(self.writer, "\"{name}\":")?;
        self.clear_comma();
        Ok(())
    }

    fn begin_map_value(&mut self) -> Result<(), Self::Error> {
        write!(self.writer, ":")?;
        self.clear_comma();
        Ok(())
    }
}

/// Renders a frozen instance with the [`DebugSerializer`] when displayed.
pub struct DebugDisplay<'a> {
    frozen: &'a Frozen,
    selection: FieldSelection,
}

impl<'a> DebugDisplay<'a> {
    /// Wraps `frozen` for display
    pub fn new(frozen: &'a Frozen, selection: FieldSelection) -> Self {
        Self { frozen, selection }
    }
}

impl core::fmt::Display for DebugDisplay<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut serializer = DebugSerializer::new(f);
        serialize(self.frozen, self.selection, &mut serializer).map_err(|DebugError::Fmt(e)| e)
    }
}

/// Renders the selected fields of a frozen instance on one line
pub fn to_debug_string(frozen: &Frozen, selection: FieldSelection) -> String {
    DebugDisplay::new(frozen, selection).to_string()
}

#[cfg(test)]
mod tests {
    use frozen_core::{Args, FrozenError, Partial, TypeDescriptor, Value};
    use frozen_testhelpers::test;

    use super::DebugSerializer;
    use crate::serialize_value;

    fn init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
        this.assign_args(args)?;
        Ok(())
    }

    static WRAPPER: TypeDescriptor = TypeDescriptor::builder("Wrapper")
        .defining(&["inner"])
        .constructor(init)
        .build();

    #[test]
    fn nested_values() {
        let wrapped = WRAPPER.construct([Value::Bytes(b"hi".to_vec())])?;
        let value = Value::Map(vec![
            (Value::from("unit"), Value::Unit),
            (Value::Int(1), Value::from((1.5, "a\"b"))),
            (Value::from(true), Value::List(vec![Value::from(wrapped)])),
        ]);

        let mut s = String::new();
        serialize_value(&value, &mut DebugSerializer::new(&mut s))?;
        insta::assert_snapshot!(s, @r#"{"unit":(), 1:(1.5, "a\"b"), true:[Wrapper{"inner":b[104, 105]}]}"#);
    }
}
