use frozen_core::{Args, FrozenError, Partial, Value, declare_type};
use frozen_reflect::FieldSelection;
use frozen_serialize::{
    DebugSerializer, Serialize, Serializer, serialize, serialize_snapshot, to_debug_string,
};
use frozen_testhelpers::test;

fn person_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    let first = args.get("first")?.try_str()?;
    let last = args.get("last")?.try_str()?;
    let full = format!("{last}, {first}");
    this.assign_args(args)?.set("full", full)?;
    Ok(())
}

fn team_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    this.assign_args(args)?;
    let size = args.get("members")?.as_items().map(<[Value]>::len).unwrap_or(0);
    this.set("size", size as i64)?;
    Ok(())
}

declare_type! {
    static PERSON: Person {
        defining: [first, last],
        data: [full],
        constructor: person_init,
    }
}

declare_type! {
    static TEAM: Team {
        defining: [lead, members],
        data: [size],
        constructor: team_init,
    }
}

/// Records every call, to check the walk's event order
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    max_depth: usize,
    depth: usize,
}

impl Recorder {
    fn push(&mut self, event: impl Into<String>) -> Result<(), core::convert::Infallible> {
        self.events.push(event.into());
        Ok(())
    }

    fn enter(&mut self, event: impl Into<String>) -> Result<(), core::convert::Infallible> {
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
        self.push(event)
    }

    fn leave(&mut self, event: impl Into<String>) -> Result<(), core::convert::Infallible> {
        self.depth -= 1;
        self.push(event)
    }
}

impl Serializer for Recorder {
    type Error = core::convert::Infallible;

    fn serialize_unit(&mut self) -> Result<(), Self::Error> {
        self.push("unit")
    }
    fn serialize_bool(&mut self, value: bool) -> Result<(), Self::Error> {
        self.push(format!("bool {value}"))
    }
    fn serialize_i64(&mut self, value: i64) -> Result<(), Self::Error> {
        self.push(format!("int {value}"))
    }
    fn serialize_f64(&mut self, value: f64) -> Result<(), Self::Error> {
        self.push(format!("float {value}"))
    }
    fn serialize_str(&mut self, value: &str) -> Result<(), Self::Error> {
        self.push(format!("str {value}"))
    }
    fn serialize_bytes(&mut self, value: &[u8]) -> Result<(), Self::Error> {
        self.push(format!("bytes {}", value.len()))
    }
    fn start_record(&mut self, type_name: &'static str, len: Option<usize>) -> Result<(), Self::Error> {
        self.enter(format!("record {type_name} {len:?}"))
    }
    fn end_record(&mut self) -> Result<(), Self::Error> {
        self.leave("end record")
    }
    fn start_tuple(&mut self, len: Option<usize>) -> Result<(), Self::Error> {
        self.enter(format!("tuple {len:?}"))
    }
    fn end_tuple(&mut self) -> Result<(), Self::Error> {
        self.leave("end tuple")
    }
    fn start_array(&mut self, len: Option<usize>) -> Result<(), Self::Error> {
        self.enter(format!("array {len:?}"))
    }
    fn end_array(&mut self) -> Result<(), Self::Error> {
        self.leave("end array")
    }
    fn start_map(&mut self, len: Option<usize>) -> Result<(), Self::Error> {
        self.enter(format!("map {len:?}"))
    }
    fn end_map(&mut self) -> Result<(), Self::Error> {
        self.leave("end map")
    }
    fn serialize_field_name(&mut self, name: &'static str) -> Result<(), Self::Error> {
        self.push(format!("field {name}"))
    }
}

#[test]
fn selection_controls_the_rendered_fields() {
    let p = PERSON.construct(["John", "Smith"])?;
    insta::assert_snapshot!(
        to_debug_string(&p, FieldSelection::All),
        @r#"Person{"first":"John", "last":"Smith", "full":"Smith, John"}"#
    );
    insta::assert_snapshot!(
        to_debug_string(&p, FieldSelection::Defining),
        @r#"Person{"first":"John", "last":"Smith"}"#
    );
}

#[test]
fn nested_records_are_walked_in_order() {
    let lead = PERSON.construct(["Ada", "Lovelace"])?;
    let member = PERSON.construct(["Grace", "Hopper"])?;
    let team = TEAM.construct([Value::from(lead), Value::List(vec![Value::from(member)])])?;

    let mut recorder = Recorder::default();
    let Ok(()) = serialize(&team, FieldSelection::Defining, &mut recorder);
    assert_eq!(
        recorder.events,
        [
            "record Team Some(2)",
            "field lead",
            "record Person Some(2)",
            "field first",
            "str Ada",
            "field last",
            "str Lovelace",
            "end record",
            "field members",
            "array Some(1)",
            "record Person Some(2)",
            "field first",
            "str Grace",
            "field last",
            "str Hopper",
            "end record",
            "end array",
            "end record",
        ]
    );
    assert_eq!(recorder.depth, 0);
}

#[test]
fn snapshots_serialize_every_captured_field() {
    let p = PERSON.construct(["John", "Smith"])?;
    let snapshot = p.replace([("full", "kept verbatim")])?.capture();

    let mut s = String::new();
    serialize_snapshot(&snapshot, &mut DebugSerializer::new(&mut s))?;
    insta::assert_snapshot!(s, @r#"Person{"first":"John", "last":"Smith", "full":"kept verbatim"}"#);

    let mut t = String::new();
    snapshot.serialize(&mut DebugSerializer::new(&mut t))?;
    assert_eq!(s, t);
}

#[test]
fn deep_nesting_does_not_recurse() {
    let mut value = Value::Int(0);
    for _ in 0..2_000 {
        value = Value::List(vec![value]);
    }

    let mut recorder = Recorder::default();
    let Ok(()) = value.serialize(&mut recorder);
    assert_eq!(recorder.max_depth, 2_000);
    assert_eq!(recorder.events.len(), 4_001);
    assert_eq!(recorder.events[2_000], "int 0");
}
