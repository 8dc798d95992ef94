use frozen_testhelpers::test;

use crate::{Args, FrozenError, Partial, Value, WriteOp};

fn stamp(this: &mut Partial, name: &str) -> Result<(), FrozenError> {
    let trail = match this.get("trail") {
        Some(trail) => format!("{} {name}", trail.try_str()?),
        None => name.into(),
    };
    this.set("trail", trail)?;
    Ok(())
}

fn person_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    let first = args.get("first")?.try_str()?;
    let last = args.get("last")?.try_str()?;
    let full = format!("{last}, {first}");
    this.assign_args(args)?.set("full", full)?;
    let path = this.path();
    this.set("built_by", path)?;
    Ok(())
}

fn employee_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    assert_eq!(this.depth(), 0);
    this.parent()?.init_with(fields! {
        first: args.get("first")?.clone(),
        last: args.get("last")?.clone(),
    })?;
    assert_eq!(this.depth(), 0);
    this.set("company", args.get("company")?.clone())?;
    let badge = format!(
        "{}@{}",
        args.get("last")?.try_str()?,
        args.get("company")?.try_str()?
    );
    this.set("badge", badge)?;
    Ok(())
}

declare_type! {
    static PERSON: Person {
        defining: [first, last],
        data: [full, built_by],
        constructor: person_init,
    }
}

declare_type! {
    static EMPLOYEE: Employee extends [PERSON] {
        defining: [first, last, company],
        data: [badge],
        constructor: employee_init,
    }
}

declare_type! {
    static MANAGER: Manager extends [EMPLOYEE] {
        data: [reports],
    }
}

fn base_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    let visits = this.get("visits").and_then(Value::as_int).unwrap_or(0);
    this.assign_args(args)?.set("visits", visits + 1)?;
    stamp(this, "Base")
}

fn left_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    this.parent()?.init([args.get("id")?.clone()])?;
    this.set("left", true)?;
    stamp(this, "Left")
}

fn right_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    this.parent()?.init([args.get("id")?.clone()])?;
    this.set("right", true)?;
    stamp(this, "Right")
}

fn diamond_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    this.parent()?.init([args.get("id")?.clone()])?;
    stamp(this, "Diamond")
}

declare_type! {
    static BASE: Base {
        defining: [id],
        data: [visits, trail],
        constructor: base_init,
    }
}

declare_type! {
    static LEFT: Left extends [BASE] {
        defining: [id],
        data: [left],
        constructor: left_init,
    }
}

declare_type! {
    static RIGHT: Right extends [BASE] {
        defining: [id],
        data: [right],
        constructor: right_init,
    }
}

declare_type! {
    static DIAMOND: Diamond extends [LEFT, RIGHT] {
        defining: [id],
        constructor: diamond_init,
    }
}

#[test]
fn subclass_delegates_to_parent() {
    let e = EMPLOYEE.construct(["Ada", "Lovelace", "Analytical"])?;
    assert_eq!(e.get("full"), Some(&Value::from("Lovelace, Ada")));
    assert_eq!(e.get("badge"), Some(&Value::from("Lovelace@Analytical")));
    assert_eq!(e.get("built_by"), Some(&Value::from("Employee > Person")));

    let order: Vec<_> = e.fields().map(|(name, _)| name).collect();
    assert_eq!(order, ["first", "last", "full", "built_by", "company", "badge"]);
}

#[test]
fn type_without_constructor_inherits_one() {
    let m = MANAGER.construct_with(fields! {
        company: "Analytical",
        first: "Ada",
        last: "Lovelace",
    })?;
    assert_eq!(m.descriptor().name, "Manager");
    assert_eq!(m.get("badge"), Some(&Value::from("Lovelace@Analytical")));
    // Manager has no frame of its own, Employee's constructor runs outermost
    assert_eq!(m.get("built_by"), Some(&Value::from("Employee > Person")));
    assert_eq!(m.get("reports"), None);
}

#[test]
fn diamond_runs_shared_ancestor_once() {
    let d = DIAMOND.construct([7])?;
    assert_eq!(d.get("visits"), Some(&Value::Int(1)));
    assert_eq!(d.get("left"), Some(&Value::Bool(true)));
    assert_eq!(d.get("right"), Some(&Value::Bool(true)));
    assert_eq!(d.get("trail"), Some(&Value::from("Base Right Left Diamond")));

    // on its own, Left's parent is Base
    let l = LEFT.construct([7])?;
    assert_eq!(l.get("trail"), Some(&Value::from("Base Left")));
    assert_eq!(l.get("right"), None);
}

fn skip_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    assert_eq!(this.current().name, "Skip");
    this.ancestor(&BASE)?.init([args.get("id")?.clone()])?;
    stamp(this, "Skip")
}

declare_type! {
    static SKIP: Skip extends [LEFT] {
        defining: [id],
        constructor: skip_init,
    }
}

#[test]
fn named_ancestor_skips_levels() {
    let s = SKIP.construct([1])?;
    assert_eq!(s.get("trail"), Some(&Value::from("Base Skip")));
    assert_eq!(s.get("left"), None);
}

fn stranger_init(this: &mut Partial, _args: &Args) -> Result<(), FrozenError> {
    this.ancestor(&PERSON)?.init(["x", "y"])
}

fn orphan_init(this: &mut Partial, _args: &Args) -> Result<(), FrozenError> {
    this.parent()?.init(Vec::<Value>::new())
}

declare_type! {
    static STRANGER: Stranger extends [BASE] {
        constructor: stranger_init,
    }
}

declare_type! {
    static ORPHAN: Orphan {
        constructor: orphan_init,
    }
}

#[test]
fn delegation_errors() {
    let err = STRANGER.construct(Vec::<Value>::new()).unwrap_err();
    assert!(matches!(
        err,
        FrozenError::NotAnAncestor { type_name: "Stranger", ancestor: "Person" }
    ));

    let err = ORPHAN.construct(Vec::<Value>::new()).unwrap_err();
    assert!(matches!(err, FrozenError::NoParent { type_name: "Orphan" }));
}

#[test]
fn argument_errors() {
    let err = PERSON.construct(["only"]).unwrap_err();
    assert!(matches!(
        err,
        FrozenError::ArityMismatch { expected: 2, actual: 1, .. }
    ));

    let err = PERSON.construct_with(fields! { first: "Ada" }).unwrap_err();
    assert!(matches!(err, FrozenError::MissingArgument { ref name, .. } if name == "last"));

    let err = PERSON
        .construct_with(fields! { first: "Ada", last: "L", age: 36 })
        .unwrap_err();
    assert!(matches!(err, FrozenError::UnexpectedArgument { ref name, .. } if name == "age"));

    // duplicate keywords: the last one wins
    let p = PERSON.construct_with(fields! { first: "Ada", last: "L", first: "Grace" })?;
    assert_eq!(p.get("first"), Some(&Value::from("Grace")));
}

fn forgetful_init(this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    this.assign_args(args)?;
    let removed = this.remove("id")?;
    assert_eq!(removed, Some(Value::Int(1)));
    Ok(())
}

fn sloppy_init(this: &mut Partial, _args: &Args) -> Result<(), FrozenError> {
    this.set("nope", 1)?;
    Ok(())
}

fn failing_init(_this: &mut Partial, args: &Args) -> Result<(), FrozenError> {
    if args.get("id")?.try_int()? < 0 {
        return Err(FrozenError::constructor_msg("Failing", "id must be positive"));
    }
    Ok(())
}

declare_type! {
    static FORGETFUL: Forgetful {
        defining: [id],
        constructor: forgetful_init,
    }
}

declare_type! {
    static SLOPPY: Sloppy {
        defining: [id],
        constructor: sloppy_init,
    }
}

declare_type! {
    static FAILING: Failing {
        defining: [id],
        constructor: failing_init,
    }
}

#[test]
fn construction_errors_abandon_the_instance() {
    let err = FORGETFUL.construct([1]).unwrap_err();
    assert!(matches!(
        err,
        FrozenError::UninitializedField { field: "id", .. }
    ));

    let err = SLOPPY.construct([1]).unwrap_err();
    assert!(matches!(err, FrozenError::UnknownField { ref field, .. } if field == "nope"));

    let err = FAILING.construct([-1]).unwrap_err();
    assert!(matches!(err, FrozenError::Constructor { type_name: "Failing", .. }));
    assert_eq!(
        core::error::Error::source(&err).map(|e| e.to_string()),
        Some("id must be positive".to_string())
    );
}

#[test]
fn ancestor_access_after_freeze_is_rejected() {
    let e = EMPLOYEE.construct(["Ada", "Lovelace", "Analytical"])?;
    let err = e.init_ancestor(&PERSON).unwrap_err();
    assert!(matches!(
        err,
        FrozenError::ImmutabilityViolation { op: WriteOp::AncestorInit, .. }
    ));
    assert_eq!(e.get("full"), Some(&Value::from("Lovelace, Ada")));
}
