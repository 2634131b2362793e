use std::{collections::BTreeMap, sync::Arc};

use hysym::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Point {
    x: i32,
    y: i32,
}

impl Point {
    fn record() -> Arc<RecordSort> {
        Arc::new(RecordSort::new(
            "Point",
            [("x", Sort::Int(IntSort::I32)), ("y", Sort::Int(IntSort::I32))],
        ))
    }
}

impl SymValue for Point {
    fn sort() -> Sort {
        Sort::Record(Self::record())
    }

    fn into_value(self) -> Value {
        Value::record(Self::record(), vec![self.x.into_value(), self.y.into_value()])
            .expect("point fields match their sorts")
    }

    fn from_value(value: &Value) -> SymResult<Self> {
        let mismatch = || SymError::ValueSortMismatch {
            expected: Self::sort(),
            found: value.sort(),
        };
        let record = value.as_record().ok_or_else(mismatch)?;
        if record.record_sort() != &Self::record() {
            return Err(mismatch());
        }
        let field = |index: usize| {
            record
                .field(index)
                .ok_or_else(mismatch)
                .and_then(i32::from_value)
        };
        Ok(Point {
            x: field(0)?,
            y: field(1)?,
        })
    }
}

#[test]
fn wrappers_of_every_arity() {
    let arena = ExprArena::new();

    let answer = Function0::<u8>::new(&arena, |arena| Ok(arena.constant(42u8.into_value()))).unwrap();
    assert_eq!(answer.evaluate().unwrap(), 42);

    let negate = Function1::<bool, bool>::new(&arena, |arena, b| arena.not(b)).unwrap();
    assert!(negate.evaluate(false).unwrap());

    let mix = Function2::<u16, u16, u16>::new(&arena, |arena, a, b| {
        let both = arena.bit_and(a, b)?;
        arena.bit_xor(&both, b)
    })
    .unwrap();
    assert_eq!(mix.evaluate(0b1100, 0b1010).unwrap(), 0b0010);

    let select = Function3::<bool, i16, i16, i16>::new(&arena, |arena, c, a, b| {
        arena.ite(c, a, b)
    })
    .unwrap();
    assert_eq!(select.evaluate(true, 3, -4).unwrap(), 3);
    assert_eq!(select.evaluate(false, 3, -4).unwrap(), -4);

    let affine = Function4::<i64, i64, i64, i64, i64>::new(&arena, |arena, a, x, b, y| {
        let ax = arena.mul(a, x)?;
        let by = arena.mul(b, y)?;
        arena.add(&ax, &by)
    })
    .unwrap();
    assert_eq!(affine.evaluate(2, 3, -5, 7).unwrap(), -29);
    affine.compile().unwrap();
    assert_eq!(affine.evaluate(2, 3, -5, 7).unwrap(), -29);
}

#[test]
fn user_records_cross_the_boundary() {
    let arena = ExprArena::new();
    let mirror = Function1::<Point, Point>::new(&arena, |arena, p| {
        let x = arena.field(p, "x")?;
        let y = arena.field(p, "y")?;
        arena.create(&Point::record(), &[y, x])
    })
    .unwrap();

    let p = Point { x: 1, y: -2 };
    assert_eq!(mirror.evaluate(p).unwrap(), Point { x: -2, y: 1 });
    mirror.compile().unwrap();
    assert_eq!(mirror.evaluate(p).unwrap(), Point { x: -2, y: 1 });
}

#[test]
fn options_maps_and_sequences() {
    let arena = ExprArena::new();
    let lookup = Function2::<BTreeMap<u8, bool>, u8, Option<bool>>::new(&arena, |arena, m, k| {
        arena.map_get(m, k)
    })
    .unwrap();
    let table: BTreeMap<u8, bool> = [(1, true), (2, false)].into_iter().collect();
    assert_eq!(lookup.evaluate(table.clone(), 1).unwrap(), Some(true));
    assert_eq!(lookup.evaluate(table.clone(), 3).unwrap(), None);

    let head = Function1::<Vec<u8>, Option<u8>>::new(&arena, |arena, xs| {
        let zero = arena.constant(Value::big(0));
        arena.at(xs, &zero)
    })
    .unwrap();
    assert_eq!(head.evaluate(vec![9, 8]).unwrap(), Some(9));
    assert_eq!(head.evaluate(vec![]).unwrap(), None);
    head.compile().unwrap();
    assert_eq!(head.evaluate(vec![5]).unwrap(), Some(5));
}

#[test]
fn compile_is_idempotent() {
    let arena = ExprArena::new();
    let square = Function1::<i32, i32>::new(&arena, |arena, x| arena.mul(x, x)).unwrap();
    assert!(!square.is_compiled());
    square.compile().unwrap();
    let first = square.core().compiled().map(|f| f as *const CompiledFunction);
    square.compile().unwrap();
    square.compile_with_depth(9).unwrap();
    let second = square.core().compiled().map(|f| f as *const CompiledFunction);
    assert_eq!(first, second);
    assert_eq!(square.evaluate(12).unwrap(), 144);
}

#[test]
fn untyped_core_reports_bad_arguments() {
    let arena = ExprArena::new();
    let core = FunctionCore::new(&arena, &[Sort::Bool], Sort::Bool, |arena, args| {
        arena.not(&args[0])
    })
    .unwrap();
    assert_eq!(core.evaluate(&[Value::Bool(true)]).unwrap(), Value::Bool(false));
    assert!(matches!(
        core.evaluate(&[]),
        Err(SymError::ArityMismatch { .. })
    ));
    assert!(matches!(
        core.evaluate(&[Value::big(1)]),
        Err(SymError::ValueSortMismatch { .. })
    ));
    assert!(matches!(
        core.apply(&[arena.constant(Value::big(1))]),
        Err(SymError::SortMismatch { .. })
    ));
}
