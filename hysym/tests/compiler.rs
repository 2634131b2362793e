use std::sync::Arc;

use num_bigint::BigInt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use hysym::{compiler, prelude::*};

fn sum(arena: &ExprArena, xs: &Expr) -> SymResult<Expr> {
    let zero = arena.constant(Value::big(0));
    arena.case(xs, &zero, |arena, head, tail| {
        let rest = sum(arena, &tail)?;
        arena.add(&head, &rest)
    })
}

fn wrapping_sum(arena: &ExprArena, xs: &Expr) -> SymResult<Expr> {
    let zero = arena.constant(0i32.into_value());
    arena.case(xs, &zero, |arena, head, tail| {
        let rest = wrapping_sum(arena, &tail)?;
        arena.add(&head, &rest)
    })
}

/// Number of elements of `xs` strictly greater than `pivot`.
fn count_above(arena: &ExprArena, pivot: &Expr, xs: &Expr) -> SymResult<Expr> {
    let zero = arena.constant(0i32.into_value());
    let pivot = pivot.clone();
    arena.case(xs, &zero, move |arena, head, tail| {
        let one = arena.constant(1i32.into_value());
        let zero = arena.constant(0i32.into_value());
        let above = arena.gt(&head, &pivot)?;
        let here = arena.ite(&above, &one, &zero)?;
        let rest = count_above(arena, &pivot, &tail)?;
        arena.add(&here, &rest)
    })
}

/// Largest element, or `fallback` for an empty sequence.
fn largest(arena: &ExprArena, fallback: &Expr, xs: &Expr) -> SymResult<Expr> {
    arena.case(xs, fallback, |arena, head, tail| {
        let rest = largest(arena, &head, &tail)?;
        let bigger = arena.gt(&head, &rest)?;
        arena.ite(&bigger, &head, &rest)
    })
}

#[test]
fn clamp_agrees_before_and_after_compiling() {
    let arena = ExprArena::new();
    let f = Function1::<i64, i64>::new(&arena, |arena, x| {
        let ten = arena.constant(10i64.into_value());
        let big = arena.geq(x, &ten)?;
        let lowered = arena.sub(x, &ten)?;
        arena.ite(&big, &lowered, x)
    })
    .unwrap();

    assert_eq!(f.evaluate(15).unwrap(), 5);
    assert_eq!(f.evaluate(5).unwrap(), 5);
    f.compile().unwrap();
    assert!(f.is_compiled());
    assert_eq!(f.evaluate(15).unwrap(), 5);
    assert_eq!(f.evaluate(5).unwrap(), 5);
    assert_eq!(f.evaluate(i64::MIN).unwrap(), i64::MIN);
}

#[test]
fn recursive_sum_runs_past_the_unrolled_depth() {
    let arena = ExprArena::new();
    let f = Function1::<Vec<BigInt>, BigInt>::new(&arena, sum).unwrap();
    let input = || vec![BigInt::from(1), BigInt::from(2), BigInt::from(3)];

    let interpreted = f.evaluate(input()).unwrap();
    f.compile_with_depth(2).unwrap();
    let compiled = f.evaluate(input()).unwrap();
    assert_eq!(interpreted, BigInt::from(6));
    assert_eq!(compiled, interpreted);
    assert_eq!(f.evaluate(Vec::new()).unwrap(), BigInt::from(0));

    let items: Vec<Expr> = input()
        .into_iter()
        .map(|value| arena.constant(value))
        .collect();
    let known = arena.seq_of(Sort::BigInt, &items).unwrap();
    let folded = sum(&arena, &known).unwrap();
    assert_eq!(folded.as_const(), Some(&Value::big(6)));
}

#[test]
fn compiled_matches_interpreted_at_every_depth() {
    let mut rng = ChaCha20Rng::seed_from_u64(0xc0ffee);
    let arena = ExprArena::new();
    type Builder = fn(&ExprArena, &Expr, &Expr) -> SymResult<Expr>;
    let programs: [Builder; 4] = [
        |arena, xs, k| {
            let total = wrapping_sum(arena, xs)?;
            arena.sub(&total, k)
        },
        |arena, xs, k| count_above(arena, k, xs),
        |arena, xs, k| largest(arena, k, xs),
        |arena, xs, k| {
            // the pivot is taken from the list itself, so the fallback must see outer binders
            arena.case(xs, k, |arena, head, tail| count_above(arena, &head, &tail))
        },
    ];

    for (index, program) in programs.into_iter().enumerate() {
        for depth in 0..=3 {
            let f = Function2::<Vec<i32>, i32, i32>::new(&arena, move |arena, xs, k| {
                program(arena, xs, k)
            })
            .unwrap();
            let mut cases = Vec::new();
            for _ in 0..40 {
                let len = rng.random_range(0..7);
                let xs: Vec<i32> = (0..len).map(|_| rng.random_range(-5..=5)).collect();
                let k = rng.random_range(-5..=5);
                cases.push((xs.clone(), k, f.evaluate(xs, k).unwrap()));
            }
            f.compile_with_depth(depth).unwrap();
            for (xs, k, expected) in cases {
                assert_eq!(
                    f.evaluate(xs.clone(), k).unwrap(),
                    expected,
                    "program {} at depth {} on {:?}, {}",
                    index,
                    depth,
                    xs,
                    k
                );
            }
        }
    }
}

#[test]
fn record_operations_compile() {
    let arena = ExprArena::new();
    let point = Arc::new(RecordSort::new(
        "Point",
        [("x", Sort::Int(IntSort::I32)), ("y", Sort::Int(IntSort::I32))],
    ));
    let p = arena.argument(0, &Sort::Record(point.clone()));
    let x = arena.field(&p, "x").unwrap();
    let y = arena.field(&p, "y").unwrap();
    let swapped = arena.create(&point, &[y.clone(), x.clone()]).unwrap();
    let total = arena.add(&x, &y).unwrap();
    let body = arena.field_with(&swapped, 0, &total).unwrap();

    let input = Value::record(
        point.clone(),
        vec![Value::int(IntSort::I32, 3), Value::int(IntSort::I32, 4)],
    )
    .unwrap();
    let expected = Value::record(
        point.clone(),
        vec![Value::int(IntSort::I32, 7), Value::int(IntSort::I32, 3)],
    )
    .unwrap();

    let f = compiler::compile(&arena, &body, &[p.clone()], 0).unwrap();
    assert_eq!(f.arity(), 1);
    assert_eq!(f.call(&arena, &[input.clone()]).unwrap(), expected);

    let ExprKind::Argument { var } = p.kind() else {
        unreachable!()
    };
    let env = Environment::new().with(*var, input);
    assert_eq!(evaluate(&arena, &body, &env).unwrap(), expected);
}

#[test]
fn slot_limit_leaves_the_function_uncompiled() {
    let config = ArenaConfig {
        compiler: CompilerConfig {
            max_slots: 3,
            ..CompilerConfig::default()
        },
        ..ArenaConfig::default()
    };
    let arena = ExprArena::with_config(config);
    let f = Function1::<i32, i32>::new(&arena, |arena, x| {
        let one = arena.constant(1i32.into_value());
        let two = arena.constant(2i32.into_value());
        let a = arena.add(x, &one)?;
        let b = arena.add(x, &two)?;
        arena.mul(&a, &b)
    })
    .unwrap();

    let err = f.compile().unwrap_err();
    assert!(matches!(err, SymError::SlotLimitExceeded { limit: 3 }));
    assert!(!f.is_compiled());
    assert_eq!(f.evaluate(2).unwrap(), 12);
}

#[test]
fn excessive_depth_is_rejected() {
    let arena = ExprArena::new();
    let f = Function1::<Vec<BigInt>, BigInt>::new(&arena, sum).unwrap();
    let err = f.compile_with_depth(1000).unwrap_err();
    assert!(matches!(
        err,
        SymError::DepthLimitExceeded {
            requested: 1000,
            limit: 64
        }
    ));
    assert!(!f.is_compiled());
}

#[test]
fn long_sequences_run_past_the_cutoff_without_interning() {
    let arena = ExprArena::new();
    let f = Function1::<Vec<BigInt>, BigInt>::new(&arena, sum).unwrap();
    f.compile_with_depth(4).unwrap();
    let n = 3000i64;
    let input = |offset: i64| (0..n).map(|i| BigInt::from(i + offset)).collect::<Vec<_>>();

    assert_eq!(f.evaluate(input(0)).unwrap(), BigInt::from(n * (n - 1) / 2));
    let after_first = arena.len();
    assert_eq!(
        f.evaluate(input(2)).unwrap(),
        BigInt::from(n * (n - 1) / 2 + 2 * n)
    );
    assert_eq!(f.evaluate(input(0)).unwrap(), BigInt::from(n * (n - 1) / 2));
    assert_eq!(arena.len(), after_first);
}

#[test]
fn compiled_functions_are_shared_across_threads() {
    let arena = ExprArena::new();
    let f = Function1::<Vec<BigInt>, BigInt>::new(&arena, sum).unwrap();
    f.compile_with_depth(3).unwrap();

    crossbeam::scope(|scope| {
        for t in 0..4i64 {
            let f = &f;
            scope.spawn(move |_| {
                let xs: Vec<BigInt> = (0..=t * 2).map(BigInt::from).collect();
                let expected: i64 = (0..=t * 2).sum();
                assert_eq!(f.evaluate(xs).unwrap(), BigInt::from(expected));
            });
        }
    })
    .unwrap();
}
