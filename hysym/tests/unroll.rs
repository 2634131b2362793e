use hysym::prelude::*;

fn sum(arena: &ExprArena, xs: &Expr) -> SymResult<Expr> {
    let zero = arena.constant(Value::big(0));
    arena.case(xs, &zero, |arena, head, tail| {
        let rest = sum(arena, &tail)?;
        arena.add(&head, &rest)
    })
}

#[test]
fn unroll_is_idempotent_by_identity() {
    let arena = ExprArena::new();
    let xs = arena.fresh_argument(Sort::seq(Sort::BigInt));
    let total = sum(&arena, &xs).unwrap();
    let once = arena.unroll(&total).unwrap();
    let twice = arena.unroll(&once).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn unroll_expands_known_sequences() {
    let arena = ExprArena::new();
    let a = arena.arbitrary(Sort::BigInt, Some("a"));
    let b = arena.arbitrary(Sort::BigInt, Some("b"));
    let xs = arena.seq_of(Sort::BigInt, &[a.clone(), b.clone()]).unwrap();
    let total = sum(&arena, &xs).unwrap();
    let unrolled = arena.unroll(&total).unwrap();

    // a + (b + 0) with the zero dropped
    let expected = arena.add(&a, &b).unwrap();
    assert_eq!(unrolled, expected);
    assert!(!hysym::walker::free_variables(&unrolled).is_empty());
}

#[test]
fn unroll_resimplifies_through_guarded_sequences() {
    let arena = ExprArena::new();
    let flag = arena.arbitrary(Sort::Bool, Some("flag"));
    let x = arena.arbitrary(Sort::BigInt, Some("x"));
    let empty = arena.empty_seq(Sort::BigInt);
    let single = arena.cons(&x, &empty).unwrap();
    let xs = arena.ite(&flag, &single, &empty).unwrap();
    let total = sum(&arena, &xs).unwrap();
    let unrolled = arena.unroll(&total).unwrap();

    let zero = arena.constant(Value::big(0));
    assert_eq!(unrolled, arena.ite(&flag, &x, &zero).unwrap());
    assert!(hysym::walker::guards(&unrolled).contains(&flag));
}

#[test]
fn unroll_preserves_values() {
    let arena = ExprArena::new();
    let xs = arena.argument(0, &Sort::seq(Sort::BigInt));
    let total = sum(&arena, &xs).unwrap();
    let unrolled = arena.unroll(&total).unwrap();
    let ExprKind::Argument { var } = xs.kind() else {
        unreachable!()
    };

    for len in 0..5i64 {
        let items: Vec<Value> = (0..len).map(|i| Value::big(i * i)).collect();
        let env = Environment::new().with(*var, Value::seq(Sort::BigInt, items));
        let expected = Value::big((0..len).map(|i| i * i).sum::<i64>());
        assert_eq!(evaluate(&arena, &total, &env).unwrap(), expected);
        assert_eq!(evaluate(&arena, &unrolled, &env).unwrap(), expected);
    }
}
