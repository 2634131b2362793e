use hysym::prelude::*;

fn build(arena: &ExprArena, x: &Expr, y: &Expr) -> Expr {
    let one = arena.constant(Value::big(1));
    let sum = arena.add(x, &one).unwrap();
    let product = arena.mul(&sum, y).unwrap();
    let positive = arena.gt(&product, &arena.constant(Value::big(0))).unwrap();
    arena.ite(&positive, &product, &sum).unwrap()
}

#[test]
fn identical_shapes_share_one_node() {
    let arena = ExprArena::new();
    let x = arena.arbitrary(Sort::BigInt, Some("x"));
    let y = arena.arbitrary(Sort::BigInt, Some("y"));
    let first = build(&arena, &x, &y);
    let size = arena.len();
    let second = build(&arena, &x, &y);
    assert_eq!(first, second);
    assert_eq!(first.id(), second.id());
    assert_eq!(arena.len(), size);
}

#[test]
fn sorts_are_part_of_the_key() {
    let arena = ExprArena::new();
    let small = arena.constant(Value::int(IntSort::I8, 1));
    let wide = arena.constant(Value::int(IntSort::I64, 1));
    let big = arena.constant(Value::big(1));
    assert_ne!(small, wide);
    assert_ne!(wide, big);
    assert_eq!(small, arena.constant(1i8.into_value()));
}

#[test]
fn separate_arenas_do_not_share() {
    let a = ExprArena::new();
    let b = ExprArena::new();
    assert_ne!(a.constant(true), b.constant(true));
}

#[test]
fn global_arena_is_a_singleton() {
    let first = ExprArena::global().constant(Value::big(123_456));
    let second = ExprArena::global().constant(Value::big(123_456));
    assert_eq!(first, second);
    assert!(std::ptr::eq(ExprArena::global(), ExprArena::global()));
}

#[test]
fn concurrent_construction_collapses() {
    let arena = ExprArena::new();
    let x = arena.arbitrary(Sort::BigInt, Some("x"));
    let y = arena.arbitrary(Sort::BigInt, Some("y"));

    let results: Vec<Expr> = crossbeam::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|_| build(&arena, &x, &y)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    })
    .unwrap();

    let expected = build(&arena, &x, &y);
    assert!(results.iter().all(|expr| *expr == expected));
}

#[test]
fn concurrent_distinct_constants_all_survive() {
    let arena = ExprArena::new();
    crossbeam::scope(|scope| {
        for t in 0..4i64 {
            let arena = &arena;
            scope.spawn(move |_| {
                for i in 0..250i64 {
                    arena.constant(Value::big(i * 4 + t));
                }
            });
        }
    })
    .unwrap();
    assert_eq!(arena.len(), 1000);
    for i in 0..1000i64 {
        let value = Value::big(i);
        assert_eq!(arena.constant(value.clone()).as_const(), Some(&value));
    }
    assert_eq!(arena.len(), 1000);
}

#[test]
fn expression_handles_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Expr>();
    assert_send_sync::<ExprArena>();
    assert_send_sync::<CompiledFunction>();
    assert_send_sync::<FunctionCore<'static>>();
}
