use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use num_bigint::BigInt;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use hysym::prelude::*;

fn sum(arena: &ExprArena, xs: &Expr) -> SymResult<Expr> {
    let zero = arena.constant(Value::big(0));
    arena.case(xs, &zero, |arena, head, tail| {
        let rest = sum(arena, &tail)?;
        arena.add(&head, &rest)
    })
}

/// Random arithmetic over two `i32` parameters, seeded for determinism.
fn random_body(arena: &ExprArena, x: &Expr, y: &Expr, rng: &mut impl Rng, budget: usize) -> Expr {
    if budget == 0 || rng.random_bool(0.15) {
        return match rng.random_range(0..3) {
            0 => x.clone(),
            1 => y.clone(),
            _ => arena.constant(rng.random_range(-100i32..100).into_value()),
        };
    }
    let lhs = random_body(arena, x, y, rng, budget - 1);
    let rhs = random_body(arena, x, y, rng, budget - 1);
    let built = match rng.random_range(0..5) {
        0 => arena.add(&lhs, &rhs),
        1 => arena.sub(&lhs, &rhs),
        2 => arena.mul(&lhs, &rhs),
        3 => arena.bit_xor(&lhs, &rhs),
        _ => arena
            .lt(&lhs, &rhs)
            .and_then(|guard| arena.ite(&guard, &lhs, &rhs)),
    };
    built.unwrap()
}

fn bench_construction(c: &mut Criterion) {
    c.bench_function("construct_random_fresh_arena", |b| {
        b.iter_batched(
            || ChaCha20Rng::seed_from_u64(0x42),
            |mut rng| {
                let arena = ExprArena::new();
                let x = arena.argument(0, &Sort::Int(IntSort::I32));
                let y = arena.argument(1, &Sort::Int(IntSort::I32));
                black_box(random_body(&arena, &x, &y, &mut rng, 10));
            },
            BatchSize::SmallInput,
        )
    });

    let arena = ExprArena::new();
    let x = arena.argument(0, &Sort::Int(IntSort::I32));
    let y = arena.argument(1, &Sort::Int(IntSort::I32));
    random_body(&arena, &x, &y, &mut ChaCha20Rng::seed_from_u64(0x42), 10);
    c.bench_function("construct_random_interned", |b| {
        b.iter(|| {
            let mut rng = ChaCha20Rng::seed_from_u64(0x42);
            black_box(random_body(&arena, &x, &y, &mut rng, 10));
        })
    });
}

fn bench_arithmetic(c: &mut Criterion) {
    let arena = ExprArena::new();
    let mut rng = ChaCha20Rng::seed_from_u64(0x42);
    let body = {
        let x = arena.argument(0, &Sort::Int(IntSort::I32));
        let y = arena.argument(1, &Sort::Int(IntSort::I32));
        random_body(&arena, &x, &y, &mut rng, 10)
    };
    let f = Function2::<i32, i32, i32>::new(&arena, move |_, _, _| Ok(body.clone())).unwrap();

    c.bench_function("arithmetic_interpret", |b| {
        b.iter(|| black_box(f.evaluate(black_box(17), black_box(-3)).unwrap()))
    });

    f.compile().unwrap();
    c.bench_function("arithmetic_compiled", |b| {
        b.iter(|| black_box(f.evaluate(black_box(17), black_box(-3)).unwrap()))
    });
}

fn bench_list_sum(c: &mut Criterion) {
    let input: Vec<BigInt> = (0..32).map(BigInt::from).collect();

    let arena = ExprArena::new();
    let interpreted = Function1::<Vec<BigInt>, BigInt>::new(&arena, sum).unwrap();
    c.bench_function("list_sum_interpret", |b| {
        b.iter_batched(
            || input.clone(),
            |xs| black_box(interpreted.evaluate(xs).unwrap()),
            BatchSize::SmallInput,
        )
    });

    for depth in [4, 32] {
        let compiled = Function1::<Vec<BigInt>, BigInt>::new(&arena, sum).unwrap();
        compiled.compile_with_depth(depth).unwrap();
        c.bench_function(&format!("list_sum_compiled_depth_{}", depth), |b| {
            b.iter_batched(
                || input.clone(),
                |xs| black_box(compiled.evaluate(xs).unwrap()),
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, bench_construction, bench_arithmetic, bench_list_sum);
criterion_main!(benches);
