use num_bigint::BigInt;

use hysym::prelude::*;

/// `sum(xs) = case xs of [] -> 0 | h :: t -> h + sum(t)`
fn sum(arena: &ExprArena, xs: &Expr) -> SymResult<Expr> {
    let zero = arena.constant(Value::big(0));
    arena.case(xs, &zero, |arena, head, tail| {
        let rest = sum(arena, &tail)?;
        arena.add(&head, &rest)
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arena = ExprArena::new();
    let f = Function1::<Vec<BigInt>, BigInt>::new(&arena, sum)?;

    println!("Body:");
    f.body().pretty_print()?;
    println!();

    let input: Vec<BigInt> = (1..=10).map(BigInt::from).collect();
    println!("Interpreted: {}", f.evaluate(input.clone())?);

    // Two levels are compiled, the rest of the list is interpreted.
    f.compile_with_depth(2)?;
    println!("Compiled:    {}", f.evaluate(input)?);
    println!("{:?}", f.core().compiled());

    // A known list is folded while the expression is built.
    let items: Vec<Expr> = (1..=4).map(|i| arena.constant(Value::big(i))).collect();
    let known = arena.seq_of(Sort::BigInt, &items)?;
    println!("Folded:      {}", sum(&arena, &known)?);
    Ok(())
}
