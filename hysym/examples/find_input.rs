use hysym::prelude::*;

fn main() -> SymResult<()> {
    let arena = ExprArena::new();

    // f(x, y) = if x < y then y - x else x * 2
    let f = Function2::<i8, i8, i8>::new(&arena, |arena, x, y| {
        let less = arena.lt(x, y)?;
        let gap = arena.sub(y, x)?;
        let two = arena.constant(2i8.into_value());
        let doubled = arena.mul(x, &two)?;
        arena.ite(&less, &gap, &doubled)
    })?;
    println!("f = {}", f.body());

    let search = Search::<EnumerativeSolver, ShapeGenerator>::default();

    let seven = |arena: &ExprArena, _: &[Expr], output: &Expr| {
        arena.eq(output, &arena.constant(7i8.into_value()))
    };
    match f.find(&search, seven)? {
        Some((x, y)) => println!("f({}, {}) = 7", x, y),
        None => println!("no input gives 7"),
    }
    println!("all inputs giving 7: {:?}", f.find_all(&search, seven)?);

    let positive = |arena: &ExprArena, _: &[Expr], output: &Expr| {
        arena.gt(output, &arena.constant(0i8.into_value()))
    };
    let output = |_: &ExprArena, _: &[Expr], output: &Expr| Ok(output.clone());
    println!("smallest positive output at {:?}", f.minimize(&search, output, positive)?);

    let generator = PathInputGenerator::new(search);
    for (x, y) in f.generate_inputs(&generator)? {
        println!("f({}, {}) = {}", x, y, f.evaluate(x, y)?);
    }
    Ok(())
}
