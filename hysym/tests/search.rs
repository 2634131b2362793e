use hysym::prelude::*;

type Enumerative = Search<EnumerativeSolver, ShapeGenerator>;

fn wrapping_sum(arena: &ExprArena, xs: &Expr) -> SymResult<Expr> {
    let zero = arena.constant(0i8.into_value());
    arena.case(xs, &zero, |arena, head, tail| {
        let rest = wrapping_sum(arena, &tail)?;
        arena.add(&head, &rest)
    })
}

fn output_is(value: i8) -> impl Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr> {
    move |arena, _, output| arena.eq(output, &arena.constant(value.into_value()))
}

#[test]
fn finds_the_preimage_of_an_output() {
    let arena = ExprArena::new();
    let triple = Function1::<i8, i8>::new(&arena, |arena, x| {
        let three = arena.constant(3i8.into_value());
        arena.mul(x, &three)
    })
    .unwrap();
    let search = Enumerative::default();
    assert_eq!(triple.find(&search, output_is(12)).unwrap(), Some((4,)));
}

#[test]
fn unsatisfiable_queries_have_no_answer() {
    let arena = ExprArena::new();
    let square = Function1::<i8, i8>::new(&arena, |arena, x| arena.mul(x, x)).unwrap();
    let search = Enumerative::default();
    assert_eq!(square.find(&search, output_is(2)).unwrap(), None);
}

#[test]
fn find_all_blocks_previous_answers() {
    let arena = ExprArena::new();
    let square = Function1::<i8, i8>::new(&arena, |arena, x| arena.mul(x, x)).unwrap();
    let search = Enumerative::default();
    assert_eq!(
        square.find_all(&search, output_is(4)).unwrap(),
        vec![(-2,), (2,)]
    );

    let capped = Enumerative {
        config: SearchConfig {
            max_results: 1,
            ..SearchConfig::default()
        },
        ..Enumerative::default()
    };
    assert_eq!(square.find_all(&capped, output_is(4)).unwrap().len(), 1);
}

#[test]
fn optimizes_under_a_constraint() {
    let arena = ExprArena::new();
    let succ = Function1::<i8, i8>::new(&arena, |arena, x| {
        let one = arena.constant(1i8.into_value());
        arena.add(x, &one)
    })
    .unwrap();
    let search = Enumerative::default();
    let at_most_five = |arena: &ExprArena, _: &[Expr], output: &Expr| {
        arena.leq(output, &arena.constant(5i8.into_value()))
    };
    let objective = |_: &ExprArena, _: &[Expr], output: &Expr| Ok(output.clone());

    assert_eq!(
        succ.maximize(&search, objective, at_most_five).unwrap(),
        Some((4,))
    );
    assert_eq!(
        succ.minimize(&search, objective, at_most_five).unwrap(),
        Some((-8,))
    );

    let not_numeric = |arena: &ExprArena, _: &[Expr], output: &Expr| {
        arena.leq(output, &arena.constant(0i8.into_value()))
    };
    assert!(matches!(
        succ.maximize(&search, not_numeric, at_most_five),
        Err(SymError::UnsupportedSort { .. })
    ));
}

#[test]
fn sequences_up_to_the_search_depth() {
    let arena = ExprArena::new();
    let total = Function1::<Vec<i8>, i8>::new(&arena, wrapping_sum).unwrap();
    let search = Enumerative {
        config: SearchConfig {
            depth: 2,
            exhaustive_depth: true,
            ..SearchConfig::default()
        },
        ..Enumerative::default()
    };
    let (xs,) = total.find(&search, output_is(10)).unwrap().unwrap();
    // no single candidate element reaches ten
    assert_eq!(xs.len(), 2);
    assert_eq!(xs.iter().sum::<i8>(), 10);

    let (empty,) = total.find(&search, output_is(0)).unwrap().unwrap();
    assert!(empty.iter().sum::<i8>() == 0);
}

#[test]
fn path_inputs_cover_both_branches() {
    let arena = ExprArena::new();
    let step = Function1::<i8, i8>::new(&arena, |arena, x| {
        let three = arena.constant(3i8.into_value());
        let above = arena.gt(x, &three)?;
        let one = arena.constant(1i8.into_value());
        let zero = arena.constant(0i8.into_value());
        arena.ite(&above, &one, &zero)
    })
    .unwrap();
    let generator = PathInputGenerator::new(Enumerative::default());
    let inputs = step.generate_inputs(&generator).unwrap();
    assert_eq!(inputs, vec![(0,), (-8,), (4,)]);
    for (x,) in inputs {
        assert_eq!(step.evaluate(x).unwrap(), i8::from(x > 3));
    }
}

/// Backend that never finds anything.
struct Refusing;

impl SolverBackend for Refusing {
    fn solve(&self, _: &ExprArena, _: &Expr, _: &Model) -> SymResult<Option<Model>> {
        Ok(None)
    }

    fn optimize(
        &self,
        _: &ExprArena,
        _: &Expr,
        _: &Expr,
        _: Direction,
    ) -> SymResult<Option<Model>> {
        Ok(None)
    }
}

#[test]
fn custom_backends_plug_in() {
    let arena = ExprArena::new();
    let id = Function1::<bool, bool>::new(&arena, |_, x| Ok(x.clone())).unwrap();
    let search = Search::new(Refusing, ShapeGenerator, SearchConfig::default());
    assert_eq!(id.find(&search, |_, _, output| Ok(output.clone())).unwrap(), None);
    assert!(id.find_all(&search, |_, _, output| Ok(output.clone())).unwrap().is_empty());
    assert!(id.generate_inputs(&PathInputGenerator::new(search)).unwrap().is_empty());
}
