use log::debug;

use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::Expr,
    function::FunctionCore,
    solver::{InputGenerator, Model, Search, SolverBackend, TypeGenerator},
    sort::Sort,
    value::Value,
    walker,
};

/// Symbolic values shaped after their sort.
///
/// Scalars and maps are single arbitrary values. Records are created field by field. A
/// sequence is a chain of `depth` cons cells over symbolic elements; with `exhaustive_depth`
/// each cell is guarded by its own boolean, so any length up to `depth` can be chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShapeGenerator;

impl TypeGenerator for ShapeGenerator {
    fn symbolic_value(
        &self,
        arena: &ExprArena,
        sort: &Sort,
        depth: usize,
        exhaustive_depth: bool,
        name: &str,
    ) -> SymResult<Expr> {
        match sort {
            Sort::Seq(elem) => {
                let empty = arena.empty_seq(elem.as_ref().clone());
                let mut seq = empty.clone();
                for index in (0..depth).rev() {
                    let head = self.symbolic_value(
                        arena,
                        elem,
                        depth,
                        exhaustive_depth,
                        &format!("{}[{}]", name, index),
                    )?;
                    let cell = arena.cons(&head, &seq)?;
                    seq = if exhaustive_depth {
                        let present =
                            arena.arbitrary(Sort::Bool, Some(&format!("{}.has[{}]", name, index)));
                        arena.ite(&present, &cell, &empty)?
                    } else {
                        cell
                    };
                }
                Ok(seq)
            }
            Sort::Record(record) => {
                let fields = record
                    .fields()
                    .iter()
                    .map(|(field, field_sort)| {
                        self.symbolic_value(
                            arena,
                            field_sort,
                            depth,
                            exhaustive_depth,
                            &format!("{}.{}", name, field),
                        )
                    })
                    .collect::<SymResult<Vec<_>>>()?;
                arena.create(record, &fields)
            }
            _ => Ok(arena.arbitrary(sort.clone(), Some(name))),
        }
    }
}

/// Inputs covering both outcomes of every guard of a function.
///
/// The function is applied to symbolic inputs and unrolled; each `if` guard of the result is
/// then asked to be true and to be false. Every satisfiable outcome contributes one input,
/// duplicates are dropped, and the search's `max_results` caps the total.
#[derive(Debug, Clone, Default)]
pub struct PathInputGenerator<S, G> {
    pub search: Search<S, G>,
}

impl<S: SolverBackend, G: TypeGenerator> PathInputGenerator<S, G> {
    pub fn new(search: Search<S, G>) -> Self {
        Self { search }
    }
}

impl<S: SolverBackend, G: TypeGenerator> InputGenerator for PathInputGenerator<S, G> {
    fn generate(&self, function: &FunctionCore<'_>) -> SymResult<Vec<Vec<Value>>> {
        let arena = function.arena();
        let inputs = self.search.symbolic_inputs(function)?;
        let output = arena.unroll(&function.apply(&inputs)?)?;

        let mut targets = vec![arena.constant(true)];
        for guard in walker::guards(&output) {
            targets.push(arena.not(&guard)?);
            targets.push(guard);
        }

        let mut found: Vec<Vec<Value>> = Vec::new();
        for target in &targets {
            if found.len() >= self.search.config.max_results {
                break;
            }
            let Some(model) = self.search.solver.solve(arena, target, &Model::new())? else {
                continue;
            };
            let values = self.search.concretize(arena, &inputs, &model)?;
            if !found.contains(&values) {
                found.push(values);
            }
        }
        debug!(
            "Generated {} input(s) from {} guard outcomes.",
            found.len(),
            targets.len() - 1
        );
        Ok(found)
    }
}
