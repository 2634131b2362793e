//! Search for inputs through pluggable solver backends.
//!
//! Role
//! - [`SolverBackend`] decides boolean formulas over arbitrary values and optimises numeric
//!   objectives. Its answer is a [`Model`] binding the formula's free variables.
//! - [`TypeGenerator`] builds symbolic inputs of a sort out of arbitrary values.
//! - [`InputGenerator`] produces concrete test inputs for a whole function.
//!
//! The search operations on [`FunctionCore`] (`find`, `find_all`, `optimize`) build one
//! symbolic input per parameter, apply the function's body builder to them, combine the
//! caller's predicate with the output, unroll the resulting formula and hand it to the
//! backend. A model is turned back into concrete inputs by evaluating the symbolic inputs
//! under it; variables the model leaves unbound take their default value.
//!
//! "No model" is `Ok(None)`; `Err` means the formula could not be built or evaluated.
mod enumerative;
mod generate;

use std::collections::BTreeMap;

use log::debug;

pub use enumerative::EnumerativeSolver;
pub use generate::{PathInputGenerator, ShapeGenerator};

use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::{Expr, VarId},
    function::FunctionCore,
    interpreter::{self, Environment},
    sort::Sort,
    value::Value,
};

/// Assignment of free variables found by a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    assignments: BTreeMap<VarId, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: VarId) -> Option<&Value> {
        self.assignments.get(&var)
    }

    pub fn insert(&mut self, var: VarId, value: Value) -> Option<Value> {
        self.assignments.insert(var, value)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VarId, &Value)> {
        self.assignments.iter().map(|(var, value)| (*var, value))
    }

    pub fn environment(&self) -> Environment {
        self.assignments
            .iter()
            .map(|(var, value)| (*var, value.clone()))
            .collect()
    }

    /// Value of `expr` under this model.
    pub fn eval(&self, arena: &ExprArena, expr: &Expr) -> SymResult<Value> {
        interpreter::evaluate(arena, expr, &self.environment())
    }
}

impl FromIterator<(VarId, Value)> for Model {
    fn from_iter<T: IntoIterator<Item = (VarId, Value)>>(iter: T) -> Self {
        Self {
            assignments: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Maximize,
    Minimize,
}

/// Decision procedure for boolean formulas over arbitrary values.
pub trait SolverBackend {
    /// Find a model of `formula`, preferring one close to `initial`.
    fn solve(&self, arena: &ExprArena, formula: &Expr, initial: &Model)
    -> SymResult<Option<Model>>;

    /// Find a model of `constraint` that is optimal for `objective` in `direction`.
    fn optimize(
        &self,
        arena: &ExprArena,
        objective: &Expr,
        constraint: &Expr,
        direction: Direction,
    ) -> SymResult<Option<Model>>;
}

/// Builder of symbolic values of a sort.
pub trait TypeGenerator {
    /// Fresh symbolic value of `sort`. Sequences get at most `depth` elements, every length up
    /// to `depth` when `exhaustive_depth` is set and exactly `depth` otherwise.
    fn symbolic_value(
        &self,
        arena: &ExprArena,
        sort: &Sort,
        depth: usize,
        exhaustive_depth: bool,
        name: &str,
    ) -> SymResult<Expr>;

    fn default_value(&self, sort: &Sort) -> Value {
        sort.default_value()
    }
}

/// Producer of concrete inputs for a function.
pub trait InputGenerator {
    fn generate(&self, function: &FunctionCore<'_>) -> SymResult<Vec<Vec<Value>>>;
}

/// Bounds of a symbolic search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Size bound of symbolic inputs (sequence length).
    pub depth: usize,
    /// Make every size up to `depth` reachable instead of exactly `depth`.
    pub exhaustive_depth: bool,
    /// Largest number of results returned by `find_all` and input generators.
    pub max_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            exhaustive_depth: true,
            max_results: 16,
        }
    }
}

/// Backend, type generator and bounds used together by one search.
#[derive(Debug, Clone, Default)]
pub struct Search<S, G> {
    pub solver: S,
    pub generator: G,
    pub config: SearchConfig,
}

impl<S: SolverBackend, G: TypeGenerator> Search<S, G> {
    pub fn new(solver: S, generator: G, config: SearchConfig) -> Self {
        Self {
            solver,
            generator,
            config,
        }
    }

    /// One symbolic input per parameter of `function`.
    pub fn symbolic_inputs(&self, function: &FunctionCore<'_>) -> SymResult<Vec<Expr>> {
        let arena = function.arena();
        function
            .param_sorts()
            .enumerate()
            .map(|(position, sort)| {
                self.generator.symbolic_value(
                    arena,
                    sort,
                    self.config.depth,
                    self.config.exhaustive_depth,
                    &format!("arg{}", position),
                )
            })
            .collect()
    }

    /// Concrete inputs selected by `model`.
    pub fn concretize(
        &self,
        arena: &ExprArena,
        inputs: &[Expr],
        model: &Model,
    ) -> SymResult<Vec<Value>> {
        let env = model.environment();
        inputs
            .iter()
            .map(|input| interpreter::evaluate(arena, input, &env))
            .collect()
    }
}

/// Symbolic inputs, output and formula of one search over a function.
struct Query {
    inputs: Vec<Expr>,
    output: Expr,
    formula: Expr,
}

impl<'a> FunctionCore<'a> {
    fn query<S, G, P>(&self, search: &Search<S, G>, predicate: P) -> SymResult<Query>
    where
        S: SolverBackend,
        G: TypeGenerator,
        P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
    {
        let arena = self.arena();
        let inputs = search.symbolic_inputs(self)?;
        let output = self.apply(&inputs)?;
        let formula = predicate(arena, &inputs, &output)?;
        formula.sort().expect("find", &Sort::Bool)?;
        let formula = arena.unroll(&formula)?;
        Ok(Query {
            inputs,
            output,
            formula,
        })
    }

    /// Inputs whose output satisfies `predicate`, if the backend finds any.
    pub fn find<S, G, P>(&self, search: &Search<S, G>, predicate: P) -> SymResult<Option<Vec<Value>>>
    where
        S: SolverBackend,
        G: TypeGenerator,
        P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
    {
        let arena = self.arena();
        let query = self.query(search, predicate)?;
        match search.solver.solve(arena, &query.formula, &Model::new())? {
            Some(model) => search.concretize(arena, &query.inputs, &model).map(Some),
            None => {
                debug!("No model for function {}.", self.body().id());
                Ok(None)
            }
        }
    }

    /// Distinct inputs satisfying `predicate`; each answer is excluded from the next query.
    pub fn find_all<S, G, P>(&self, search: &Search<S, G>, predicate: P) -> SymResult<Vec<Vec<Value>>>
    where
        S: SolverBackend,
        G: TypeGenerator,
        P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
    {
        let arena = self.arena();
        let query = self.query(search, predicate)?;
        let mut formula = query.formula.clone();
        let mut found: Vec<Vec<Value>> = Vec::new();

        while found.len() < search.config.max_results {
            let Some(model) = search.solver.solve(arena, &formula, &Model::new())? else {
                break;
            };
            let values = search.concretize(arena, &query.inputs, &model)?;
            if found.contains(&values) {
                // Blocking clause not honoured by the backend.
                break;
            }
            let differs = query
                .inputs
                .iter()
                .zip(&values)
                .map(|(input, value)| arena.ne(input, &arena.constant(value.clone())))
                .collect::<SymResult<Vec<_>>>()?;
            let block = arena.or_all(&differs)?;
            formula = arena.and(&formula, &block)?;
            found.push(values);
        }
        debug!(
            "Found {} input(s) for function {}.",
            found.len(),
            self.body().id()
        );
        Ok(found)
    }

    /// Inputs satisfying `constraint` with an optimal `objective`.
    pub fn optimize<S, G, O, P>(
        &self,
        search: &Search<S, G>,
        direction: Direction,
        objective: O,
        constraint: P,
    ) -> SymResult<Option<Vec<Value>>>
    where
        S: SolverBackend,
        G: TypeGenerator,
        O: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
        P: Fn(&ExprArena, &[Expr], &Expr) -> SymResult<Expr>,
    {
        let arena = self.arena();
        let query = self.query(search, constraint)?;
        let objective = objective(arena, &query.inputs, &query.output)?;
        if !objective.sort().is_numeric() {
            return Err(objective.sort().unsupported("optimize"));
        }
        let objective = arena.unroll(&objective)?;
        match search
            .solver
            .optimize(arena, &objective, &query.formula, direction)?
        {
            Some(model) => search.concretize(arena, &query.inputs, &model).map(Some),
            None => Ok(None),
        }
    }
}
