use std::ops::RangeInclusive;

use bigdecimal::BigDecimal;
use log::{debug, warn};

use crate::{
    arena::ExprArena,
    error::{SymError, SymResult},
    expr::{Expr, ExprKind, VarId},
    interpreter::{Environment, Interpreter},
    solver::{Direction, Model, SolverBackend},
    sort::Sort,
    value::Value,
    walker,
};

/// Brute-force backend over small candidate domains.
///
/// Every arbitrary value of the formula ranges over a finite domain derived from its sort:
/// both booleans, the integers of `int_range` that fit the sort, collections of at most
/// `max_collection_len` elements, and records built field by field. Assignments are tried in
/// lexicographic order with the interpreter. Complete within those domains, useless outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumerativeSolver {
    /// Candidates for integer and decimal values.
    pub int_range: RangeInclusive<i64>,
    /// Largest sequence length and map size of a candidate collection.
    pub max_collection_len: usize,
    /// Give up (no model) when the assignment space is larger than this.
    pub max_assignments: usize,
}

impl Default for EnumerativeSolver {
    fn default() -> Self {
        Self {
            int_range: -8..=8,
            max_collection_len: 1,
            max_assignments: 1 << 16,
        }
    }
}

/// Cartesian product of `domains`, first component varying slowest.
fn product(domains: &[Vec<Value>]) -> Vec<Vec<Value>> {
    domains.iter().fold(vec![Vec::new()], |prefixes, domain| {
        prefixes
            .iter()
            .flat_map(|prefix| {
                domain.iter().map(move |value| {
                    let mut next = prefix.clone();
                    next.push(value.clone());
                    next
                })
            })
            .collect()
    })
}

impl EnumerativeSolver {
    /// Candidate values of `sort`.
    pub fn domain(&self, sort: &Sort) -> Vec<Value> {
        match sort {
            Sort::Bool => vec![Value::Bool(false), Value::Bool(true)],
            Sort::Int(int) => {
                let (min, max) = (int.min_value(), int.max_value());
                self.int_range
                    .clone()
                    .map(i128::from)
                    .filter(|value| (min..=max).contains(value))
                    .map(|value| Value::int(*int, value))
                    .collect()
            }
            Sort::BigInt => self.int_range.clone().map(Value::big).collect(),
            Sort::Real => self
                .int_range
                .clone()
                .map(|value| Value::Real(BigDecimal::from(value)))
                .collect(),
            Sort::Seq(elem) => {
                let items = self.domain(elem);
                let mut out = Vec::new();
                for len in 0..=self.max_collection_len {
                    let columns = vec![items.clone(); len];
                    out.extend(
                        product(&columns)
                            .into_iter()
                            .map(|seq| Value::seq(elem.as_ref().clone(), seq)),
                    );
                }
                out
            }
            Sort::Map(key, value) => {
                let mut out = vec![Value::empty_map(key.as_ref().clone(), value.as_ref().clone())];
                if self.max_collection_len > 0 {
                    let values = self.domain(value);
                    for k in self.domain(key) {
                        for v in &values {
                            let entries = [(k.clone(), v.clone())].into_iter().collect();
                            out.push(Value::map(
                                key.as_ref().clone(),
                                value.as_ref().clone(),
                                entries,
                            ));
                        }
                    }
                }
                out
            }
            Sort::Record(record) => {
                let columns: Vec<_> = record
                    .fields()
                    .iter()
                    .map(|(_, field)| self.domain(field))
                    .collect();
                product(&columns)
                    .into_iter()
                    .map(|fields| Value::record_unchecked(record.clone(), fields))
                    .collect()
            }
        }
    }

    /// Variables of `formula` with their domains, the `initial` value of each tried first.
    fn variables(&self, formulas: &[&Expr], initial: &Model) -> Vec<(VarId, Vec<Value>)> {
        let mut found: Vec<Expr> = formulas
            .iter()
            .flat_map(|formula| walker::arbitraries(formula))
            .collect();
        found.sort();
        found.dedup();
        found
            .iter()
            .filter_map(|node| match node.kind() {
                ExprKind::Arbitrary { var, .. } => {
                    let mut domain = self.domain(node.sort());
                    if let Some(start) = initial.get(*var) {
                        if let Some(position) = domain.iter().position(|value| value == start) {
                            domain[..=position].rotate_right(1);
                        }
                    }
                    Some((*var, domain))
                }
                _ => None,
            })
            .collect()
    }

    /// Call `visit` on every assignment until it returns `Some`.
    fn enumerate<T, F>(
        &self,
        variables: &[(VarId, Vec<Value>)],
        mut visit: F,
    ) -> SymResult<Option<T>>
    where
        F: FnMut(&[Value], &Environment) -> SymResult<Option<T>>,
    {
        let total = variables
            .iter()
            .try_fold(1usize, |acc, (_, domain)| acc.checked_mul(domain.len()));
        match total {
            Some(total) if total <= self.max_assignments => {
                debug!(
                    "Enumerating {} assignments of {} variables.",
                    total,
                    variables.len()
                );
            }
            _ => {
                warn!(
                    "Assignment space of {} variables exceeds {} candidates, giving up.",
                    variables.len(),
                    self.max_assignments
                );
                return Ok(None);
            }
        }
        if variables.iter().any(|(_, domain)| domain.is_empty()) {
            return Ok(None);
        }

        let mut digits = vec![0usize; variables.len()];
        loop {
            let values: Vec<Value> = variables
                .iter()
                .zip(&digits)
                .map(|((_, domain), digit)| domain[*digit].clone())
                .collect();
            let env: Environment = variables
                .iter()
                .zip(&values)
                .map(|((var, _), value)| (*var, value.clone()))
                .collect();
            if let Some(found) = visit(&values, &env)? {
                return Ok(Some(found));
            }

            // Odometer increment, last variable fastest.
            let mut position = digits.len();
            loop {
                if position == 0 {
                    return Ok(None);
                }
                position -= 1;
                digits[position] += 1;
                if digits[position] < variables[position].1.len() {
                    break;
                }
                digits[position] = 0;
            }
        }
    }
}

fn truth(formula: &Expr, interpreter: &mut Interpreter<'_>) -> SymResult<bool> {
    let value = interpreter.evaluate(formula)?;
    value.as_bool().ok_or_else(|| {
        SymError::Solver(format!(
            "formula {} evaluated to the non-boolean {}",
            formula.id(),
            value
        ))
    })
}

fn model_of(variables: &[(VarId, Vec<Value>)], values: &[Value]) -> Model {
    variables
        .iter()
        .zip(values)
        .map(|((var, _), value)| (*var, value.clone()))
        .collect()
}

impl SolverBackend for EnumerativeSolver {
    fn solve(
        &self,
        arena: &ExprArena,
        formula: &Expr,
        initial: &Model,
    ) -> SymResult<Option<Model>> {
        formula.sort().expect("solve", &Sort::Bool)?;
        let variables = self.variables(&[formula], initial);
        self.enumerate(&variables, |values, env| {
            let mut interpreter = Interpreter::new(arena, env);
            Ok(truth(formula, &mut interpreter)?.then(|| model_of(&variables, values)))
        })
    }

    fn optimize(
        &self,
        arena: &ExprArena,
        objective: &Expr,
        constraint: &Expr,
        direction: Direction,
    ) -> SymResult<Option<Model>> {
        constraint.sort().expect("optimize", &Sort::Bool)?;
        let variables = self.variables(&[objective, constraint], &Model::new());
        let mut best: Option<(Value, Model)> = None;
        self.enumerate::<(), _>(&variables, |values, env| {
            let mut interpreter = Interpreter::new(arena, env);
            if !truth(constraint, &mut interpreter)? {
                return Ok(None);
            }
            let score = interpreter.evaluate(objective)?;
            let better = match &best {
                None => true,
                Some((current, _)) => match direction {
                    Direction::Maximize => score > *current,
                    Direction::Minimize => score < *current,
                },
            };
            if better {
                best = Some((score, model_of(&variables, values)));
            }
            Ok(None)
        })?;
        Ok(best.map(|(_, model)| model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::IntSort;

    #[test]
    fn domains_respect_integer_width() {
        let solver = EnumerativeSolver {
            int_range: -2..=300,
            ..Default::default()
        };
        let domain = solver.domain(&Sort::Int(IntSort::U8));
        assert_eq!(domain.len(), 256);
        assert_eq!(domain[0], Value::int(IntSort::U8, 0));
        assert_eq!(solver.domain(&Sort::seq(Sort::Bool)).len(), 3);
    }

    #[test]
    fn solves_a_linear_constraint() {
        let arena = ExprArena::new();
        let x = arena.arbitrary(Sort::BigInt, Some("x"));
        let three = arena.constant(Value::big(3));
        let seven = arena.constant(Value::big(7));
        let sum = arena.add(&x, &three).unwrap();
        let formula = arena.eq(&sum, &seven).unwrap();
        let model = EnumerativeSolver::default()
            .solve(&arena, &formula, &Model::new())
            .unwrap()
            .unwrap();
        assert_eq!(model.eval(&arena, &x).unwrap(), Value::big(4));
    }

    #[test]
    fn unsatisfiable_formula_has_no_model() {
        let arena = ExprArena::new();
        let x = arena.arbitrary(Sort::BigInt, Some("x"));
        let y = arena.arbitrary(Sort::BigInt, Some("y"));
        let lt = arena.lt(&x, &y).unwrap();
        let gt = arena.gt(&x, &y).unwrap();
        let formula = arena.and(&lt, &gt).unwrap();
        let solver = EnumerativeSolver {
            int_range: -3..=3,
            ..Default::default()
        };
        assert_eq!(solver.solve(&arena, &formula, &Model::new()).unwrap(), None);
    }

    #[test]
    fn optimizes_within_the_domain() {
        let arena = ExprArena::new();
        let x = arena.arbitrary(Sort::BigInt, Some("x"));
        let limit = arena.constant(Value::big(5));
        let constraint = arena.leq(&x, &limit).unwrap();
        let solver = EnumerativeSolver::default();
        let best = solver
            .optimize(&arena, &x, &constraint, Direction::Maximize)
            .unwrap()
            .unwrap();
        assert_eq!(best.eval(&arena, &x).unwrap(), Value::big(5));
        let worst = solver
            .optimize(&arena, &x, &constraint, Direction::Minimize)
            .unwrap()
            .unwrap();
        assert_eq!(worst.eval(&arena, &x).unwrap(), Value::big(-8));
    }
}
