//! Tree-walking evaluator.
//!
//! Role
//! - Evaluate an expression under an [`Environment`] binding its free variables. Results are
//!   memoised per node for the duration of one call, so shared subexpressions are evaluated
//!   once; nothing is cached across calls.
//! - `and`/`or` short-circuit and `if` evaluates a single branch. A case split over a non-empty
//!   sequence evaluates the arena's cached body for that split, with the concrete head and tail
//!   bound to its placeholders in the memo. Nothing is interned per element.
//! - Unbound arbitrary values evaluate to the default value of their sort; an unbound argument
//!   placeholder is an error.
//!
//! All operations delegate to [`semantics`](crate::semantics), which is also what constant
//! folding and compiled closures use.
mod env;

use std::collections::HashMap;

pub use env::Environment;

use crate::{
    arena::ExprArena,
    error::{SymError, SymResult},
    expr::{Expr, ExprId, ExprKind},
    semantics,
    value::Value,
};

const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Evaluate `expr` under `env`.
pub fn evaluate(arena: &ExprArena, expr: &Expr, env: &Environment) -> SymResult<Value> {
    Interpreter::new(arena, env).evaluate(expr)
}

/// Evaluator for one environment; reuse it to share the memo across several roots.
pub struct Interpreter<'a> {
    arena: &'a ExprArena,
    env: &'a Environment,
    memo: HashMap<ExprId, Value>,
}

impl<'a> Interpreter<'a> {
    pub fn new(arena: &'a ExprArena, env: &'a Environment) -> Self {
        Self {
            arena,
            env,
            memo: HashMap::new(),
        }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> SymResult<Value> {
        if let Some(value) = self.memo.get(&expr.id()) {
            return Ok(value.clone());
        }
        let value = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.evaluate_node(expr))?;
        self.memo.insert(expr.id(), value.clone());
        Ok(value)
    }

    fn evaluate_bool(&mut self, expr: &Expr) -> SymResult<bool> {
        let value = self.evaluate(expr)?;
        value.as_bool().ok_or_else(|| SymError::EvaluationFailed {
            node: expr.id(),
            reason: format!("expected a boolean, got {}", value),
        })
    }

    fn evaluate_node(&mut self, e: &Expr) -> SymResult<Value> {
        let node = e.id();
        let fail = |reason: String| SymError::EvaluationFailed { node, reason };

        match e.kind() {
            ExprKind::Constant(value) => Ok(value.clone()),
            ExprKind::Arbitrary { var, .. } => Ok(self
                .env
                .get(*var)
                .cloned()
                .unwrap_or_else(|| e.sort().default_value())),
            ExprKind::Argument { var } => self
                .env
                .get(*var)
                .cloned()
                .ok_or(SymError::UnboundArgument { node, var: *var }),

            ExprKind::And(a, b) => {
                Ok(Value::Bool(self.evaluate_bool(a)? && self.evaluate_bool(b)?))
            }
            ExprKind::Or(a, b) => {
                Ok(Value::Bool(self.evaluate_bool(a)? || self.evaluate_bool(b)?))
            }
            ExprKind::Not(a) => Ok(Value::Bool(!self.evaluate_bool(a)?)),
            ExprKind::If {
                guard,
                then,
                otherwise,
            } => {
                if self.evaluate_bool(guard)? {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }

            ExprKind::Arith(op, a, b) => {
                let (a, b) = (self.evaluate(a)?, self.evaluate(b)?);
                semantics::arith(*op, &a, &b).map_err(fail)
            }
            ExprKind::Bitwise(op, a, b) => {
                let (a, b) = (self.evaluate(a)?, self.evaluate(b)?);
                semantics::bitwise(*op, &a, &b).map_err(fail)
            }
            ExprKind::BitNot(a) => semantics::bit_not(&self.evaluate(a)?).map_err(fail),
            ExprKind::Eq(a, b) => Ok(Value::Bool(self.evaluate(a)? == self.evaluate(b)?)),
            ExprKind::Compare(op, a, b) => {
                let (a, b) = (self.evaluate(a)?, self.evaluate(b)?);
                semantics::compare(*op, &a, &b).map(Value::Bool).map_err(fail)
            }
            ExprKind::Cast(a) => semantics::cast(&self.evaluate(a)?, e.sort()).map_err(fail),

            ExprKind::FieldGet { record, index } => {
                semantics::field_get(&self.evaluate(record)?, *index).map_err(fail)
            }
            ExprKind::FieldWith {
                record,
                index,
                value,
            } => {
                let (record, value) = (self.evaluate(record)?, self.evaluate(value)?);
                semantics::field_with(&record, *index, &value).map_err(fail)
            }
            ExprKind::Create(fields) => {
                let sort = e
                    .sort()
                    .as_record()
                    .ok_or_else(|| fail(format!("cannot create a record of sort {}", e.sort())))?
                    .clone();
                let values = fields
                    .iter()
                    .map(|field| self.evaluate(field))
                    .collect::<SymResult<Vec<_>>>()?;
                Ok(Value::record_unchecked(sort, values))
            }

            ExprKind::Cons { head, tail } => {
                let (head, tail) = (self.evaluate(head)?, self.evaluate(tail)?);
                semantics::seq_cons(&head, &tail).map_err(fail)
            }
            ExprKind::Case { seq, empty, cons } => {
                let value = self.evaluate(seq)?;
                let items = value
                    .as_seq()
                    .ok_or_else(|| fail(format!("cannot split {}", value)))?;
                match items.split_first() {
                    None => self.evaluate(empty),
                    Some((head, tail)) => {
                        // the placeholders belong to this node only, and `seq` has one value
                        // per call, so binding them in the memo is stable
                        let split = self.arena.case_split(e, seq, cons)?;
                        self.memo.insert(split.head.id(), head);
                        self.memo.insert(split.tail.id(), tail);
                        self.evaluate(&split.body)
                    }
                }
            }
            ExprKind::Concat(a, b) => {
                let (a, b) = (self.evaluate(a)?, self.evaluate(b)?);
                semantics::seq_concat(&a, &b).map_err(fail)
            }
            ExprKind::Length(seq) => semantics::seq_length(&self.evaluate(seq)?).map_err(fail),
            ExprKind::At { seq, index } => {
                let (seq, index) = (self.evaluate(seq)?, self.evaluate(index)?);
                semantics::seq_at(&seq, &index).map_err(fail)
            }
            ExprKind::Slice { seq, start, len } => {
                let seq = self.evaluate(seq)?;
                let (start, len) = (self.evaluate(start)?, self.evaluate(len)?);
                semantics::seq_slice(&seq, &start, &len).map_err(fail)
            }
            ExprKind::Replace { seq, from, to } => {
                let seq = self.evaluate(seq)?;
                let (from, to) = (self.evaluate(from)?, self.evaluate(to)?);
                semantics::seq_replace(&seq, &from, &to).map_err(fail)
            }
            ExprKind::IndexOf { seq, sub, offset } => {
                let seq = self.evaluate(seq)?;
                let (sub, offset) = (self.evaluate(sub)?, self.evaluate(offset)?);
                semantics::seq_index_of(&seq, &sub, &offset).map_err(fail)
            }
            ExprKind::Containment(kind, seq, sub) => {
                let (seq, sub) = (self.evaluate(seq)?, self.evaluate(sub)?);
                semantics::seq_containment(*kind, &seq, &sub)
                    .map(Value::Bool)
                    .map_err(fail)
            }

            ExprKind::MapGet { map, key } => {
                let (map, key) = (self.evaluate(map)?, self.evaluate(key)?);
                semantics::map_get(&map, &key).map_err(fail)
            }
            ExprKind::MapSet { map, key, value } => {
                let map = self.evaluate(map)?;
                let (key, value) = (self.evaluate(key)?, self.evaluate(value)?);
                semantics::map_set(&map, &key, &value).map_err(fail)
            }
            ExprKind::MapDelete { map, key } => {
                let (map, key) = (self.evaluate(map)?, self.evaluate(key)?);
                semantics::map_delete(&map, &key).map_err(fail)
            }
            ExprKind::Combine(op, a, b) => {
                let (a, b) = (self.evaluate(a)?, self.evaluate(b)?);
                semantics::map_combine(*op, &a, &b).map_err(fail)
            }
        }
    }
}
