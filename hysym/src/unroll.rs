//! Whole-graph unrolling.
//!
//! [`ExprArena::unroll`] rebuilds an expression bottom-up through the constructors, so every
//! node is simplified again once its children are. A case split whose sequence became known
//! (a constant, a cons node or an `if`) is expanded by the simplifier; one that survives gets a
//! continuation that unrolls whatever it later produces.
//!
//! Results are memoised in the arena under both the input and the output identity, which
//! makes `unroll(unroll(e))` return the same node as `unroll(e)`. Without case splits the
//! rebuild of an output is that output again; a surviving case split would get a second
//! wrapper around its continuation, which the output entry avoids. Unrolling a recursive
//! definition over a known sequence expands it completely; it is not guaranteed to terminate on
//! pathological continuations.
use log::trace;

use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::{Continuation, Expr, ExprKind},
};

const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

impl ExprArena {
    pub fn unroll(&self, expr: &Expr) -> SymResult<Expr> {
        if let Some(done) = self.unrolled(expr.id()) {
            trace!("Unroll memo hit for node {}.", expr.id());
            return Ok(done);
        }
        let out = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || self.rebuild(expr))?;
        self.remember_unrolled(expr, &out);
        Ok(out)
    }

    fn rebuild(&self, expr: &Expr) -> SymResult<Expr> {
        let u = |e: &Expr| self.unroll(e);
        match expr.kind() {
            ExprKind::Constant(_) | ExprKind::Arbitrary { .. } | ExprKind::Argument { .. } => {
                Ok(expr.clone())
            }

            ExprKind::And(a, b) => self.and(&u(a)?, &u(b)?),
            ExprKind::Or(a, b) => self.or(&u(a)?, &u(b)?),
            ExprKind::Not(a) => self.not(&u(a)?),
            ExprKind::If {
                guard,
                then,
                otherwise,
            } => self.ite(&u(guard)?, &u(then)?, &u(otherwise)?),

            ExprKind::Arith(op, a, b) => self.arith(*op, &u(a)?, &u(b)?),
            ExprKind::Bitwise(op, a, b) => self.bitwise(*op, &u(a)?, &u(b)?),
            ExprKind::BitNot(a) => self.bit_not(&u(a)?),
            ExprKind::Eq(a, b) => self.eq(&u(a)?, &u(b)?),
            ExprKind::Compare(op, a, b) => self.compare(*op, &u(a)?, &u(b)?),
            ExprKind::Cast(a) => self.cast(&u(a)?, expr.sort()),

            ExprKind::FieldGet { record, index } => self.field_get(&u(record)?, *index),
            ExprKind::FieldWith {
                record,
                index,
                value,
            } => self.field_with(&u(record)?, *index, &u(value)?),
            ExprKind::Create(fields) => {
                let fields = fields.iter().map(u).collect::<SymResult<Vec<_>>>()?;
                match expr.sort().as_record() {
                    Some(sort) => self.create(sort, &fields),
                    None => Err(expr.sort().unsupported("create")),
                }
            }

            ExprKind::Cons { head, tail } => self.cons(&u(head)?, &u(tail)?),
            ExprKind::Case { seq, empty, cons } => {
                let inner = cons.clone();
                let unrolling = Continuation::new(move |arena: &ExprArena, head, tail| {
                    let body = inner.apply(arena, head, tail)?;
                    arena.unroll(&body)
                });
                self.case_with(&u(seq)?, &u(empty)?, unrolling)
            }
            ExprKind::Concat(a, b) => self.concat(&u(a)?, &u(b)?),
            ExprKind::Length(seq) => self.length(&u(seq)?),
            ExprKind::At { seq, index } => self.at(&u(seq)?, &u(index)?),
            ExprKind::Slice { seq, start, len } => self.slice(&u(seq)?, &u(start)?, &u(len)?),
            ExprKind::Replace { seq, from, to } => self.replace(&u(seq)?, &u(from)?, &u(to)?),
            ExprKind::IndexOf { seq, sub, offset } => {
                self.index_of(&u(seq)?, &u(sub)?, &u(offset)?)
            }
            ExprKind::Containment(kind, seq, sub) => self.containment(*kind, &u(seq)?, &u(sub)?),

            ExprKind::MapGet { map, key } => self.map_get(&u(map)?, &u(key)?),
            ExprKind::MapSet { map, key, value } => {
                self.map_set(&u(map)?, &u(key)?, &u(value)?)
            }
            ExprKind::MapDelete { map, key } => self.map_delete(&u(map)?, &u(key)?),
            ExprKind::Combine(op, a, b) => self.combine(*op, &u(a)?, &u(b)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        arena::ExprArena,
        expr::{Expr, ExprVariant},
        interpreter::{evaluate, Environment},
        sort::Sort,
        value::Value,
    };

    #[test]
    fn unroll_is_idempotent() {
        let arena = ExprArena::new();
        let xs = arena.fresh_argument(Sort::seq(Sort::BigInt));
        let zero = arena.constant(Value::big(0));
        let expr = arena
            .case(&xs, &zero, |arena, head, _| {
                let one = arena.constant(Value::big(1));
                arena.add(&head, &one)
            })
            .unwrap();
        let once = arena.unroll(&expr).unwrap();
        let twice = arena.unroll(&once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(arena.unroll(&expr).unwrap(), once);
    }

    #[test]
    fn rebuilding_an_output_without_the_memo() {
        let arena = ExprArena::new();
        let flag = arena.arbitrary(Sort::Bool, Some("flag"));
        let x = arena.arbitrary(Sort::BigInt, Some("x"));
        let empty = arena.empty_seq(Sort::BigInt);
        let single = arena.cons(&x, &empty).unwrap();
        let xs = arena.ite(&flag, &single, &empty).unwrap();
        let zero = arena.constant(Value::big(0));
        let first = arena.case(&xs, &zero, |_, head, _| Ok(head)).unwrap();

        let once = arena.unroll(&first).unwrap();
        assert_eq!(once.variant(), ExprVariant::If);
        arena.forget_unrolled();
        assert_eq!(arena.unroll(&once).unwrap(), once);
    }

    #[test]
    fn surviving_case_splits_rebuild_to_an_equivalent_node() {
        let arena = ExprArena::new();
        let xs = arena.fresh_argument(Sort::seq(Sort::BigInt));
        let zero = arena.constant(Value::big(0));
        let first = arena.case(&xs, &zero, |_, head, _| Ok(head)).unwrap();

        let once = arena.unroll(&first).unwrap();
        arena.forget_unrolled();
        let again = arena.unroll(&once).unwrap();
        assert_eq!(again.variant(), ExprVariant::Case);
        assert_ne!(again, once);

        let var = |e: &Expr| match e.kind() {
            crate::expr::ExprKind::Argument { var } => *var,
            _ => unreachable!(),
        };
        let items = vec![Value::big(3), Value::big(4)];
        let env = Environment::new().with(var(&xs), Value::seq(Sort::BigInt, items));
        assert_eq!(
            evaluate(&arena, &again, &env).unwrap(),
            evaluate(&arena, &once, &env).unwrap()
        );
    }
}
