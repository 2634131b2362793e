//! Construction-time simplifier.
//!
//! [`rewrite`] is the builder the arena runs on an interning miss. Nodes whose operands are all
//! constants are folded by evaluating the raw node with the interpreter, so folding and
//! evaluation share one set of semantics. Otherwise a per-family rule may return an equivalent,
//! smaller expression; when no rule applies the node is allocated as requested.
//!
//! Rules only ever return an operand, a constant, or the result of constructors applied to
//! strictly smaller terms.
mod logic;
mod map;
mod numeric;
mod record;
mod seq;

use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::{Expr, ExprKind},
    interpreter::{self, Environment},
    sort::Sort,
};

const RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 2 * 1024 * 1024;

/// Simplify `(kind, sort)` or allocate it unchanged.
pub(crate) fn rewrite(arena: &ExprArena, kind: ExprKind, sort: Sort) -> SymResult<Expr> {
    let simplified = stacker::maybe_grow(RED_ZONE, STACK_GROWTH, || simplify(arena, &kind, &sort))?;
    Ok(simplified.unwrap_or_else(|| Expr::new(kind, sort)))
}

fn simplify(arena: &ExprArena, kind: &ExprKind, sort: &Sort) -> SymResult<Option<Expr>> {
    if kind.is_foldable() {
        return fold(arena, kind, sort).map(Some);
    }
    match kind {
        ExprKind::Constant(_) | ExprKind::Arbitrary { .. } | ExprKind::Argument { .. } => Ok(None),

        ExprKind::And(a, b) => logic::and(arena, a, b),
        ExprKind::Or(a, b) => logic::or(arena, a, b),
        ExprKind::Not(a) => Ok(logic::not(a)),
        ExprKind::If {
            guard,
            then,
            otherwise,
        } => logic::ite(arena, guard, then, otherwise),
        ExprKind::Eq(a, b) => logic::eq(arena, a, b),

        ExprKind::Arith(op, a, b) => Ok(numeric::arith(arena, *op, a, b)),
        ExprKind::Bitwise(op, a, b) => Ok(numeric::bitwise(arena, *op, a, b)),
        ExprKind::BitNot(a) => Ok(numeric::bit_not(a)),
        ExprKind::Compare(op, a, b) => Ok(numeric::compare(arena, *op, a, b)),
        ExprKind::Cast(a) => Ok(numeric::cast(a, sort)),

        ExprKind::FieldGet { record, index } => record::field_get(arena, record, *index),
        ExprKind::FieldWith {
            record,
            index,
            value,
        } => record::field_with(arena, record, *index, value),
        ExprKind::Create(_) => Ok(None),

        ExprKind::Cons { .. } => Ok(None),
        ExprKind::Case { seq, empty, cons } => seq::case(arena, seq, empty, cons, sort),
        ExprKind::Concat(a, b) => Ok(seq::concat(a, b)),
        ExprKind::Length(s) => seq::length(arena, s),
        ExprKind::At { seq, index } => seq::at(arena, seq, index),
        ExprKind::Slice { .. }
        | ExprKind::Replace { .. }
        | ExprKind::IndexOf { .. }
        | ExprKind::Containment(..) => Ok(None),

        ExprKind::MapGet { map, key } => map::get(arena, map, key, sort),
        ExprKind::MapSet { .. } | ExprKind::MapDelete { .. } => Ok(None),
        ExprKind::Combine(op, a, b) => map::combine(arena, *op, a, b),
    }
}

/// Evaluate a node whose operands are all constants.
fn fold(arena: &ExprArena, kind: &ExprKind, sort: &Sort) -> SymResult<Expr> {
    let raw = Expr::new(kind.clone(), sort.clone());
    let value = interpreter::evaluate(arena, &raw, &Environment::new())?;
    Ok(arena.constant(value))
}
