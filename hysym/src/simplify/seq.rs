use num_bigint::{BigInt, Sign};

use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::{Continuation, Expr, ExprKind},
    sort::Sort,
    value::Value,
};

pub(super) fn case(
    arena: &ExprArena,
    seq: &Expr,
    empty: &Expr,
    cons: &Continuation,
    sort: &Sort,
) -> SymResult<Option<Expr>> {
    match seq.kind() {
        ExprKind::Constant(value) => {
            let Some(items) = value.as_seq() else {
                return Ok(None);
            };
            match items.split_first() {
                None => Ok(Some(empty.clone())),
                Some((head, tail)) => cons
                    .instantiate(arena, arena.constant(head), arena.constant(tail), sort)
                    .map(Some),
            }
        }
        ExprKind::Cons { head, tail } => cons
            .instantiate(arena, head.clone(), tail.clone(), sort)
            .map(Some),
        ExprKind::If {
            guard,
            then,
            otherwise,
        } => {
            let then = arena.case_with(then, empty, cons.clone())?;
            let otherwise = arena.case_with(otherwise, empty, cons.clone())?;
            arena.ite(guard, &then, &otherwise).map(Some)
        }
        _ => Ok(None),
    }
}

pub(super) fn concat(a: &Expr, b: &Expr) -> Option<Expr> {
    if a.is_empty_collection() {
        Some(b.clone())
    } else if b.is_empty_collection() {
        Some(a.clone())
    } else {
        None
    }
}

pub(super) fn length(arena: &ExprArena, seq: &Expr) -> SymResult<Option<Expr>> {
    match seq.kind() {
        ExprKind::Cons { tail, .. } => {
            let rest = arena.length(tail)?;
            arena.add(&rest, &arena.constant(Value::big(1))).map(Some)
        }
        _ => Ok(None),
    }
}

pub(super) fn at(arena: &ExprArena, seq: &Expr, index: &Expr) -> SymResult<Option<Expr>> {
    let (ExprKind::Cons { head, tail }, Some(index)) =
        (seq.kind(), index.as_const().and_then(Value::as_big_int))
    else {
        return Ok(None);
    };
    match index.sign() {
        Sign::NoSign => arena.some(head).map(Some),
        Sign::Minus => Ok(Some(arena.none(head.sort()))),
        Sign::Plus => {
            let next = arena.constant(Value::big(index - BigInt::from(1)));
            arena.at(tail, &next).map(Some)
        }
    }
}
