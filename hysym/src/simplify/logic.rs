use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::{Expr, ExprKind},
    sort::Sort,
};

fn is_or_of(e: &Expr, operand: &Expr) -> bool {
    matches!(e.kind(), ExprKind::Or(l, r) if l == operand || r == operand)
}

fn is_and_of(e: &Expr, operand: &Expr) -> bool {
    matches!(e.kind(), ExprKind::And(l, r) if l == operand || r == operand)
}

fn is_negation_of(e: &Expr, operand: &Expr) -> bool {
    matches!(e.kind(), ExprKind::Not(inner) if inner == operand)
}

pub(super) fn and(arena: &ExprArena, a: &Expr, b: &Expr) -> SymResult<Option<Expr>> {
    if a.is_false() || b.is_true() || a == b || is_or_of(b, a) {
        return Ok(Some(a.clone()));
    }
    if b.is_false() || a.is_true() || is_or_of(a, b) {
        return Ok(Some(b.clone()));
    }
    if is_negation_of(a, b) || is_negation_of(b, a) {
        return Ok(Some(arena.constant(false)));
    }
    Ok(None)
}

pub(super) fn or(arena: &ExprArena, a: &Expr, b: &Expr) -> SymResult<Option<Expr>> {
    if a.is_true() || b.is_false() || a == b || is_and_of(b, a) {
        return Ok(Some(a.clone()));
    }
    if b.is_true() || a.is_false() || is_and_of(a, b) {
        return Ok(Some(b.clone()));
    }
    if is_negation_of(a, b) || is_negation_of(b, a) {
        return Ok(Some(arena.constant(true)));
    }
    Ok(None)
}

pub(super) fn not(a: &Expr) -> Option<Expr> {
    match a.kind() {
        ExprKind::Not(inner) => Some(inner.clone()),
        _ => None,
    }
}

pub(super) fn ite(
    arena: &ExprArena,
    guard: &Expr,
    then: &Expr,
    otherwise: &Expr,
) -> SymResult<Option<Expr>> {
    if let Some(guard) = guard.as_bool() {
        return Ok(Some(if guard { then } else { otherwise }.clone()));
    }
    if then == otherwise {
        return Ok(Some(then.clone()));
    }
    if *then.sort() != Sort::Bool || arena.config().preserve_branches {
        return Ok(None);
    }
    let rewritten = if then.is_true() {
        arena.or(guard, otherwise)?
    } else if then.is_false() {
        arena.and(&arena.not(guard)?, otherwise)?
    } else if otherwise.is_true() {
        arena.or(&arena.not(guard)?, then)?
    } else if otherwise.is_false() {
        arena.and(guard, then)?
    } else {
        return Ok(None);
    };
    Ok(Some(rewritten))
}

pub(super) fn eq(arena: &ExprArena, a: &Expr, b: &Expr) -> SymResult<Option<Expr>> {
    if a == b {
        return Ok(Some(arena.constant(true)));
    }
    // Boolean equality against a constant is the operand or its negation.
    let (constant, other) = match (a.as_bool(), b.as_bool()) {
        (Some(c), _) => (c, b),
        (_, Some(c)) => (c, a),
        _ => return Ok(None),
    };
    if constant {
        Ok(Some(other.clone()))
    } else {
        arena.not(other).map(Some)
    }
}
