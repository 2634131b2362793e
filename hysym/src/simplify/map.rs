use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::{CombineOp, Expr, ExprKind},
    sort::Sort,
};

/// Lookups through updates. Distinct constants are distinct keys since constants are interned.
pub(super) fn get(arena: &ExprArena, map: &Expr, key: &Expr, sort: &Sort) -> SymResult<Option<Expr>> {
    let Some(value_sort) = sort.option_inner() else {
        return Ok(None);
    };
    match map.kind() {
        ExprKind::MapSet {
            map: inner,
            key: updated,
            value,
        } => {
            if updated == key {
                arena.some(value).map(Some)
            } else if updated.is_const() && key.is_const() {
                arena.map_get(inner, key).map(Some)
            } else {
                Ok(None)
            }
        }
        ExprKind::MapDelete {
            map: inner,
            key: deleted,
        } => {
            if deleted == key {
                Ok(Some(arena.none(value_sort)))
            } else if deleted.is_const() && key.is_const() {
                arena.map_get(inner, key).map(Some)
            } else {
                Ok(None)
            }
        }
        _ if map.is_empty_collection() => Ok(Some(arena.none(value_sort))),
        _ => Ok(None),
    }
}

pub(super) fn combine(arena: &ExprArena, op: CombineOp, a: &Expr, b: &Expr) -> SymResult<Option<Expr>> {
    let empty = || arena.constant(a.sort().default_value());
    if a == b {
        return Ok(Some(match op {
            CombineOp::Union | CombineOp::Intersect => a.clone(),
            CombineOp::Difference => empty(),
        }));
    }
    let simplified = match op {
        CombineOp::Union if a.is_empty_collection() => Some(b.clone()),
        CombineOp::Union if b.is_empty_collection() => Some(a.clone()),
        CombineOp::Intersect if a.is_empty_collection() => Some(a.clone()),
        CombineOp::Intersect if b.is_empty_collection() => Some(b.clone()),
        CombineOp::Difference if a.is_empty_collection() || b.is_empty_collection() => {
            Some(a.clone())
        }
        CombineOp::Union | CombineOp::Intersect => nested(op, a, b),
        CombineOp::Difference => match a.kind() {
            ExprKind::Combine(CombineOp::Difference, l, _) if l == b => Some(empty()),
            ExprKind::Combine(CombineOp::Difference, _, r) if r == b => Some(a.clone()),
            _ => None,
        },
    };
    Ok(simplified)
}

/// Collapse `op(a, op(a, x))` and `op(op(x, y), x|y)`, the forms that keep left-biased values.
fn nested(op: CombineOp, a: &Expr, b: &Expr) -> Option<Expr> {
    if let ExprKind::Combine(inner, l, _) = b.kind() {
        if *inner == op && l == a {
            return Some(b.clone());
        }
    }
    if let ExprKind::Combine(inner, l, r) = a.kind() {
        if *inner == op && (l == b || r == b) {
            return Some(a.clone());
        }
    }
    None
}
