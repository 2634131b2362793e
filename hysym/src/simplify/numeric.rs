use crate::{
    arena::ExprArena,
    expr::{ArithOp, BitOp, CmpOp, Expr, ExprKind},
    sort::Sort,
    value::Value,
};

fn is_zero(e: &Expr) -> bool {
    e.as_const().is_some_and(Value::is_zero)
}

fn is_one(e: &Expr) -> bool {
    e.as_const().is_some_and(Value::is_one)
}

fn zero_of(arena: &ExprArena, e: &Expr) -> Expr {
    arena.constant(e.sort().default_value())
}

pub(super) fn arith(arena: &ExprArena, op: ArithOp, a: &Expr, b: &Expr) -> Option<Expr> {
    match op {
        ArithOp::Add if is_zero(a) => Some(b.clone()),
        ArithOp::Add if is_zero(b) => Some(a.clone()),
        ArithOp::Sub if is_zero(b) => Some(a.clone()),
        ArithOp::Sub if a == b => Some(zero_of(arena, a)),
        ArithOp::Mul if is_zero(a) || is_one(b) => Some(a.clone()),
        ArithOp::Mul if is_zero(b) || is_one(a) => Some(b.clone()),
        _ => None,
    }
}

pub(super) fn bitwise(arena: &ExprArena, op: BitOp, a: &Expr, b: &Expr) -> Option<Expr> {
    match op {
        BitOp::And if is_zero(a) || a == b => Some(a.clone()),
        BitOp::And if is_zero(b) => Some(b.clone()),
        BitOp::Or | BitOp::Xor if is_zero(a) => Some(b.clone()),
        BitOp::Or | BitOp::Xor if is_zero(b) => Some(a.clone()),
        BitOp::Or if a == b => Some(a.clone()),
        BitOp::Xor if a == b => Some(zero_of(arena, a)),
        _ => None,
    }
}

pub(super) fn bit_not(a: &Expr) -> Option<Expr> {
    match a.kind() {
        ExprKind::BitNot(inner) => Some(inner.clone()),
        _ => None,
    }
}

pub(super) fn compare(arena: &ExprArena, op: CmpOp, a: &Expr, b: &Expr) -> Option<Expr> {
    (a == b).then(|| arena.constant(op.is_reflexive()))
}

pub(super) fn cast(a: &Expr, to: &Sort) -> Option<Expr> {
    (a.sort() == to).then(|| a.clone())
}
