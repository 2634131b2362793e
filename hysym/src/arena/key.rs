use smallvec::SmallVec;

use crate::{
    expr::{
        ArithOp, BitOp, CmpOp, CombineOp, Containment, Continuation, ExprId, ExprKind,
        ExprVariant, VarId,
    },
    sort::Sort,
    value::Value,
};

/// Variant-specific scalar part of an interning key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Payload {
    None,
    Value(Value),
    Var(VarId),
    Index(usize),
    Arith(ArithOp),
    Bit(BitOp),
    Cmp(CmpOp),
    Containment(Containment),
    Combine(CombineOp),
    /// Holds the closure alive so its address is never reused by another key.
    Continuation(Continuation),
}

/// Structural identity of a node: two kinds with equal keys are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct NodeKey {
    variant: ExprVariant,
    sort: Sort,
    children: SmallVec<[ExprId; 3]>,
    payload: Payload,
}

impl NodeKey {
    pub(crate) fn of(kind: &ExprKind, sort: &Sort) -> Self {
        let payload = match kind {
            ExprKind::Constant(value) => Payload::Value(value.clone()),
            ExprKind::Arbitrary { var, .. } | ExprKind::Argument { var } => Payload::Var(*var),
            ExprKind::Arith(op, ..) => Payload::Arith(*op),
            ExprKind::Bitwise(op, ..) => Payload::Bit(*op),
            ExprKind::Compare(op, ..) => Payload::Cmp(*op),
            ExprKind::Containment(op, ..) => Payload::Containment(*op),
            ExprKind::Combine(op, ..) => Payload::Combine(*op),
            ExprKind::FieldGet { index, .. } | ExprKind::FieldWith { index, .. } => {
                Payload::Index(*index)
            }
            ExprKind::Case { cons, .. } => Payload::Continuation(cons.clone()),
            ExprKind::And(..)
            | ExprKind::Or(..)
            | ExprKind::Not(_)
            | ExprKind::If { .. }
            | ExprKind::BitNot(_)
            | ExprKind::Eq(..)
            | ExprKind::Cast(_)
            | ExprKind::Create(_)
            | ExprKind::Cons { .. }
            | ExprKind::Concat(..)
            | ExprKind::Length(_)
            | ExprKind::At { .. }
            | ExprKind::Slice { .. }
            | ExprKind::Replace { .. }
            | ExprKind::IndexOf { .. }
            | ExprKind::MapGet { .. }
            | ExprKind::MapSet { .. }
            | ExprKind::MapDelete { .. } => Payload::None,
        };
        Self {
            variant: ExprVariant::from(kind),
            sort: sort.clone(),
            children: kind.children().iter().map(|child| child.id()).collect(),
            payload,
        }
    }

    #[inline]
    pub(crate) fn variant(&self) -> ExprVariant {
        self.variant
    }
}
