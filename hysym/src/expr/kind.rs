use std::sync::Arc;

use strum::{EnumCount, EnumDiscriminants, EnumIs, EnumIter, IntoStaticStr};

use crate::{
    expr::{Continuation, Expr, VarId},
    value::Value,
};

/// Arithmetic binary operators, defined on every numeric sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
}

impl ArithOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
        }
    }
}

/// Bitwise binary operators, defined on integer sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BitOp {
    And,
    Or,
    Xor,
}

impl BitOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BitOp::And => "&",
            BitOp::Or => "|",
            BitOp::Xor => "^",
        }
    }
}

/// Ordered comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CmpOp {
    Leq,
    Lt,
    Geq,
    Gt,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Leq => "<=",
            CmpOp::Lt => "<",
            CmpOp::Geq => ">=",
            CmpOp::Gt => ">",
        }
    }

    /// Whether `x op x` holds.
    pub fn is_reflexive(&self) -> bool {
        matches!(self, CmpOp::Leq | CmpOp::Geq)
    }
}

/// Subsequence tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Containment {
    Contains,
    StartsWith,
    EndsWith,
}

/// Map combinations. Values on shared keys always come from the left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum CombineOp {
    Union,
    Intersect,
    Difference,
}

/// The closed set of expression node shapes.
///
/// The result sort of a node is stored next to its kind (see [`Expr::sort`]); variants whose
/// meaning depends on it (`Create`, `Cast`) read it from there.
#[derive(Debug, Clone, EnumIs, EnumDiscriminants)]
#[strum_discriminants(derive(PartialOrd, Ord, Hash, EnumCount, EnumIter, IntoStaticStr))]
#[strum_discriminants(name(ExprVariant))]
#[strum_discriminants(vis(pub))]
pub enum ExprKind {
    Constant(Value),
    /// Free variable, unconstrained until bound by an environment or a model.
    Arbitrary {
        var: VarId,
        name: Option<Arc<str>>,
    },
    /// Function parameter placeholder.
    Argument {
        var: VarId,
    },

    And(Expr, Expr),
    Or(Expr, Expr),
    Not(Expr),
    If {
        guard: Expr,
        then: Expr,
        otherwise: Expr,
    },

    Arith(ArithOp, Expr, Expr),
    Bitwise(BitOp, Expr, Expr),
    BitNot(Expr),
    Eq(Expr, Expr),
    Compare(CmpOp, Expr, Expr),
    Cast(Expr),

    FieldGet {
        record: Expr,
        index: usize,
    },
    FieldWith {
        record: Expr,
        index: usize,
        value: Expr,
    },
    Create(Vec<Expr>),

    Cons {
        head: Expr,
        tail: Expr,
    },
    /// Case split on a sequence: `empty` if it has no elements, `cons(head, tail)` otherwise.
    Case {
        seq: Expr,
        empty: Expr,
        cons: Continuation,
    },
    Concat(Expr, Expr),
    Length(Expr),
    At {
        seq: Expr,
        index: Expr,
    },
    Slice {
        seq: Expr,
        start: Expr,
        len: Expr,
    },
    Replace {
        seq: Expr,
        from: Expr,
        to: Expr,
    },
    IndexOf {
        seq: Expr,
        sub: Expr,
        offset: Expr,
    },
    Containment(Containment, Expr, Expr),

    MapGet {
        map: Expr,
        key: Expr,
    },
    MapSet {
        map: Expr,
        key: Expr,
        value: Expr,
    },
    MapDelete {
        map: Expr,
        key: Expr,
    },
    Combine(CombineOp, Expr, Expr),
}

impl ExprVariant {
    pub fn name(&self) -> &'static str {
        (*self).into()
    }
}

impl ExprKind {
    /// Direct child expressions, in operand order. Continuations are not children.
    pub fn children(&self) -> smallvec::SmallVec<[&Expr; 3]> {
        use smallvec::smallvec;
        match self {
            ExprKind::Constant(_) | ExprKind::Arbitrary { .. } | ExprKind::Argument { .. } => {
                smallvec![]
            }
            ExprKind::Not(a)
            | ExprKind::BitNot(a)
            | ExprKind::Cast(a)
            | ExprKind::Length(a)
            | ExprKind::FieldGet { record: a, .. } => smallvec![a],
            ExprKind::Case { seq, empty, .. } => smallvec![seq, empty],
            ExprKind::And(a, b)
            | ExprKind::Or(a, b)
            | ExprKind::Arith(_, a, b)
            | ExprKind::Bitwise(_, a, b)
            | ExprKind::Eq(a, b)
            | ExprKind::Compare(_, a, b)
            | ExprKind::Concat(a, b)
            | ExprKind::Containment(_, a, b)
            | ExprKind::Combine(_, a, b)
            | ExprKind::FieldWith {
                record: a,
                value: b,
                ..
            }
            | ExprKind::Cons { head: a, tail: b }
            | ExprKind::At { seq: a, index: b }
            | ExprKind::MapGet { map: a, key: b }
            | ExprKind::MapDelete { map: a, key: b } => smallvec![a, b],
            ExprKind::If {
                guard: a,
                then: b,
                otherwise: c,
            }
            | ExprKind::Slice {
                seq: a,
                start: b,
                len: c,
            }
            | ExprKind::Replace {
                seq: a,
                from: b,
                to: c,
            }
            | ExprKind::IndexOf {
                seq: a,
                sub: b,
                offset: c,
            }
            | ExprKind::MapSet {
                map: a,
                key: b,
                value: c,
            } => smallvec![a, b, c],
            ExprKind::Create(fields) => fields.iter().collect(),
        }
    }

    /// Returns `true` if every child is a constant and the node has no continuation.
    pub(crate) fn is_foldable(&self) -> bool {
        match self {
            ExprKind::Constant(_)
            | ExprKind::Arbitrary { .. }
            | ExprKind::Argument { .. }
            | ExprKind::Case { .. } => false,
            _ => self.children().iter().all(|child| child.is_const()),
        }
    }
}
