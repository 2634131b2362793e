use crate::{
    arena::ExprArena,
    build::same_sort,
    error::SymResult,
    expr::{ArithOp, BitOp, CmpOp, Expr, ExprKind},
    semantics,
    sort::Sort,
};

impl ExprArena {
    pub fn arith(&self, op: ArithOp, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        if !lhs.sort().is_numeric() {
            return Err(lhs.sort().unsupported(op.into()));
        }
        same_sort(op.into(), lhs, rhs)?;
        let sort = lhs.sort().clone();
        self.intern(ExprKind::Arith(op, lhs.clone(), rhs.clone()), sort)
    }

    pub fn add(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.arith(ArithOp::Add, lhs, rhs)
    }

    pub fn sub(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.arith(ArithOp::Sub, lhs, rhs)
    }

    pub fn mul(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.arith(ArithOp::Mul, lhs, rhs)
    }

    pub fn bitwise(&self, op: BitOp, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        if !lhs.sort().is_bitwise() {
            return Err(lhs.sort().unsupported(op.into()));
        }
        same_sort(op.into(), lhs, rhs)?;
        let sort = lhs.sort().clone();
        self.intern(ExprKind::Bitwise(op, lhs.clone(), rhs.clone()), sort)
    }

    pub fn bit_and(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.bitwise(BitOp::And, lhs, rhs)
    }

    pub fn bit_or(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.bitwise(BitOp::Or, lhs, rhs)
    }

    pub fn bit_xor(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.bitwise(BitOp::Xor, lhs, rhs)
    }

    pub fn bit_not(&self, operand: &Expr) -> SymResult<Expr> {
        if !operand.sort().is_bitwise() {
            return Err(operand.sort().unsupported("bit_not"));
        }
        let sort = operand.sort().clone();
        self.intern(ExprKind::BitNot(operand.clone()), sort)
    }

    pub fn compare(&self, op: CmpOp, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        if !lhs.sort().is_numeric() {
            return Err(lhs.sort().unsupported(op.into()));
        }
        same_sort(op.into(), lhs, rhs)?;
        self.intern(ExprKind::Compare(op, lhs.clone(), rhs.clone()), Sort::Bool)
    }

    pub fn leq(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.compare(CmpOp::Leq, lhs, rhs)
    }

    pub fn lt(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.compare(CmpOp::Lt, lhs, rhs)
    }

    pub fn geq(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.compare(CmpOp::Geq, lhs, rhs)
    }

    pub fn gt(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.compare(CmpOp::Gt, lhs, rhs)
    }

    /// Convert between numeric sorts. Narrowing integer conversions wrap, decimals truncate
    /// toward zero.
    pub fn cast(&self, operand: &Expr, to: &Sort) -> SymResult<Expr> {
        if !semantics::castable(operand.sort(), to) {
            return Err(operand.sort().unsupported("cast"));
        }
        self.intern(ExprKind::Cast(operand.clone()), to.clone())
    }
}
