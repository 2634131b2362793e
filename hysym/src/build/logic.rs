use crate::{
    arena::ExprArena,
    build::same_sort,
    error::SymResult,
    expr::{Expr, ExprKind},
    sort::Sort,
};

impl ExprArena {
    pub fn and(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        lhs.sort().expect("and", &Sort::Bool)?;
        rhs.sort().expect("and", &Sort::Bool)?;
        self.intern(ExprKind::And(lhs.clone(), rhs.clone()), Sort::Bool)
    }

    pub fn or(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        lhs.sort().expect("or", &Sort::Bool)?;
        rhs.sort().expect("or", &Sort::Bool)?;
        self.intern(ExprKind::Or(lhs.clone(), rhs.clone()), Sort::Bool)
    }

    pub fn not(&self, operand: &Expr) -> SymResult<Expr> {
        operand.sort().expect("not", &Sort::Bool)?;
        self.intern(ExprKind::Not(operand.clone()), Sort::Bool)
    }

    /// `!lhs || rhs`
    pub fn implies(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        let negated = self.not(lhs)?;
        self.or(&negated, rhs)
    }

    /// Conjunction of all operands, `true` when empty.
    pub fn and_all<'a>(&self, operands: impl IntoIterator<Item = &'a Expr>) -> SymResult<Expr> {
        operands
            .into_iter()
            .try_fold(self.constant(true), |acc, operand| self.and(&acc, operand))
    }

    /// Disjunction of all operands, `false` when empty.
    pub fn or_all<'a>(&self, operands: impl IntoIterator<Item = &'a Expr>) -> SymResult<Expr> {
        operands
            .into_iter()
            .try_fold(self.constant(false), |acc, operand| self.or(&acc, operand))
    }

    /// `if guard then then else otherwise`; both branches must share a sort.
    pub fn ite(&self, guard: &Expr, then: &Expr, otherwise: &Expr) -> SymResult<Expr> {
        guard.sort().expect("if", &Sort::Bool)?;
        same_sort("if", then, otherwise)?;
        let sort = then.sort().clone();
        self.intern(
            ExprKind::If {
                guard: guard.clone(),
                then: then.clone(),
                otherwise: otherwise.clone(),
            },
            sort,
        )
    }

    /// Structural equality of two values of the same sort.
    pub fn eq(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        same_sort("==", lhs, rhs)?;
        self.intern(ExprKind::Eq(lhs.clone(), rhs.clone()), Sort::Bool)
    }

    pub fn ne(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        let eq = self.eq(lhs, rhs)?;
        self.not(&eq)
    }
}
