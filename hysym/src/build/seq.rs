use crate::{
    arena::ExprArena,
    build::same_sort,
    error::SymResult,
    expr::{Containment, Continuation, Expr, ExprKind},
    sort::Sort,
    value::Value,
};

impl ExprArena {
    fn seq_elem<'e>(op: &'static str, seq: &'e Expr) -> SymResult<&'e Sort> {
        seq.sort().seq_elem().ok_or_else(|| seq.sort().unsupported(op))
    }

    pub fn empty_seq(&self, elem: Sort) -> Expr {
        self.constant(Value::empty_seq(elem))
    }

    /// Prepend `head` to `tail`.
    pub fn cons(&self, head: &Expr, tail: &Expr) -> SymResult<Expr> {
        let elem = Self::seq_elem("cons", tail)?;
        head.sort().expect("cons", elem)?;
        let sort = tail.sort().clone();
        self.intern(
            ExprKind::Cons {
                head: head.clone(),
                tail: tail.clone(),
            },
            sort,
        )
    }

    /// Sequence of the given elements, as a cons chain.
    pub fn seq_of(&self, elem: Sort, items: &[Expr]) -> SymResult<Expr> {
        items
            .iter()
            .rev()
            .try_fold(self.empty_seq(elem), |tail, head| self.cons(head, &tail))
    }

    /// Case split: `empty` when `seq` has no elements, `cons(head, tail)` otherwise.
    ///
    /// The continuation must build an expression of the same sort as `empty`; it runs when the
    /// split is resolved (at construction for known sequences, at evaluation otherwise).
    pub fn case<F>(&self, seq: &Expr, empty: &Expr, cons: F) -> SymResult<Expr>
    where
        F: Fn(&ExprArena, Expr, Expr) -> SymResult<Expr> + Send + Sync + 'static,
    {
        self.case_with(seq, empty, Continuation::new(cons))
    }

    pub fn case_with(&self, seq: &Expr, empty: &Expr, cons: Continuation) -> SymResult<Expr> {
        Self::seq_elem("case", seq)?;
        let sort = empty.sort().clone();
        self.intern(
            ExprKind::Case {
                seq: seq.clone(),
                empty: empty.clone(),
                cons,
            },
            sort,
        )
    }

    pub fn concat(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        Self::seq_elem("concat", lhs)?;
        same_sort("concat", lhs, rhs)?;
        let sort = lhs.sort().clone();
        self.intern(ExprKind::Concat(lhs.clone(), rhs.clone()), sort)
    }

    /// Number of elements, as a big integer.
    pub fn length(&self, seq: &Expr) -> SymResult<Expr> {
        Self::seq_elem("length", seq)?;
        self.intern(ExprKind::Length(seq.clone()), Sort::BigInt)
    }

    /// Element at a big-integer index, as an option.
    pub fn at(&self, seq: &Expr, index: &Expr) -> SymResult<Expr> {
        let elem = Self::seq_elem("at", seq)?;
        index.sort().expect("at", &Sort::BigInt)?;
        let sort = Sort::option(elem.clone());
        self.intern(
            ExprKind::At {
                seq: seq.clone(),
                index: index.clone(),
            },
            sort,
        )
    }

    /// At most `len` elements starting at `start`, clamped to the sequence.
    pub fn slice(&self, seq: &Expr, start: &Expr, len: &Expr) -> SymResult<Expr> {
        Self::seq_elem("slice", seq)?;
        start.sort().expect("slice", &Sort::BigInt)?;
        len.sort().expect("slice", &Sort::BigInt)?;
        let sort = seq.sort().clone();
        self.intern(
            ExprKind::Slice {
                seq: seq.clone(),
                start: start.clone(),
                len: len.clone(),
            },
            sort,
        )
    }

    /// Replace the first occurrence of `from` by `to`.
    pub fn replace(&self, seq: &Expr, from: &Expr, to: &Expr) -> SymResult<Expr> {
        Self::seq_elem("replace", seq)?;
        same_sort("replace", seq, from)?;
        same_sort("replace", seq, to)?;
        let sort = seq.sort().clone();
        self.intern(
            ExprKind::Replace {
                seq: seq.clone(),
                from: from.clone(),
                to: to.clone(),
            },
            sort,
        )
    }

    /// First index `>= offset` at which `sub` occurs, `-1` if none.
    pub fn index_of(&self, seq: &Expr, sub: &Expr, offset: &Expr) -> SymResult<Expr> {
        Self::seq_elem("index_of", seq)?;
        same_sort("index_of", seq, sub)?;
        offset.sort().expect("index_of", &Sort::BigInt)?;
        self.intern(
            ExprKind::IndexOf {
                seq: seq.clone(),
                sub: sub.clone(),
                offset: offset.clone(),
            },
            Sort::BigInt,
        )
    }

    pub fn containment(&self, kind: Containment, seq: &Expr, sub: &Expr) -> SymResult<Expr> {
        Self::seq_elem(kind.into(), seq)?;
        same_sort(kind.into(), seq, sub)?;
        self.intern(ExprKind::Containment(kind, seq.clone(), sub.clone()), Sort::Bool)
    }

    pub fn contains(&self, seq: &Expr, sub: &Expr) -> SymResult<Expr> {
        self.containment(Containment::Contains, seq, sub)
    }

    pub fn starts_with(&self, seq: &Expr, prefix: &Expr) -> SymResult<Expr> {
        self.containment(Containment::StartsWith, seq, prefix)
    }

    pub fn ends_with(&self, seq: &Expr, suffix: &Expr) -> SymResult<Expr> {
        self.containment(Containment::EndsWith, seq, suffix)
    }
}
