use crate::{
    arena::ExprArena,
    build::same_sort,
    error::SymResult,
    expr::{CombineOp, Expr, ExprKind},
    sort::Sort,
    value::Value,
};

impl ExprArena {
    fn map_parts<'e>(op: &'static str, map: &'e Expr) -> SymResult<(&'e Sort, &'e Sort)> {
        map.sort().map_parts().ok_or_else(|| map.sort().unsupported(op))
    }

    pub fn empty_map(&self, key: Sort, value: Sort) -> Expr {
        self.constant(Value::empty_map(key, value))
    }

    /// Value bound to `key`, as an option.
    pub fn map_get(&self, map: &Expr, key: &Expr) -> SymResult<Expr> {
        let (key_sort, value_sort) = Self::map_parts("map_get", map)?;
        key.sort().expect("map_get", key_sort)?;
        let sort = Sort::option(value_sort.clone());
        self.intern(
            ExprKind::MapGet {
                map: map.clone(),
                key: key.clone(),
            },
            sort,
        )
    }

    pub fn map_set(&self, map: &Expr, key: &Expr, value: &Expr) -> SymResult<Expr> {
        let (key_sort, value_sort) = Self::map_parts("map_set", map)?;
        key.sort().expect("map_set", key_sort)?;
        value.sort().expect("map_set", value_sort)?;
        let sort = map.sort().clone();
        self.intern(
            ExprKind::MapSet {
                map: map.clone(),
                key: key.clone(),
                value: value.clone(),
            },
            sort,
        )
    }

    pub fn map_delete(&self, map: &Expr, key: &Expr) -> SymResult<Expr> {
        let (key_sort, _) = Self::map_parts("map_delete", map)?;
        key.sort().expect("map_delete", key_sort)?;
        let sort = map.sort().clone();
        self.intern(
            ExprKind::MapDelete {
                map: map.clone(),
                key: key.clone(),
            },
            sort,
        )
    }

    /// Left-biased combination: values on shared keys come from `lhs`.
    pub fn combine(&self, op: CombineOp, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        Self::map_parts(op.into(), lhs)?;
        same_sort(op.into(), lhs, rhs)?;
        let sort = lhs.sort().clone();
        self.intern(ExprKind::Combine(op, lhs.clone(), rhs.clone()), sort)
    }

    pub fn union(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.combine(CombineOp::Union, lhs, rhs)
    }

    pub fn intersect(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.combine(CombineOp::Intersect, lhs, rhs)
    }

    pub fn difference(&self, lhs: &Expr, rhs: &Expr) -> SymResult<Expr> {
        self.combine(CombineOp::Difference, lhs, rhs)
    }
}
