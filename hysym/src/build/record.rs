use std::sync::Arc;

use crate::{
    arena::ExprArena,
    error::{SymError, SymResult},
    expr::{Expr, ExprKind},
    sort::{RecordSort, Sort},
    value::Value,
};

impl ExprArena {
    /// Field `index` of a record.
    pub fn field_get(&self, record: &Expr, index: usize) -> SymResult<Expr> {
        let field_sort = record
            .sort()
            .as_record()
            .ok_or_else(|| record.sort().unsupported("field_get"))?
            .check_field(index)?
            .clone();
        self.intern(
            ExprKind::FieldGet {
                record: record.clone(),
                index,
            },
            field_sort,
        )
    }

    /// Field of a record, by name.
    pub fn field(&self, record: &Expr, name: &str) -> SymResult<Expr> {
        let sort = record
            .sort()
            .as_record()
            .ok_or_else(|| record.sort().unsupported("field"))?;
        let index = sort
            .field_index(name)
            .ok_or_else(|| SymError::FieldOutOfRange {
                record: sort.name().to_string(),
                index: sort.len(),
                len: sort.len(),
            })?;
        self.field_get(record, index)
    }

    /// Copy of `record` where field `index` is replaced by `value`.
    pub fn field_with(&self, record: &Expr, index: usize, value: &Expr) -> SymResult<Expr> {
        let field_sort = record
            .sort()
            .as_record()
            .ok_or_else(|| record.sort().unsupported("field_with"))?
            .check_field(index)?;
        value.sort().expect("field_with", field_sort)?;
        let sort = record.sort().clone();
        self.intern(
            ExprKind::FieldWith {
                record: record.clone(),
                index,
                value: value.clone(),
            },
            sort,
        )
    }

    /// Build a record of the given sort from its fields, in declaration order.
    pub fn create(&self, sort: &Arc<RecordSort>, fields: &[Expr]) -> SymResult<Expr> {
        if fields.len() != sort.len() {
            return Err(SymError::ArityMismatch {
                op: "create",
                expected: sort.len(),
                found: fields.len(),
            });
        }
        for ((_, field_sort), field) in sort.fields().iter().zip(fields) {
            field.sort().expect("create", field_sort)?;
        }
        self.intern(ExprKind::Create(fields.to_vec()), Sort::Record(sort.clone()))
    }

    /// `Option::some(value)`.
    pub fn some(&self, value: &Expr) -> SymResult<Expr> {
        let sort = RecordSort::option(value.sort().clone());
        let present = self.constant(true);
        self.create(&sort, &[present, value.clone()])
    }

    /// `Option::none()` with the given inner sort.
    pub fn none(&self, inner: &Sort) -> Expr {
        self.constant(Value::none(inner))
    }

    pub fn has_value(&self, option: &Expr) -> SymResult<Expr> {
        Self::check_option("has_value", option)?;
        self.field_get(option, RecordSort::OPTION_HAS_VALUE)
    }

    /// Content of an option; the default value of the inner sort when absent.
    pub fn option_value(&self, option: &Expr) -> SymResult<Expr> {
        Self::check_option("option_value", option)?;
        self.field_get(option, RecordSort::OPTION_VALUE)
    }

    fn check_option(op: &'static str, option: &Expr) -> SymResult<()> {
        match option.sort().option_inner() {
            Some(_) => Ok(()),
            None => Err(option.sort().unsupported(op)),
        }
    }
}
