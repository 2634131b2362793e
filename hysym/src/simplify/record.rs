use crate::{
    arena::ExprArena,
    error::SymResult,
    expr::{Expr, ExprKind},
};

pub(super) fn field_get(arena: &ExprArena, record: &Expr, index: usize) -> SymResult<Option<Expr>> {
    match record.kind() {
        ExprKind::Create(fields) => Ok(fields.get(index).cloned()),
        ExprKind::FieldWith {
            record: inner,
            index: updated,
            value,
        } => {
            if *updated == index {
                Ok(Some(value.clone()))
            } else {
                arena.field_get(inner, index).map(Some)
            }
        }
        _ => Ok(None),
    }
}

pub(super) fn field_with(
    arena: &ExprArena,
    record: &Expr,
    index: usize,
    value: &Expr,
) -> SymResult<Option<Expr>> {
    // Writing back a field read from the same record.
    if let ExprKind::FieldGet {
        record: source,
        index: read,
    } = value.kind()
    {
        if source == record && *read == index {
            return Ok(Some(record.clone()));
        }
    }
    match (record.kind(), record.sort().as_record()) {
        (ExprKind::Create(fields), Some(sort)) => {
            let mut fields = fields.clone();
            match fields.get_mut(index) {
                Some(field) => *field = value.clone(),
                None => return Ok(None),
            }
            arena.create(sort, &fields).map(Some)
        }
        (
            ExprKind::FieldWith {
                record: inner,
                index: updated,
                ..
            },
            _,
        ) if *updated == index => arena.field_with(inner, index, value).map(Some),
        _ => Ok(None),
    }
}
