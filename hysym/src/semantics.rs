//! Operational semantics of every non-structural operation, on concrete values.
//!
//! The interpreter, the compiled closures and constant folding all call into this module, so
//! the three execution paths agree by construction. Numeric operations follow the exact
//! semantics of the operand sort: fixed-width integers wrap modulo `2^bits`, big integers and
//! decimals are exact.
//!
//! Functions return `Err(reason)` on operand shapes that constructors would have rejected; the
//! caller attaches the offending node.
use std::collections::BTreeMap;

use bigdecimal::{BigDecimal, ToPrimitive};
use num_bigint::BigInt;

use crate::{
    expr::kind::{ArithOp, BitOp, CmpOp, CombineOp, Containment},
    sort::{IntSort, Sort},
    value::{IntValue, Value},
};

/// Failure reason of a value-level operation.
pub type OpResult<T> = Result<T, String>;

fn mismatch(op: &str, values: &[&Value]) -> String {
    let sorts = values
        .iter()
        .map(|v| v.sort().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("'{}' is not defined on ({})", op, sorts)
}

// ============================ Numeric ============================

pub fn arith(op: ArithOp, lhs: &Value, rhs: &Value) -> OpResult<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) if a.sort() == b.sort() => {
            let raw = match op {
                ArithOp::Add => a.raw().wrapping_add(b.raw()),
                ArithOp::Sub => a.raw().wrapping_sub(b.raw()),
                ArithOp::Mul => a.raw().wrapping_mul(b.raw()),
            };
            Ok(Value::Int(IntValue::from_raw(a.sort(), raw)))
        }
        (Value::BigInt(a), Value::BigInt(b)) => Ok(Value::BigInt(match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
        })),
        (Value::Real(a), Value::Real(b)) => Ok(Value::Real(match op {
            ArithOp::Add => a + b,
            ArithOp::Sub => a - b,
            ArithOp::Mul => a * b,
        })),
        _ => Err(mismatch(op.symbol(), &[lhs, rhs])),
    }
}

pub fn bitwise(op: BitOp, lhs: &Value, rhs: &Value) -> OpResult<Value> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) if a.sort() == b.sort() => {
            let raw = match op {
                BitOp::And => a.raw() & b.raw(),
                BitOp::Or => a.raw() | b.raw(),
                BitOp::Xor => a.raw() ^ b.raw(),
            };
            Ok(Value::Int(IntValue::from_raw(a.sort(), raw)))
        }
        (Value::BigInt(a), Value::BigInt(b)) => Ok(Value::BigInt(match op {
            BitOp::And => a & b,
            BitOp::Or => a | b,
            BitOp::Xor => a ^ b,
        })),
        _ => Err(mismatch(op.symbol(), &[lhs, rhs])),
    }
}

pub fn bit_not(value: &Value) -> OpResult<Value> {
    match value {
        Value::Int(a) => Ok(Value::Int(IntValue::from_raw(a.sort(), !a.raw()))),
        Value::BigInt(a) => Ok(Value::BigInt(!a)),
        _ => Err(mismatch("~", &[value])),
    }
}

pub fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> OpResult<bool> {
    if lhs.sort() != rhs.sort() || !lhs.sort().is_numeric() {
        return Err(mismatch(op.symbol(), &[lhs, rhs]));
    }
    let ordering = lhs.cmp(rhs);
    Ok(match op {
        CmpOp::Leq => ordering.is_le(),
        CmpOp::Lt => ordering.is_lt(),
        CmpOp::Geq => ordering.is_ge(),
        CmpOp::Gt => ordering.is_gt(),
    })
}

/// Returns `true` if [`cast`] converts values of sort `from` into `to`.
pub fn castable(from: &Sort, to: &Sort) -> bool {
    from == to
        || matches!(
            (from, to),
            (Sort::Int(_), Sort::Int(_))
                | (Sort::Int(_), Sort::BigInt)
                | (Sort::BigInt, Sort::Int(_))
                | (Sort::Int(_), Sort::Real)
                | (Sort::BigInt, Sort::Real)
                | (Sort::Real, Sort::BigInt)
                | (Sort::Real, Sort::Int(_))
        )
}

fn big_to_int(value: &BigInt, sort: IntSort) -> IntValue {
    let low = value & BigInt::from(u64::MAX);
    IntValue::from_raw(sort, low.to_u64().unwrap_or_default())
}

fn real_to_big(value: &BigDecimal) -> BigInt {
    value.with_scale(0).as_bigint_and_exponent().0
}

pub fn cast(value: &Value, to: &Sort) -> OpResult<Value> {
    if &value.sort() == to {
        return Ok(value.clone());
    }
    match (value, to) {
        (Value::Int(a), Sort::Int(target)) => Ok(Value::int(*target, a.value())),
        (Value::Int(a), Sort::BigInt) => Ok(Value::big(a.value())),
        (Value::Int(a), Sort::Real) => Ok(Value::Real(BigDecimal::from(BigInt::from(a.value())))),
        (Value::BigInt(a), Sort::Int(target)) => Ok(Value::Int(big_to_int(a, *target))),
        (Value::BigInt(a), Sort::Real) => Ok(Value::Real(BigDecimal::from(a.clone()))),
        (Value::Real(a), Sort::BigInt) => Ok(Value::BigInt(real_to_big(a))),
        (Value::Real(a), Sort::Int(target)) => Ok(Value::Int(big_to_int(&real_to_big(a), *target))),
        _ => Err(format!("cannot cast {} to {}", value.sort(), to)),
    }
}

// ============================ Sequences ============================

fn seq_parts<'a>(op: &str, value: &'a Value) -> OpResult<(&'a Sort, &'a [Value])> {
    value
        .as_seq()
        .map(|seq| (seq.elem_sort(), seq.items()))
        .ok_or_else(|| mismatch(op, &[value]))
}

fn big_index(op: &str, value: &Value) -> OpResult<BigInt> {
    value
        .as_big_int()
        .cloned()
        .ok_or_else(|| mismatch(op, &[value]))
}

fn find_from(haystack: &[Value], needle: &[Value], start: usize) -> Option<usize> {
    if needle.is_empty() {
        return (start <= haystack.len()).then_some(start);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (start..=haystack.len() - needle.len()).find(|&i| &haystack[i..i + needle.len()] == needle)
}

pub fn seq_cons(head: &Value, tail: &Value) -> OpResult<Value> {
    let (elem, items) = seq_parts("cons", tail)?;
    let mut out = Vec::with_capacity(items.len() + 1);
    out.push(head.clone());
    out.extend_from_slice(items);
    Ok(Value::seq(elem.clone(), out))
}

pub fn seq_concat(lhs: &Value, rhs: &Value) -> OpResult<Value> {
    let (elem, a) = seq_parts("++", lhs)?;
    let (_, b) = seq_parts("++", rhs)?;
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    Ok(Value::seq(elem.clone(), out))
}

pub fn seq_length(seq: &Value) -> OpResult<Value> {
    let (_, items) = seq_parts("length", seq)?;
    Ok(Value::big(items.len()))
}

/// Element at `index`, as an option.
pub fn seq_at(seq: &Value, index: &Value) -> OpResult<Value> {
    let (elem, items) = seq_parts("at", seq)?;
    let index = big_index("at", index)?;
    let item = index.to_usize().and_then(|i| items.get(i)).cloned();
    Ok(Value::option(elem, item))
}

/// Subsequence of at most `len` elements starting at `start`, clamped to the sequence.
pub fn seq_slice(seq: &Value, start: &Value, len: &Value) -> OpResult<Value> {
    let (elem, items) = seq_parts("slice", seq)?;
    let start = big_index("slice", start)?;
    let len = big_index("slice", len)?;
    let (Some(start), Some(len)) = (start.to_usize(), len.to_usize()) else {
        return Ok(Value::empty_seq(elem.clone()));
    };
    if start >= items.len() {
        return Ok(Value::empty_seq(elem.clone()));
    }
    let end = start.saturating_add(len).min(items.len());
    Ok(Value::seq(elem.clone(), items[start..end].to_vec()))
}

/// Replace the first occurrence of `from` by `to`; an empty `from` prepends `to`.
pub fn seq_replace(seq: &Value, from: &Value, to: &Value) -> OpResult<Value> {
    let (elem, items) = seq_parts("replace", seq)?;
    let (_, pattern) = seq_parts("replace", from)?;
    let (_, replacement) = seq_parts("replace", to)?;
    match find_from(items, pattern, 0) {
        Some(at) => {
            let mut out = Vec::with_capacity(items.len() + replacement.len());
            out.extend_from_slice(&items[..at]);
            out.extend_from_slice(replacement);
            out.extend_from_slice(&items[at + pattern.len()..]);
            Ok(Value::seq(elem.clone(), out))
        }
        None => Ok(seq.clone()),
    }
}

/// First index `>= offset` where `sub` occurs, or `-1`.
pub fn seq_index_of(seq: &Value, sub: &Value, offset: &Value) -> OpResult<Value> {
    let (_, items) = seq_parts("index_of", seq)?;
    let (_, needle) = seq_parts("index_of", sub)?;
    let offset = big_index("index_of", offset)?;
    let found = offset
        .to_usize()
        .and_then(|offset| find_from(items, needle, offset));
    Ok(match found {
        Some(index) => Value::big(index),
        None => Value::big(-1),
    })
}

pub fn seq_containment(kind: Containment, seq: &Value, sub: &Value) -> OpResult<bool> {
    let (_, items) = seq_parts(kind.into(), seq)?;
    let (_, needle) = seq_parts(kind.into(), sub)?;
    Ok(match kind {
        Containment::Contains => find_from(items, needle, 0).is_some(),
        Containment::StartsWith => items.starts_with(needle),
        Containment::EndsWith => items.ends_with(needle),
    })
}

// ============================== Maps ==============================

/// Value bound to `key`, as an option.
pub fn map_get(map: &Value, key: &Value) -> OpResult<Value> {
    let map = map.as_map().ok_or_else(|| mismatch("get", &[map]))?;
    Ok(Value::option(map.value_sort(), map.get(key).cloned()))
}

pub fn map_set(map: &Value, key: &Value, value: &Value) -> OpResult<Value> {
    let map = map.as_map().ok_or_else(|| mismatch("set", &[map]))?;
    let mut entries = map.entries().clone();
    entries.insert(key.clone(), value.clone());
    Ok(map.with_entries(entries))
}

pub fn map_delete(map: &Value, key: &Value) -> OpResult<Value> {
    let map = map.as_map().ok_or_else(|| mismatch("delete", &[map]))?;
    let mut entries = map.entries().clone();
    entries.remove(key);
    Ok(map.with_entries(entries))
}

/// Left-biased combination of two maps.
pub fn map_combine(op: CombineOp, lhs: &Value, rhs: &Value) -> OpResult<Value> {
    let (Some(a), Some(b)) = (lhs.as_map(), rhs.as_map()) else {
        return Err(mismatch(op.into(), &[lhs, rhs]));
    };
    let entries: BTreeMap<Value, Value> = match op {
        CombineOp::Union => {
            let mut entries = b.entries().clone();
            entries.extend(a.entries().iter().map(|(k, v)| (k.clone(), v.clone())));
            entries
        }
        CombineOp::Intersect => a
            .entries()
            .iter()
            .filter(|(k, _)| b.entries().contains_key(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        CombineOp::Difference => a
            .entries()
            .iter()
            .filter(|(k, _)| !b.entries().contains_key(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    };
    Ok(a.with_entries(entries))
}

// ============================= Records =============================

pub fn field_get(record: &Value, index: usize) -> OpResult<Value> {
    record
        .as_record()
        .and_then(|r| r.field(index))
        .cloned()
        .ok_or_else(|| format!("missing field #{} on {}", index, record.sort()))
}

pub fn field_with(record: &Value, index: usize, value: &Value) -> OpResult<Value> {
    let r = record
        .as_record()
        .filter(|r| index < r.fields().len())
        .ok_or_else(|| format!("missing field #{} on {}", index, record.sort()))?;
    Ok(r.with_field(index, value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[i64]) -> Value {
        Value::seq(Sort::BigInt, items.iter().map(|&i| Value::big(i)).collect::<Vec<_>>())
    }

    #[test]
    fn fixed_width_arithmetic_wraps() {
        let a = Value::int(IntSort::U8, 250);
        let b = Value::int(IntSort::U8, 10);
        assert_eq!(arith(ArithOp::Add, &a, &b), Ok(Value::int(IntSort::U8, 4)));
        assert_eq!(arith(ArithOp::Sub, &b, &a), Ok(Value::int(IntSort::U8, 16)));

        let c = Value::int(IntSort::I8, -128);
        let d = Value::int(IntSort::I8, -1);
        assert_eq!(arith(ArithOp::Mul, &c, &d), Ok(Value::int(IntSort::I8, -128)));
    }

    #[test]
    fn big_arithmetic_is_exact() {
        let a = Value::big(i64::MAX);
        let b = Value::big(i64::MAX);
        let expected = BigInt::from(i64::MAX) * BigInt::from(i64::MAX);
        assert_eq!(arith(ArithOp::Mul, &a, &b), Ok(Value::BigInt(expected)));
    }

    #[test]
    fn mixed_sorts_are_rejected() {
        let a = Value::int(IntSort::U8, 1);
        let b = Value::int(IntSort::U16, 1);
        assert!(arith(ArithOp::Add, &a, &b).is_err());
        assert!(bitwise(BitOp::And, &Value::Bool(true), &Value::Bool(false)).is_err());
    }

    #[test]
    fn signed_comparison_uses_interpretation() {
        let minus = Value::int(IntSort::I32, -5);
        let plus = Value::int(IntSort::I32, 3);
        assert_eq!(compare(CmpOp::Lt, &minus, &plus), Ok(true));
        assert_eq!(compare(CmpOp::Geq, &minus, &plus), Ok(false));
    }

    #[test]
    fn casts_wrap_and_extend() {
        let minus = Value::int(IntSort::I8, -1);
        assert_eq!(cast(&minus, &Sort::Int(IntSort::U8)), Ok(Value::int(IntSort::U8, 255)));
        assert_eq!(cast(&minus, &Sort::Int(IntSort::I32)), Ok(Value::int(IntSort::I32, -1)));
        assert_eq!(cast(&minus, &Sort::BigInt), Ok(Value::big(-1)));
        assert_eq!(cast(&Value::big(-1), &Sort::Int(IntSort::U16)), Ok(Value::int(IntSort::U16, 65535)));
        assert_eq!(cast(&Value::big(300), &Sort::Int(IntSort::U8)), Ok(Value::int(IntSort::U8, 44)));

        let real: BigDecimal = "-2.75".parse().unwrap();
        assert_eq!(cast(&Value::Real(real), &Sort::BigInt), Ok(Value::big(-2)));
    }

    #[test]
    fn sequence_operations() {
        let s = seq(&[1, 2, 3, 2]);
        assert_eq!(seq_length(&s), Ok(Value::big(4)));
        assert_eq!(seq_at(&s, &Value::big(1)), Ok(Value::some(Value::big(2))));
        assert_eq!(seq_at(&s, &Value::big(9)), Ok(Value::none(&Sort::BigInt)));
        assert_eq!(seq_at(&s, &Value::big(-1)), Ok(Value::none(&Sort::BigInt)));
        assert_eq!(seq_slice(&s, &Value::big(1), &Value::big(2)), Ok(seq(&[2, 3])));
        assert_eq!(seq_slice(&s, &Value::big(3), &Value::big(10)), Ok(seq(&[2])));
        assert_eq!(seq_slice(&s, &Value::big(7), &Value::big(1)), Ok(seq(&[])));
        assert_eq!(seq_replace(&s, &seq(&[2]), &seq(&[9, 9])), Ok(seq(&[1, 9, 9, 3, 2])));
        assert_eq!(seq_replace(&s, &seq(&[]), &seq(&[0])), Ok(seq(&[0, 1, 2, 3, 2])));
        assert_eq!(seq_index_of(&s, &seq(&[2]), &Value::big(2)), Ok(Value::big(3)));
        assert_eq!(seq_index_of(&s, &seq(&[5]), &Value::big(0)), Ok(Value::big(-1)));
        assert_eq!(seq_containment(Containment::Contains, &s, &seq(&[2, 3])), Ok(true));
        assert_eq!(seq_containment(Containment::StartsWith, &s, &seq(&[1, 2])), Ok(true));
        assert_eq!(seq_containment(Containment::EndsWith, &s, &seq(&[3])), Ok(false));
        assert_eq!(seq_concat(&seq(&[1]), &seq(&[2])), Ok(seq(&[1, 2])));
        assert_eq!(seq_cons(&Value::big(0), &seq(&[1])), Ok(seq(&[0, 1])));
    }

    #[test]
    fn map_combinations_are_left_biased() {
        let mk = |pairs: &[(i64, bool)]| {
            Value::map(
                Sort::BigInt,
                Sort::Bool,
                pairs.iter().map(|&(k, v)| (Value::big(k), Value::Bool(v))).collect(),
            )
        };
        let a = mk(&[(1, true), (2, true)]);
        let b = mk(&[(2, false), (3, false)]);
        assert_eq!(map_combine(CombineOp::Union, &a, &b), Ok(mk(&[(1, true), (2, true), (3, false)])));
        assert_eq!(map_combine(CombineOp::Intersect, &a, &b), Ok(mk(&[(2, true)])));
        assert_eq!(map_combine(CombineOp::Difference, &a, &b), Ok(mk(&[(1, true)])));
        assert_eq!(map_get(&a, &Value::big(2)), Ok(Value::some(Value::Bool(true))));
        assert_eq!(map_get(&a, &Value::big(7)), Ok(Value::none(&Sort::Bool)));
        assert_eq!(map_delete(&a, &Value::big(1)), Ok(mk(&[(2, true)])));
        assert_eq!(map_set(&a, &Value::big(3), &Value::Bool(false)), Ok(mk(&[(1, true), (2, true), (3, false)])));
    }
}
