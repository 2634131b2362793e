use std::collections::BTreeMap;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;

use crate::{
    error::{SymError, SymResult},
    sort::{IntSort, Sort},
    value::Value,
};

/// Rust type with a fixed sort, convertible to and from [`Value`].
///
/// Implemented for the primitive numeric types, `bool`, [`BigInt`], [`BigDecimal`],
/// `Vec<T>`, `BTreeMap<K, V>` and `Option<T>`. User records implement it by hand on top of
/// [`Value::record`] and [`RecordValue`](crate::value::RecordValue).
pub trait SymValue: Sized {
    fn sort() -> Sort;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> SymResult<Self>;
}

fn mismatch<T: SymValue>(value: &Value) -> SymError {
    SymError::ValueSortMismatch {
        expected: T::sort(),
        found: value.sort(),
    }
}

impl SymValue for bool {
    fn sort() -> Sort {
        Sort::Bool
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }

    fn from_value(value: &Value) -> SymResult<Self> {
        value.as_bool().ok_or_else(|| mismatch::<Self>(value))
    }
}

macro_rules! int_sym_value {
    ($($ty:ty => $sort:ident),* $(,)?) => {
        $(
            impl SymValue for $ty {
                fn sort() -> Sort {
                    Sort::Int(IntSort::$sort)
                }

                fn into_value(self) -> Value {
                    Value::int(IntSort::$sort, self as i128)
                }

                fn from_value(value: &Value) -> SymResult<Self> {
                    match value {
                        Value::Int(int) if int.sort() == IntSort::$sort => {
                            <$ty>::try_from(int.value()).map_err(|_| mismatch::<Self>(value))
                        }
                        _ => Err(mismatch::<Self>(value)),
                    }
                }
            }
        )*
    };
}

int_sym_value! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
}

impl SymValue for BigInt {
    fn sort() -> Sort {
        Sort::BigInt
    }

    fn into_value(self) -> Value {
        Value::BigInt(self)
    }

    fn from_value(value: &Value) -> SymResult<Self> {
        value.as_big_int().cloned().ok_or_else(|| mismatch::<Self>(value))
    }
}

impl SymValue for BigDecimal {
    fn sort() -> Sort {
        Sort::Real
    }

    fn into_value(self) -> Value {
        Value::Real(self)
    }

    fn from_value(value: &Value) -> SymResult<Self> {
        match value {
            Value::Real(real) => Ok(real.clone()),
            _ => Err(mismatch::<Self>(value)),
        }
    }
}

impl<T: SymValue> SymValue for Vec<T> {
    fn sort() -> Sort {
        Sort::seq(T::sort())
    }

    fn into_value(self) -> Value {
        let items: Vec<Value> = self.into_iter().map(T::into_value).collect();
        Value::seq(T::sort(), items)
    }

    fn from_value(value: &Value) -> SymResult<Self> {
        let seq = value.as_seq().ok_or_else(|| mismatch::<Self>(value))?;
        if seq.elem_sort() != &T::sort() {
            return Err(mismatch::<Self>(value));
        }
        seq.items().iter().map(T::from_value).collect()
    }
}

impl<K: SymValue + Ord, V: SymValue> SymValue for BTreeMap<K, V> {
    fn sort() -> Sort {
        Sort::map(K::sort(), V::sort())
    }

    fn into_value(self) -> Value {
        let entries = self
            .into_iter()
            .map(|(key, value)| (key.into_value(), value.into_value()))
            .collect();
        Value::map(K::sort(), V::sort(), entries)
    }

    fn from_value(value: &Value) -> SymResult<Self> {
        let map = value.as_map().ok_or_else(|| mismatch::<Self>(value))?;
        if map.key_sort() != &K::sort() || map.value_sort() != &V::sort() {
            return Err(mismatch::<Self>(value));
        }
        map.entries()
            .iter()
            .map(|(key, value)| Ok((K::from_value(key)?, V::from_value(value)?)))
            .collect()
    }
}

impl<T: SymValue> SymValue for Option<T> {
    fn sort() -> Sort {
        Sort::option(T::sort())
    }

    fn into_value(self) -> Value {
        Value::option(&T::sort(), self.map(T::into_value))
    }

    fn from_value(value: &Value) -> SymResult<Self> {
        if value.sort() != Self::sort() {
            return Err(mismatch::<Self>(value));
        }
        match value.as_option() {
            Some(Some(inner)) => T::from_value(inner).map(Some),
            Some(None) => Ok(None),
            None => Err(mismatch::<Self>(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_check_width_and_signedness() {
        let v = (-3i16).into_value();
        assert_eq!(i16::from_value(&v).unwrap(), -3);
        assert!(u16::from_value(&v).is_err());
        assert!(i32::from_value(&v).is_err());
        assert_eq!(u64::from_value(&u64::MAX.into_value()).unwrap(), u64::MAX);
    }

    #[test]
    fn nested_containers_convert_back() {
        let mut map = BTreeMap::new();
        map.insert(1u8, vec![Some(true), None]);
        map.insert(2u8, vec![]);
        let value = map.clone().into_value();
        assert_eq!(value.sort(), <BTreeMap<u8, Vec<Option<bool>>>>::sort());
        assert_eq!(BTreeMap::<u8, Vec<Option<bool>>>::from_value(&value).unwrap(), map);
    }

    #[test]
    fn empty_sequence_keeps_its_sort() {
        let value = Vec::<u32>::new().into_value();
        assert!(Vec::<u32>::from_value(&value).is_ok());
        assert!(Vec::<i32>::from_value(&value).is_err());
    }
}
