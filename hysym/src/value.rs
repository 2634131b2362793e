//! Concrete values produced by evaluation and carried by constant nodes.
//!
//! Values are immutable, totally ordered and hashable so they can key maps and take part in
//! interning keys. Compound payloads live behind `Arc`, cloning is O(1).
use std::{collections::BTreeMap, sync::Arc};

use bigdecimal::{BigDecimal, Zero};
use num_bigint::BigInt;
use strum::EnumIs;

use crate::{
    error::{SymError, SymResult},
    sort::{IntSort, RecordSort, Sort},
};

/// Fixed-width integer value, stored as raw bits masked to its sort's width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntValue {
    sort: IntSort,
    raw: u64,
}

impl IntValue {
    /// Create a value from a mathematical integer, wrapping it into the sort's range.
    pub fn new(sort: IntSort, value: i128) -> Self {
        Self {
            sort,
            raw: sort.wrap(value),
        }
    }

    pub fn from_raw(sort: IntSort, raw: u64) -> Self {
        Self {
            sort,
            raw: raw & sort.mask(),
        }
    }

    #[inline]
    pub fn sort(&self) -> IntSort {
        self.sort
    }

    #[inline]
    pub fn raw(&self) -> u64 {
        self.raw
    }

    /// Mathematical value (sign extended for signed sorts).
    #[inline]
    pub fn value(&self) -> i128 {
        self.sort.interpret(self.raw)
    }
}

impl PartialOrd for IntValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IntValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort
            .cmp(&other.sort)
            .then_with(|| self.value().cmp(&other.value()))
    }
}

impl std::fmt::Display for IntValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value(), self.sort)
    }
}

/// Sequence value; the element sort is kept so empty sequences stay typed.
///
/// A sequence is a window `items[start..]` over shared storage, so taking the tail is O(1)
/// and walking a whole sequence never copies it. Comparison and hashing only see the window.
#[derive(Debug, Clone)]
pub struct SeqValue {
    elem: Sort,
    items: Arc<[Value]>,
    start: usize,
}

impl SeqValue {
    pub fn elem_sort(&self) -> &Sort {
        &self.elem
    }

    pub fn items(&self) -> &[Value] {
        &self.items[self.start..]
    }

    pub fn len(&self) -> usize {
        self.items.len() - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split into head and tail, `None` for the empty sequence. The tail shares storage.
    pub fn split_first(&self) -> Option<(Value, Value)> {
        let head = self.items.get(self.start)?.clone();
        let tail = SeqValue {
            elem: self.elem.clone(),
            items: self.items.clone(),
            start: self.start + 1,
        };
        Some((head, Value::Seq(tail)))
    }
}

impl PartialEq for SeqValue {
    fn eq(&self, other: &Self) -> bool {
        self.elem == other.elem && self.items() == other.items()
    }
}

impl Eq for SeqValue {}

impl PartialOrd for SeqValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SeqValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.elem
            .cmp(&other.elem)
            .then_with(|| self.items().cmp(other.items()))
    }
}

impl std::hash::Hash for SeqValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.elem.hash(state);
        self.items().hash(state);
    }
}

/// Finite map value with ordered keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapValue {
    key: Sort,
    value: Sort,
    entries: Arc<BTreeMap<Value, Value>>,
}

impl MapValue {
    pub fn key_sort(&self) -> &Sort {
        &self.key
    }

    pub fn value_sort(&self) -> &Sort {
        &self.value
    }

    pub fn entries(&self) -> &BTreeMap<Value, Value> {
        &self.entries
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Rebuild a map of the same sort from new entries.
    pub fn with_entries(&self, entries: BTreeMap<Value, Value>) -> Value {
        Value::Map(MapValue {
            key: self.key.clone(),
            value: self.value.clone(),
            entries: Arc::new(entries),
        })
    }
}

/// Record value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordValue {
    sort: Arc<RecordSort>,
    fields: Arc<[Value]>,
}

impl RecordValue {
    pub fn record_sort(&self) -> &Arc<RecordSort> {
        &self.sort
    }

    pub fn fields(&self) -> &[Value] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&Value> {
        self.fields.get(index)
    }

    /// Copy of this record where field `index` is replaced by `value`.
    pub fn with_field(&self, index: usize, value: Value) -> Value {
        let mut fields = self.fields.to_vec();
        if let Some(slot) = fields.get_mut(index) {
            *slot = value;
        }
        Value::Record(RecordValue {
            sort: self.sort.clone(),
            fields: fields.into(),
        })
    }
}

/// A concrete value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs)]
pub enum Value {
    Bool(bool),
    Int(IntValue),
    BigInt(BigInt),
    Real(BigDecimal),
    Seq(SeqValue),
    Map(MapValue),
    Record(RecordValue),
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<IntValue> for Value {
    fn from(value: IntValue) -> Self {
        Value::Int(value)
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Value::BigInt(value)
    }
}

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Value::Real(value)
    }
}

impl Value {
    /// Fixed-width integer, wrapped into the sort's range.
    pub fn int(sort: IntSort, value: i128) -> Self {
        Value::Int(IntValue::new(sort, value))
    }

    /// Arbitrary precision integer.
    pub fn big(value: impl Into<BigInt>) -> Self {
        Value::BigInt(value.into())
    }

    pub fn seq(elem: Sort, items: impl Into<Arc<[Value]>>) -> Self {
        Value::Seq(SeqValue {
            elem,
            items: items.into(),
            start: 0,
        })
    }

    pub fn empty_seq(elem: Sort) -> Self {
        Value::seq(elem, Vec::new())
    }

    pub fn map(key: Sort, value: Sort, entries: BTreeMap<Value, Value>) -> Self {
        Value::Map(MapValue {
            key,
            value,
            entries: Arc::new(entries),
        })
    }

    pub fn empty_map(key: Sort, value: Sort) -> Self {
        Value::map(key, value, BTreeMap::new())
    }

    /// Build a record, checking the number and sorts of the fields.
    pub fn record(sort: Arc<RecordSort>, fields: Vec<Value>) -> SymResult<Self> {
        if fields.len() != sort.len() {
            return Err(SymError::ArityMismatch {
                op: "record",
                expected: sort.len(),
                found: fields.len(),
            });
        }
        for ((_, field_sort), value) in sort.fields().iter().zip(fields.iter()) {
            value.sort().expect("record", field_sort)?;
        }
        Ok(Self::record_unchecked(sort, fields))
    }

    pub(crate) fn record_unchecked(sort: Arc<RecordSort>, fields: Vec<Value>) -> Self {
        Value::Record(RecordValue {
            sort,
            fields: fields.into(),
        })
    }

    /// `Option::some(value)`.
    pub fn some(value: Value) -> Self {
        let record = RecordSort::option(value.sort());
        Self::record_unchecked(record, vec![Value::Bool(true), value])
    }

    /// `Option::none()` for the given inner sort.
    pub fn none(inner: &Sort) -> Self {
        let record = RecordSort::option(inner.clone());
        Self::record_unchecked(record, vec![Value::Bool(false), inner.default_value()])
    }

    /// Build an option from a Rust option.
    pub fn option(inner: &Sort, value: Option<Value>) -> Self {
        match value {
            Some(value) => Value::some(value),
            None => Value::none(inner),
        }
    }

    /// Sort of this value.
    pub fn sort(&self) -> Sort {
        match self {
            Value::Bool(_) => Sort::Bool,
            Value::Int(int) => Sort::Int(int.sort()),
            Value::BigInt(_) => Sort::BigInt,
            Value::Real(_) => Sort::Real,
            Value::Seq(seq) => Sort::seq(seq.elem.clone()),
            Value::Map(map) => Sort::map(map.key.clone(), map.value.clone()),
            Value::Record(record) => Sort::Record(record.sort.clone()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_big_int(&self) -> Option<&BigInt> {
        match self {
            Value::BigInt(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&SeqValue> {
        match self {
            Value::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapValue> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Content of an option value, `None` if this is not an option or has no value.
    pub fn as_option(&self) -> Option<Option<&Value>> {
        let record = self.as_record()?;
        if !record.record_sort().is_option() {
            return None;
        }
        match record.field(RecordSort::OPTION_HAS_VALUE)? {
            Value::Bool(true) => Some(record.field(RecordSort::OPTION_VALUE)),
            _ => Some(None),
        }
    }

    /// Returns `true` if this is the additive identity of a numeric sort.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Int(int) => int.raw() == 0,
            Value::BigInt(value) => value.is_zero(),
            Value::Real(value) => value.is_zero(),
            _ => false,
        }
    }

    /// Returns `true` if this is the multiplicative identity of a numeric sort.
    pub fn is_one(&self) -> bool {
        match self {
            Value::Int(int) => int.value() == 1,
            Value::BigInt(value) => *value == BigInt::from(1),
            Value::Real(value) => *value == BigDecimal::from(1),
            _ => false,
        }
    }

    /// Returns `true` for an empty sequence or an empty map.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            Value::Seq(seq) => seq.is_empty(),
            Value::Map(map) => map.entries.is_empty(),
            _ => false,
        }
    }
}

impl Sort {
    /// Default value of a sort: `false`, zero, empty collections, records of defaults.
    pub fn default_value(&self) -> Value {
        match self {
            Sort::Bool => Value::Bool(false),
            Sort::Int(int) => Value::Int(IntValue::from_raw(*int, 0)),
            Sort::BigInt => Value::BigInt(BigInt::zero()),
            Sort::Real => Value::Real(BigDecimal::zero()),
            Sort::Seq(elem) => Value::empty_seq((**elem).clone()),
            Sort::Map(key, value) => Value::empty_map((**key).clone(), (**value).clone()),
            Sort::Record(record) => Value::record_unchecked(
                record.clone(),
                record
                    .fields()
                    .iter()
                    .map(|(_, sort)| sort.default_value())
                    .collect(),
            ),
        }
    }

    /// Multiplicative identity of a numeric sort.
    pub(crate) fn one_value(&self) -> Option<Value> {
        match self {
            Sort::Int(int) => Some(Value::int(*int, 1)),
            Sort::BigInt => Some(Value::big(1)),
            Sort::Real => Some(Value::Real(BigDecimal::from(1))),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(int) => int.fmt(f),
            Value::BigInt(value) => write!(f, "{}", value),
            Value::Real(value) => write!(f, "{}", value.normalized()),
            Value::Seq(seq) => {
                write!(f, "[")?;
                for (i, item) in seq.items().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt(f)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Record(record) => match self.as_option() {
                Some(Some(inner)) => write!(f, "some({})", inner),
                Some(None) => write!(f, "none"),
                None => {
                    write!(f, "{} {{", record.sort.name())?;
                    for (i, ((field, _), value)) in record
                        .sort
                        .fields()
                        .iter()
                        .zip(record.fields.iter())
                        .enumerate()
                    {
                        if i > 0 {
                            write!(f, ",")?;
                        }
                        write!(f, " {}: {}", field, value)?;
                    }
                    write!(f, " }}")
                }
            },
        }
    }
}
