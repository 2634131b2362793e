//! Runtime sorts (types) of expressions and values.
//!
//! Role
//! - Every expression node carries the [`Sort`] of the value it produces; constructors check
//!   operand sorts and report mismatches instead of coercing.
//! - Integer sorts are fixed-width two's-complement words ([`IntSort`]); arithmetic on them
//!   wraps modulo `2^bits`. Arbitrary precision integers and exact decimals have their own sorts.
//! - `Option<T>` is not a primitive sort: it is the built-in record
//!   `Option { has_value: Bool, value: T }` (see [`Sort::option`]).
//!
//! Compound sorts keep their payload behind an `Arc` so cloning a sort is cheap.
use std::sync::Arc;

use strum::EnumIs;

use crate::error::{SymError, SymResult};

/// Fixed-width integer sort.
///
/// Values are stored as raw bits masked to `bits`; signedness only changes how
/// those bits are ordered, printed and extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IntSort {
    bits: u8,
    signed: bool,
}

impl IntSort {
    pub const I8: Self = Self::unchecked(8, true);
    pub const I16: Self = Self::unchecked(16, true);
    pub const I32: Self = Self::unchecked(32, true);
    pub const I64: Self = Self::unchecked(64, true);
    pub const U8: Self = Self::unchecked(8, false);
    pub const U16: Self = Self::unchecked(16, false);
    pub const U32: Self = Self::unchecked(32, false);
    pub const U64: Self = Self::unchecked(64, false);
    pub const MAX_BITS: u32 = 64;

    const fn unchecked(bits: u8, signed: bool) -> Self {
        Self { bits, signed }
    }

    /// Creates an integer sort with the given width, between 1 and 64 bits.
    pub fn new(bits: u32, signed: bool) -> SymResult<Self> {
        if bits == 0 || bits > Self::MAX_BITS {
            return Err(SymError::InvalidIntWidth(bits));
        }
        Ok(Self::unchecked(bits as u8, signed))
    }

    #[inline]
    pub const fn bits(&self) -> u32 {
        self.bits as u32
    }

    #[inline]
    pub const fn is_signed(&self) -> bool {
        self.signed
    }

    /// Mask selecting the `bits` low bits of a word.
    #[inline]
    pub const fn mask(&self) -> u64 {
        if self.bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.bits) - 1
        }
    }

    /// Smallest representable value.
    pub const fn min_value(&self) -> i128 {
        if self.signed {
            -(1i128 << (self.bits - 1))
        } else {
            0
        }
    }

    /// Largest representable value.
    pub const fn max_value(&self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            self.mask() as i128
        }
    }

    /// Reduce an arbitrary integer modulo `2^bits` into raw bits.
    #[inline]
    pub const fn wrap(&self, value: i128) -> u64 {
        (value as u64) & self.mask()
    }

    /// Interpret raw bits as a mathematical integer (sign extending for signed sorts).
    #[inline]
    pub const fn interpret(&self, raw: u64) -> i128 {
        let raw = raw & self.mask();
        if self.signed {
            let shift = 128 - self.bits as u32;
            ((raw as i128) << shift) >> shift
        } else {
            raw as i128
        }
    }
}

impl std::fmt::Display for IntSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = if self.signed { 'i' } else { 'u' };
        write!(f, "{}{}", prefix, self.bits)
    }
}

/// A named record with ordered, named fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordSort {
    name: Arc<str>,
    fields: Vec<(Arc<str>, Sort)>,
}

impl RecordSort {
    pub const OPTION_NAME: &'static str = "Option";
    pub const OPTION_HAS_VALUE: usize = 0;
    pub const OPTION_VALUE: usize = 1;

    pub fn new<N, F, S>(name: N, fields: impl IntoIterator<Item = (F, S)>) -> Self
    where
        N: Into<Arc<str>>,
        F: Into<Arc<str>>,
        S: Into<Sort>,
    {
        Self {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(field, sort)| (field.into(), sort.into()))
                .collect(),
        }
    }

    /// The built-in `Option { has_value: Bool, value: inner }` record.
    pub fn option(inner: Sort) -> Arc<RecordSort> {
        Arc::new(RecordSort::new(
            Self::OPTION_NAME,
            [("has_value", Sort::Bool), ("value", inner)],
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[(Arc<str>, Sort)] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sort of the field at `index`, if any.
    pub fn field_sort(&self, index: usize) -> Option<&Sort> {
        self.fields.get(index).map(|(_, sort)| sort)
    }

    /// Position of the field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(field, _)| &**field == name)
    }

    /// Returns `true` if this is the built-in option record.
    pub fn is_option(&self) -> bool {
        &*self.name == Self::OPTION_NAME
            && self.fields.len() == 2
            && &*self.fields[Self::OPTION_HAS_VALUE].0 == "has_value"
            && self.fields[Self::OPTION_HAS_VALUE].1 == Sort::Bool
            && &*self.fields[Self::OPTION_VALUE].0 == "value"
    }

    pub(crate) fn check_field(&self, index: usize) -> SymResult<&Sort> {
        self.field_sort(index).ok_or_else(|| SymError::FieldOutOfRange {
            record: self.name.to_string(),
            index,
            len: self.fields.len(),
        })
    }
}

impl std::fmt::Display for RecordSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, (field, sort)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, " {}: {}", field, sort)?;
        }
        write!(f, " }}")
    }
}

/// Sort of an expression or value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIs)]
pub enum Sort {
    Bool,
    /// Fixed-width integer with modular arithmetic.
    Int(IntSort),
    /// Arbitrary precision integer.
    BigInt,
    /// Exact decimal number; addition, subtraction and multiplication never round.
    Real,
    /// Finite sequence of elements of the inner sort.
    Seq(Arc<Sort>),
    /// Finite map from keys to values.
    Map(Arc<Sort>, Arc<Sort>),
    Record(Arc<RecordSort>),
}

impl From<IntSort> for Sort {
    fn from(value: IntSort) -> Self {
        Sort::Int(value)
    }
}

impl From<RecordSort> for Sort {
    fn from(value: RecordSort) -> Self {
        Sort::Record(Arc::new(value))
    }
}

impl Sort {
    pub fn seq(elem: Sort) -> Self {
        Sort::Seq(Arc::new(elem))
    }

    pub fn map(key: Sort, value: Sort) -> Self {
        Sort::Map(Arc::new(key), Arc::new(value))
    }

    /// The built-in `Option { has_value: Bool, value: inner }` record.
    pub fn option(inner: Sort) -> Self {
        Sort::Record(RecordSort::option(inner))
    }

    /// Sorts supporting `+`, `-`, `*` and ordered comparisons.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Sort::Int(_) | Sort::BigInt | Sort::Real)
    }

    /// Sorts supporting bitwise operations.
    pub fn is_bitwise(&self) -> bool {
        matches!(self, Sort::Int(_) | Sort::BigInt)
    }

    pub fn seq_elem(&self) -> Option<&Sort> {
        match self {
            Sort::Seq(elem) => Some(elem),
            _ => None,
        }
    }

    pub fn map_parts(&self) -> Option<(&Sort, &Sort)> {
        match self {
            Sort::Map(key, value) => Some((key, value)),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Arc<RecordSort>> {
        match self {
            Sort::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Inner sort of an option record.
    pub fn option_inner(&self) -> Option<&Sort> {
        self.as_record()
            .filter(|record| record.is_option())
            .and_then(|record| record.field_sort(RecordSort::OPTION_VALUE))
    }

    /// Check that `self` equals `expected`, reporting `op` otherwise.
    pub(crate) fn expect(&self, op: &'static str, expected: &Sort) -> SymResult<()> {
        if self == expected {
            Ok(())
        } else {
            Err(SymError::SortMismatch {
                op,
                expected: expected.clone(),
                found: self.clone(),
            })
        }
    }

    pub(crate) fn unsupported(&self, op: &'static str) -> SymError {
        SymError::UnsupportedSort {
            op,
            sort: self.clone(),
        }
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sort::Bool => write!(f, "bool"),
            Sort::Int(int) => int.fmt(f),
            Sort::BigInt => write!(f, "int"),
            Sort::Real => write!(f, "real"),
            Sort::Seq(elem) => write!(f, "seq<{}>", elem),
            Sort::Map(key, value) => write!(f, "map<{}, {}>", key, value),
            Sort::Record(record) => {
                if let Some(inner) = self.option_inner() {
                    write!(f, "option<{}>", inner)
                } else {
                    write!(f, "{}", record.name())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_sort_wraps_and_interprets() {
        let i8 = IntSort::I8;
        assert_eq!(i8.wrap(-1), 0xff);
        assert_eq!(i8.interpret(0xff), -1);
        assert_eq!(i8.interpret(0x7f), 127);
        assert_eq!(IntSort::U8.interpret(0xff), 255);
        assert_eq!(IntSort::U64.interpret(u64::MAX), u64::MAX as i128);
        assert_eq!(IntSort::I64.interpret(u64::MAX), -1);
        assert_eq!(IntSort::I32.min_value(), i32::MIN as i128);
        assert_eq!(IntSort::U16.max_value(), u16::MAX as i128);
    }

    #[test]
    fn int_sort_rejects_bad_widths() {
        assert!(IntSort::new(0, true).is_err());
        assert!(IntSort::new(65, false).is_err());
        assert_eq!(IntSort::new(3, false).unwrap().mask(), 0b111);
    }

    #[test]
    fn option_sort_is_recognised() {
        let opt = Sort::option(Sort::BigInt);
        assert_eq!(opt.option_inner(), Some(&Sort::BigInt));
        assert_eq!(opt.to_string(), "option<int>");
        let other = Sort::from(RecordSort::new("Point", [("x", Sort::BigInt)]));
        assert_eq!(other.option_inner(), None);
    }
}
