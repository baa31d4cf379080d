//! Field values and their kinds.
//!
//! Every field read from a record is lifted into a [`FieldValue`], and every
//! Rust type that can appear as a field maps onto a [`ValueKind`] at compile
//! time through [`AuditValue`].

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// The declared kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Text.
    Text,
    /// A single character.
    Char,
    /// Signed or unsigned integer of any width.
    Integer,
    /// Floating point or decimal number.
    Decimal,
    /// Boolean.
    Boolean,
    /// Date and/or time.
    Temporal,
    /// Anything else: collections, maps, nested records.
    Unsupported,
}

impl ValueKind {
    /// Returns whether values of this kind take part in field comparison.
    #[must_use]
    pub const fn is_simple(self) -> bool {
        !matches!(self, Self::Unsupported)
    }

    /// Returns the lowercase name of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Char => "char",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Temporal => "temporal",
            Self::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value read from a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// No value.
    Null,
    /// Text value.
    Text(String),
    /// Character value.
    Char(char),
    /// Signed integer value.
    Int(i128),
    /// Unsigned integer value.
    UInt(u128),
    /// Floating point value.
    Float(f64),
    /// Decimal value in its exact textual form.
    Decimal(String),
    /// Boolean value.
    Bool(bool),
    /// Timezone-aware instant.
    Temporal(DateTime<FixedOffset>),
    /// Ordered sequence.
    List(Vec<FieldValue>),
    /// Unordered collection.
    Set(Vec<FieldValue>),
    /// Key/value pairs.
    Map(Vec<(FieldValue, FieldValue)>),
    /// A value only known through its `Debug` output.
    Opaque(String),
}

impl FieldValue {
    /// Returns `true` for [`FieldValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the kind carried by this value, or `None` for `Null`.
    #[must_use]
    pub const fn kind(&self) -> Option<ValueKind> {
        match self {
            Self::Null => None,
            Self::Text(_) => Some(ValueKind::Text),
            Self::Char(_) => Some(ValueKind::Char),
            Self::Int(_) | Self::UInt(_) => Some(ValueKind::Integer),
            Self::Float(_) | Self::Decimal(_) => Some(ValueKind::Decimal),
            Self::Bool(_) => Some(ValueKind::Boolean),
            Self::Temporal(_) => Some(ValueKind::Temporal),
            Self::List(_) | Self::Set(_) | Self::Map(_) | Self::Opaque(_) => {
                Some(ValueKind::Unsupported)
            }
        }
    }
}

/// Types that can be read as a record field.
///
/// Implementations exist for the standard text, numeric, boolean and
/// character types, for chrono date/time types, for `Option<T>` and for the
/// standard collections. Fixed-point decimal types from other crates can be
/// supported by implementing this trait with [`FieldValue::Decimal`]:
///
/// ```rust
/// use oxide_audit_core::{AuditValue, FieldValue, ValueKind};
///
/// struct Cents(i64);
///
/// impl AuditValue for Cents {
///     const KIND: ValueKind = ValueKind::Decimal;
///
///     fn to_field_value(&self) -> FieldValue {
///         FieldValue::Decimal(format!("{}.{:02}", self.0 / 100, self.0 % 100))
///     }
/// }
///
/// assert_eq!(
///     Cents(1050).to_field_value(),
///     FieldValue::Decimal("10.50".to_string())
/// );
/// ```
pub trait AuditValue {
    /// The kind of every value of this type.
    const KIND: ValueKind;

    /// Converts the value to a `FieldValue`.
    fn to_field_value(&self) -> FieldValue;
}

impl<T: AuditValue + ?Sized> AuditValue for &T {
    const KIND: ValueKind = T::KIND;

    fn to_field_value(&self) -> FieldValue {
        (**self).to_field_value()
    }
}

impl<T: AuditValue + ?Sized> AuditValue for Box<T> {
    const KIND: ValueKind = T::KIND;

    fn to_field_value(&self) -> FieldValue {
        (**self).to_field_value()
    }
}

impl<T: AuditValue> AuditValue for Option<T> {
    const KIND: ValueKind = T::KIND;

    fn to_field_value(&self) -> FieldValue {
        self.as_ref().map_or(FieldValue::Null, AuditValue::to_field_value)
    }
}

impl AuditValue for str {
    const KIND: ValueKind = ValueKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_owned())
    }
}

impl AuditValue for String {
    const KIND: ValueKind = ValueKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl AuditValue for Cow<'_, str> {
    const KIND: ValueKind = ValueKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

impl AuditValue for char {
    const KIND: ValueKind = ValueKind::Char;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Char(*self)
    }
}

impl AuditValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

macro_rules! impl_audit_value_int {
    ($variant:ident, $wide:ty: $($t:ty),+) => {
        $(
            impl AuditValue for $t {
                const KIND: ValueKind = ValueKind::Integer;

                fn to_field_value(&self) -> FieldValue {
                    FieldValue::$variant(<$wide>::from(*self))
                }
            }
        )+
    };
}

impl_audit_value_int!(Int, i128: i8, i16, i32, i64, i128);
impl_audit_value_int!(UInt, u128: u8, u16, u32, u64, u128);

impl AuditValue for isize {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_field_value(&self) -> FieldValue {
        i64::try_from(*self).map_or_else(
            |_| FieldValue::Decimal(self.to_string()),
            |n| FieldValue::Int(i128::from(n)),
        )
    }
}

impl AuditValue for usize {
    const KIND: ValueKind = ValueKind::Integer;

    fn to_field_value(&self) -> FieldValue {
        u64::try_from(*self).map_or_else(
            |_| FieldValue::Decimal(self.to_string()),
            |n| FieldValue::UInt(u128::from(n)),
        )
    }
}

impl AuditValue for f64 {
    const KIND: ValueKind = ValueKind::Decimal;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl AuditValue for f32 {
    const KIND: ValueKind = ValueKind::Decimal;

    fn to_field_value(&self) -> FieldValue {
        // Widening to f64 would print the binary expansion (0.1 -> 0.10000000149011612).
        FieldValue::Decimal(self.to_string())
    }
}

#[cfg(feature = "rust_decimal")]
impl AuditValue for rust_decimal::Decimal {
    const KIND: ValueKind = ValueKind::Decimal;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Decimal(self.to_string())
    }
}

impl<Tz: TimeZone> AuditValue for DateTime<Tz> {
    const KIND: ValueKind = ValueKind::Temporal;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Temporal(self.fixed_offset())
    }
}

/// Naive date-times are read as UTC.
impl AuditValue for NaiveDateTime {
    const KIND: ValueKind = ValueKind::Temporal;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Temporal(self.and_utc().fixed_offset())
    }
}

/// Dates are read as midnight UTC.
impl AuditValue for NaiveDate {
    const KIND: ValueKind = ValueKind::Temporal;

    fn to_field_value(&self) -> FieldValue {
        self.and_hms_opt(0, 0, 0)
            .map_or(FieldValue::Null, |midnight| midnight.to_field_value())
    }
}

impl<T: AuditValue> AuditValue for [T] {
    const KIND: ValueKind = ValueKind::Unsupported;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(AuditValue::to_field_value).collect())
    }
}

impl<T: AuditValue> AuditValue for Vec<T> {
    const KIND: ValueKind = ValueKind::Unsupported;

    fn to_field_value(&self) -> FieldValue {
        self.as_slice().to_field_value()
    }
}

impl<T: AuditValue> AuditValue for VecDeque<T> {
    const KIND: ValueKind = ValueKind::Unsupported;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::List(self.iter().map(AuditValue::to_field_value).collect())
    }
}

impl<T: AuditValue, S> AuditValue for HashSet<T, S> {
    const KIND: ValueKind = ValueKind::Unsupported;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Set(self.iter().map(AuditValue::to_field_value).collect())
    }
}

impl<T: AuditValue> AuditValue for BTreeSet<T> {
    const KIND: ValueKind = ValueKind::Unsupported;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Set(self.iter().map(AuditValue::to_field_value).collect())
    }
}

impl<K: AuditValue, V: AuditValue, S> AuditValue for HashMap<K, V, S> {
    const KIND: ValueKind = ValueKind::Unsupported;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Map(
            self.iter()
                .map(|(k, v)| (k.to_field_value(), v.to_field_value()))
                .collect(),
        )
    }
}

impl<K: AuditValue, V: AuditValue> AuditValue for BTreeMap<K, V> {
    const KIND: ValueKind = ValueKind::Unsupported;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Map(
            self.iter()
                .map(|(k, v)| (k.to_field_value(), v.to_field_value()))
                .collect(),
        )
    }
}
