//! Canonical string forms of field values.
//!
//! The canonical form is used both for display and for equality during
//! update diffs, so it must be deterministic: the same value always yields
//! the same string.

use std::fmt;

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::value::FieldValue;

/// `strftime` pattern of [`TemporalFormat::Display`].
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `strftime` pattern of [`TemporalFormat::W3c`].
pub const W3C_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// How temporal values are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalFormat {
    /// `YYYY-MM-DD HH:MM:SS`.
    #[default]
    Display,
    /// `YYYY-MM-DDTHH:MM:SS±HH:MM`.
    W3c,
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS±HH:MM` in its own offset.
pub fn format_w3c<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.format(W3C_FORMAT).to_string()
}

/// Converts field values to their canonical strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValueNormalizer {
    format: TemporalFormat,
    offset: FixedOffset,
}

impl Default for ValueNormalizer {
    fn default() -> Self {
        Self::new(TemporalFormat::Display, Utc.fix())
    }
}

impl ValueNormalizer {
    /// Creates a normalizer rendering instants in `offset`.
    #[must_use]
    pub const fn new(format: TemporalFormat, offset: FixedOffset) -> Self {
        Self { format, offset }
    }

    /// Returns the temporal format.
    #[must_use]
    pub const fn format(&self) -> TemporalFormat {
        self.format
    }

    /// Returns the offset instants are rendered in.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns the canonical string of `value`; `Null` is the empty string.
    #[must_use]
    pub fn normalize(&self, value: &FieldValue) -> String {
        let mut out = String::new();
        self.write_value(&mut out, value);
        out
    }

    /// Renders an instant in the configured offset and format.
    #[must_use]
    pub fn format_temporal(&self, instant: &DateTime<FixedOffset>) -> String {
        let local = instant.with_timezone(&self.offset);
        match self.format {
            TemporalFormat::Display => local.format(DISPLAY_FORMAT).to_string(),
            TemporalFormat::W3c => format_w3c(&local),
        }
    }

    fn write_value(&self, out: &mut String, value: &FieldValue) {
        match value {
            FieldValue::Null => {}
            FieldValue::Text(s) | FieldValue::Decimal(s) | FieldValue::Opaque(s) => {
                out.push_str(s);
            }
            FieldValue::Char(c) => out.push(*c),
            FieldValue::Int(n) => out.push_str(&n.to_string()),
            FieldValue::UInt(n) => out.push_str(&n.to_string()),
            FieldValue::Float(f) => out.push_str(&f.to_string()),
            FieldValue::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            FieldValue::Temporal(instant) => out.push_str(&self.format_temporal(instant)),
            FieldValue::List(items) => {
                let items: Vec<String> = items.iter().map(|v| self.normalize(v)).collect();
                write_joined(out, '[', &items, ']');
            }
            FieldValue::Set(items) => {
                let mut items: Vec<String> = items.iter().map(|v| self.normalize(v)).collect();
                items.sort();
                write_joined(out, '[', &items, ']');
            }
            FieldValue::Map(entries) => {
                let mut entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", self.normalize(k), self.normalize(v)))
                    .collect();
                entries.sort();
                write_joined(out, '{', &entries, '}');
            }
        }
    }
}

fn write_joined(out: &mut String, open: char, items: &[String], close: char) {
    out.push(open);
    out.push_str(&items.join(", "));
    out.push(close);
}

/// Serde helpers writing chrono instants in the W3C form.
///
/// Used with `#[serde(with = "oxide_audit_core::w3c")]` so delete snapshots
/// carry the same textual dates as W3C-formatted change records.
pub mod w3c {
    use std::fmt;

    use chrono::{DateTime, FixedOffset, TimeZone};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serializes an instant as `YYYY-MM-DDTHH:MM:SS±HH:MM`.
    ///
    /// # Errors
    ///
    /// Returns the serializer's error.
    pub fn serialize<S, Tz>(instant: &DateTime<Tz>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        serializer.serialize_str(&super::format_w3c(instant))
    }

    /// Deserializes an instant written by [`serialize`].
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not an RFC 3339 timestamp.
    pub fn deserialize<'de, D, Tz>(deserializer: D) -> Result<DateTime<Tz>, D::Error>
    where
        D: Deserializer<'de>,
        Tz: TimeZone,
        DateTime<Tz>: From<DateTime<FixedOffset>>,
    {
        let text = String::deserialize(deserializer)?;
        DateTime::<FixedOffset>::parse_from_rfc3339(&text)
            .map(DateTime::from)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use chrono::TimeZone;

    use super::*;
    use crate::value::AuditValue;

    fn instant() -> DateTime<FixedOffset> {
        Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap().fixed_offset()
    }

    #[test]
    fn test_null_is_empty() {
        assert_eq!(ValueNormalizer::default().normalize(&FieldValue::Null), "");
    }

    #[test]
    fn test_display_format() {
        let normalizer = ValueNormalizer::default();
        assert_eq!(
            normalizer.normalize(&FieldValue::Temporal(instant())),
            "2024-01-05 10:00:00"
        );
    }

    #[test]
    fn test_w3c_format() {
        let normalizer = ValueNormalizer::new(TemporalFormat::W3c, Utc.fix());
        assert_eq!(
            normalizer.normalize(&FieldValue::Temporal(instant())),
            "2024-01-05T10:00:00+00:00"
        );
    }

    #[test]
    fn test_offset_applied() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        let display = ValueNormalizer::new(TemporalFormat::Display, tokyo);
        assert_eq!(
            display.normalize(&FieldValue::Temporal(instant())),
            "2024-01-05 19:00:00"
        );

        let w3c = ValueNormalizer::new(TemporalFormat::W3c, tokyo);
        assert_eq!(
            w3c.normalize(&FieldValue::Temporal(instant())),
            "2024-01-05T19:00:00+09:00"
        );
    }

    #[test]
    fn test_same_instant_in_different_offsets_is_equal() {
        let normalizer = ValueNormalizer::default();
        let shifted = instant().with_timezone(&FixedOffset::west_opt(5 * 3600).unwrap());
        assert_eq!(
            normalizer.normalize(&FieldValue::Temporal(instant())),
            normalizer.normalize(&FieldValue::Temporal(shifted))
        );
    }

    #[test]
    fn test_natural_scalar_forms() {
        let normalizer = ValueNormalizer::default();
        assert_eq!(normalizer.normalize(&1_234_567_i64.to_field_value()), "1234567");
        assert_eq!(normalizer.normalize(&(-3_i8).to_field_value()), "-3");
        assert_eq!(normalizer.normalize(&2.5_f64.to_field_value()), "2.5");
        assert_eq!(normalizer.normalize(&true.to_field_value()), "true");
        assert_eq!(normalizer.normalize(&'x'.to_field_value()), "x");
        assert_eq!(normalizer.normalize(&"Alice".to_field_value()), "Alice");
        assert_eq!(
            normalizer.normalize(&FieldValue::Decimal("10.50".into())),
            "10.50"
        );
    }

    #[test]
    fn test_collections() {
        let normalizer = ValueNormalizer::default();
        assert_eq!(normalizer.normalize(&vec![1, 2, 3].to_field_value()), "[1, 2, 3]");

        let set: HashSet<&str> = ["b", "a", "c"].into_iter().collect();
        assert_eq!(normalizer.normalize(&set.to_field_value()), "[a, b, c]");

        let mut map = BTreeMap::new();
        map.insert("k2", 2);
        map.insert("k1", 1);
        assert_eq!(normalizer.normalize(&map.to_field_value()), "{k1: 1, k2: 2}");
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let normalizer = ValueNormalizer::new(TemporalFormat::W3c, Utc.fix());
        let value = FieldValue::Temporal(instant());
        assert_eq!(normalizer.normalize(&value), normalizer.normalize(&value));
    }

    #[test]
    fn test_w3c_serde_helper() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Stamp {
            #[serde(with = "super::w3c")]
            at: DateTime<Utc>,
        }

        let stamp = Stamp {
            at: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
        };
        let json = serde_json::to_string(&stamp).unwrap();
        assert_eq!(json, r#"{"at":"2024-01-05T10:00:00+00:00"}"#);
        let back: Stamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stamp);
    }
}
