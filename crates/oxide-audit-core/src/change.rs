//! Change records and change sets.

use std::fmt;
use std::slice;
use std::vec;

use serde::{Deserialize, Serialize};

/// The operation a change set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// A record was created.
    Insert,
    /// A record was removed.
    Delete,
    /// A record was modified.
    Update,
}

impl Operation {
    /// Returns the lowercase name of the operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Delete => "delete",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level change.
///
/// Delete change sets hold a single record with an empty `field` and
/// `display_name`, whose `old_value` is a JSON snapshot of the whole record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Field identifier.
    pub field: String,
    /// Human-readable label, the field identifier when none is registered.
    pub display_name: String,
    /// Canonical value before the change.
    pub old_value: String,
    /// Canonical value after the change.
    pub new_value: String,
}

impl ChangeRecord {
    /// Creates a field-level change record.
    pub fn new(
        field: impl Into<String>,
        display_name: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            display_name: display_name.into(),
            old_value: old_value.into(),
            new_value: new_value.into(),
        }
    }

    /// Creates the whole-record entry of a delete change set.
    pub fn snapshot(old_value: impl Into<String>) -> Self {
        Self {
            old_value: old_value.into(),
            ..Self::default()
        }
    }

    /// Returns whether this record describes a whole record rather than a field.
    #[must_use]
    pub fn is_snapshot(&self) -> bool {
        self.field.is_empty()
    }
}

/// The ordered output of one diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    operation: Operation,
    type_name: String,
    records: Vec<ChangeRecord>,
}

impl ChangeSet {
    pub(crate) fn new(operation: Operation, type_name: impl Into<String>) -> Self {
        Self {
            operation,
            type_name: type_name.into(),
            records: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: ChangeRecord) {
        self.records.push(record);
    }

    /// Returns the operation this change set describes.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Returns the name of the diffed record type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the records in emission order.
    #[must_use]
    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates over the records.
    pub fn iter(&self) -> slice::Iter<'_, ChangeRecord> {
        self.records.iter()
    }

    /// Returns the record for `field`, if it changed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&ChangeRecord> {
        self.records.iter().find(|r| r.field == field)
    }

    /// Returns the changed field identifiers in order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.field.as_str())
    }

    /// Consumes the change set, returning its records.
    #[must_use]
    pub fn into_records(self) -> Vec<ChangeRecord> {
        self.records
    }
}

impl IntoIterator for ChangeSet {
    type Item = ChangeRecord;
    type IntoIter = vec::IntoIter<ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeRecord;
    type IntoIter = slice::Iter<'a, ChangeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChangeSet {
        let mut changes = ChangeSet::new(Operation::Update, "User");
        changes.push(ChangeRecord::new("age", "Age", "30", "31"));
        changes.push(ChangeRecord::new("name", "name", "Alice", "Alicia"));
        changes
    }

    #[test]
    fn test_lookup_and_order() {
        let changes = sample();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes.fields().collect::<Vec<_>>(), vec!["age", "name"]);
        assert_eq!(changes.get("age").map(|r| r.new_value.as_str()), Some("31"));
        assert!(changes.get("email").is_none());
    }

    #[test]
    fn test_snapshot_record() {
        let record = ChangeRecord::snapshot("{\"id\":7}");
        assert!(record.is_snapshot());
        assert_eq!(record.display_name, "");
        assert_eq!(record.new_value, "");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["operation"], "update");
        assert_eq!(json["type_name"], "User");
        assert_eq!(json["records"][0]["field"], "age");
        assert_eq!(json["records"][0]["display_name"], "Age");
        assert_eq!(json["records"][0]["old_value"], "30");

        let back: ChangeSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Insert.to_string(), "insert");
        assert_eq!(Operation::Delete.as_str(), "delete");
    }
}
