//! Change set assembly for insert, delete and update operations.
//!
//! Insert and update walk different field sets. Insert logs the populated
//! own fields of simple kind ([`Auditable::own_fields`]); update compares
//! every property the accessor exposes ([`Auditable::properties`]), which
//! also covers embedded base records, computed properties and collection
//! fields. Delete does not enumerate fields at all and stores one JSON
//! snapshot of the whole record.

use serde::Serialize;
use tracing::{debug, error};

use crate::catalog::FieldCatalog;
use crate::change::{ChangeRecord, ChangeSet, Operation};
use crate::config::DiffConfig;
use crate::error::{AccessError, DiffError, Result};
use crate::labels::{DisplayNameResolver, LabelRegistry, LabelSource};
use crate::normalize::ValueNormalizer;
use crate::schema::Auditable;

/// Produces change sets for records.
///
/// The engine holds only immutable state; share it across threads behind an
/// `Arc` when the label source is `Sync`.
#[derive(Debug, Clone)]
pub struct DiffEngine<L = LabelRegistry> {
    labels: L,
    normalizer: ValueNormalizer,
}

impl Default for DiffEngine<LabelRegistry> {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine<LabelRegistry> {
    /// Creates an engine with no external labels and default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_labels(LabelRegistry::new())
    }
}

impl<L: LabelSource> DiffEngine<L> {
    /// Creates an engine with default settings.
    pub fn with_labels(labels: L) -> Self {
        Self {
            labels,
            normalizer: ValueNormalizer::default(),
        }
    }

    /// Creates an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Config`] if the configuration is invalid.
    pub fn with_config(labels: L, config: &DiffConfig) -> Result<Self> {
        Ok(Self {
            labels,
            normalizer: config.normalizer()?,
        })
    }

    /// Returns the label source.
    pub const fn labels(&self) -> &L {
        &self.labels
    }

    /// Returns the value normalizer.
    pub const fn normalizer(&self) -> &ValueNormalizer {
        &self.normalizer
    }

    /// Builds the change set of a newly created record.
    ///
    /// One record per eligible own field with a non-null value, in
    /// declaration order, with an empty `old_value`. `None` yields an empty
    /// change set.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Unreadable`] if any field cannot be read; the
    /// insert is then abandoned as a whole and `partial` is empty.
    pub fn insert<T: Auditable>(&self, instance: Option<&T>) -> Result<ChangeSet> {
        let mut changes = ChangeSet::new(Operation::Insert, T::TYPE_NAME);
        let Some(instance) = instance else {
            debug!(type_name = T::TYPE_NAME, "insert without instance");
            return Ok(changes);
        };

        let catalog = FieldCatalog::of::<T>();
        let resolver = DisplayNameResolver::for_type::<T>(&self.labels);
        debug!(type_name = T::TYPE_NAME, fields = catalog.len(), "diffing insert");

        for descriptor in catalog.eligible() {
            let field = descriptor.name();
            let value = match instance.read(field) {
                Ok(value) => value,
                Err(source) => {
                    return Err(unreadable::<T>(
                        Operation::Insert,
                        field,
                        source,
                        ChangeSet::new(Operation::Insert, T::TYPE_NAME),
                    ));
                }
            };
            if value.is_null() {
                continue;
            }
            changes.push(ChangeRecord::new(
                field,
                resolver.display_name(field),
                String::new(),
                self.normalizer.normalize(&value),
            ));
        }

        Ok(changes)
    }

    /// Builds the change set of a removed record.
    ///
    /// Always exactly one record: `old_value` is the compact JSON
    /// serialization of the whole record, `new_value` is empty, and `field`
    /// and `display_name` are empty.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Snapshot`] if the record cannot be serialized.
    pub fn delete<T: Auditable + Serialize>(&self, instance: &T) -> Result<ChangeSet> {
        debug!(type_name = T::TYPE_NAME, "diffing delete");
        let snapshot = serde_json::to_string(instance)?;

        let mut changes = ChangeSet::new(Operation::Delete, T::TYPE_NAME);
        changes.push(ChangeRecord::snapshot(snapshot));
        Ok(changes)
    }

    /// Builds the change set between two versions of a record.
    ///
    /// Walks every property of `T` and emits a record when the canonical
    /// strings differ. Null on both sides is never a change.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Unreadable`] on the first property that cannot
    /// be read from either version. The comparison stops there; `partial`
    /// holds the records assembled before the failure and the diff as a
    /// whole has failed.
    pub fn update<T: Auditable>(&self, old: &T, new: &T) -> Result<ChangeSet> {
        let properties = T::properties();
        let resolver = DisplayNameResolver::for_type::<T>(&self.labels);
        debug!(type_name = T::TYPE_NAME, properties = properties.len(), "diffing update");

        let mut changes = ChangeSet::new(Operation::Update, T::TYPE_NAME);
        for field in properties {
            let old_value = match old.read(field) {
                Ok(value) => self.normalizer.normalize(&value),
                Err(source) => return Err(unreadable::<T>(Operation::Update, field, source, changes)),
            };
            let new_value = match new.read(field) {
                Ok(value) => self.normalizer.normalize(&value),
                Err(source) => return Err(unreadable::<T>(Operation::Update, field, source, changes)),
            };

            if old_value != new_value {
                debug!(type_name = T::TYPE_NAME, field, "field changed");
                changes.push(ChangeRecord::new(
                    field,
                    resolver.display_name(field),
                    old_value,
                    new_value,
                ));
            }
        }

        Ok(changes)
    }
}

fn unreadable<T: Auditable>(
    operation: Operation,
    field: &str,
    source: AccessError,
    partial: ChangeSet,
) -> DiffError {
    error!(
        type_name = T::TYPE_NAME,
        %operation,
        field,
        error = %source,
        "diff aborted: field could not be read"
    );
    DiffError::Unreadable {
        type_name: T::TYPE_NAME,
        field: field.to_owned(),
        source,
        partial: Box::new(partial),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::*;
    use crate::schema::FieldDef;
    use crate::value::{AuditValue, FieldValue, ValueKind};

    #[derive(Serialize)]
    struct Person {
        name: Option<String>,
        age: Option<u32>,
        nicknames: Vec<String>,
    }

    impl Auditable for Person {
        const TYPE_NAME: &'static str = "Person";

        fn own_fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef::new("name", ValueKind::Text).with_label("Name"),
                FieldDef::new("age", ValueKind::Integer),
                FieldDef::new("nicknames", ValueKind::Unsupported),
            ];
            FIELDS
        }

        fn read(&self, field: &str) -> std::result::Result<FieldValue, AccessError> {
            match field {
                "name" => Ok(self.name.to_field_value()),
                "age" => Ok(self.age.to_field_value()),
                "nicknames" => Ok(self.nicknames.to_field_value()),
                _ => Err(AccessError::UnknownField {
                    type_name: Self::TYPE_NAME,
                    field: field.to_owned(),
                }),
            }
        }
    }

    /// Fails to read `locked` and exposes it between two readable fields.
    struct Vault {
        owner: &'static str,
        note: &'static str,
    }

    impl Auditable for Vault {
        const TYPE_NAME: &'static str = "Vault";

        fn own_fields() -> &'static [FieldDef] {
            const FIELDS: &[FieldDef] = &[
                FieldDef::new("owner", ValueKind::Text),
                FieldDef::new("locked", ValueKind::Text),
                FieldDef::new("note", ValueKind::Text),
            ];
            FIELDS
        }

        fn read(&self, field: &str) -> std::result::Result<FieldValue, AccessError> {
            match field {
                "owner" => Ok(self.owner.to_field_value()),
                "note" => Ok(self.note.to_field_value()),
                _ => Err(AccessError::unreadable(field, "sealed")),
            }
        }
    }

    fn person(name: Option<&str>, age: Option<u32>) -> Person {
        Person {
            name: name.map(str::to_owned),
            age,
            nicknames: Vec::new(),
        }
    }

    #[test]
    fn test_insert_skips_null_and_unsupported() {
        let engine = DiffEngine::new();
        let changes = engine.insert(Some(&person(Some("Alice"), None))).unwrap();

        assert_eq!(changes.operation(), Operation::Insert);
        assert_eq!(changes.len(), 1);
        let record = &changes.records()[0];
        assert_eq!(record.field, "name");
        assert_eq!(record.display_name, "Name");
        assert_eq!(record.old_value, "");
        assert_eq!(record.new_value, "Alice");
    }

    #[test]
    fn test_insert_without_instance() {
        let engine = DiffEngine::new();
        let changes = engine.insert::<Person>(None).unwrap();
        assert!(changes.is_empty());
        assert_eq!(changes.type_name(), "Person");
    }

    #[test]
    fn test_insert_aborts_on_unreadable() {
        let engine = DiffEngine::new();
        let vault = Vault {
            owner: "Ann",
            note: "n",
        };
        let err = engine.insert(Some(&vault)).unwrap_err();
        match &err {
            DiffError::Unreadable { field, partial, .. } => {
                assert_eq!(field, "locked");
                assert!(partial.is_empty());
                assert_eq!(partial.operation(), Operation::Insert);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_update_reports_changed_fields_only() {
        let engine = DiffEngine::new();
        let changes = engine
            .update(&person(Some("Alice"), Some(30)), &person(Some("Alice"), Some(31)))
            .unwrap();

        assert_eq!(changes.operation(), Operation::Update);
        assert_eq!(changes.len(), 1);
        let record = changes.get("age").unwrap();
        assert_eq!(record.display_name, "age");
        assert_eq!(record.old_value, "30");
        assert_eq!(record.new_value, "31");
    }

    #[test]
    fn test_update_null_to_value() {
        let engine = DiffEngine::new();
        let changes = engine
            .update(&person(None, None), &person(Some("Bo"), None))
            .unwrap();
        let record = changes.get("name").unwrap();
        assert_eq!(record.old_value, "");
        assert_eq!(record.new_value, "Bo");
        assert!(changes.get("age").is_none());
    }

    #[test]
    fn test_update_compares_collections() {
        let engine = DiffEngine::new();
        let old = person(Some("A"), None);
        let mut new = person(Some("A"), None);
        new.nicknames.push("Al".to_owned());

        let changes = engine.update(&old, &new).unwrap();
        let record = changes.get("nicknames").unwrap();
        assert_eq!(record.old_value, "[]");
        assert_eq!(record.new_value, "[Al]");
    }

    #[test]
    fn test_update_stops_at_first_unreadable() {
        let engine = DiffEngine::new();
        let old = Vault {
            owner: "Ann",
            note: "a",
        };
        let new = Vault {
            owner: "Bea",
            note: "b",
        };

        let err = engine.update(&old, &new).unwrap_err();
        let partial = err.partial().unwrap();
        assert_eq!(partial.fields().collect::<Vec<_>>(), vec!["owner"]);
        assert!(partial.get("note").is_none());
        assert_eq!(
            err.to_string(),
            "failed to read `locked` on `Vault`: property `locked` could not be read: sealed"
        );
    }

    #[test]
    fn test_delete_single_snapshot() {
        let engine = DiffEngine::new();
        let changes = engine.delete(&person(Some("Bob"), Some(7))).unwrap();

        assert_eq!(changes.operation(), Operation::Delete);
        assert_eq!(changes.len(), 1);
        let record = &changes.records()[0];
        assert!(record.is_snapshot());
        assert_eq!(record.new_value, "");
        assert_eq!(
            record.old_value,
            r#"{"name":"Bob","age":7,"nicknames":[]}"#
        );
    }

    #[test]
    fn test_registry_label_used() {
        let mut labels = LabelRegistry::new();
        labels.insert("Person", "age", "Age in years");
        let engine = DiffEngine::with_labels(labels);

        let changes = engine
            .update(&person(None, Some(1)), &person(None, Some(2)))
            .unwrap();
        assert_eq!(changes.get("age").unwrap().display_name, "Age in years");
    }

    #[test]
    fn test_with_config_rejects_bad_offset() {
        let config = DiffConfig::new().utc_offset("+99:00");
        assert!(matches!(
            DiffEngine::with_config(LabelRegistry::new(), &config),
            Err(DiffError::Config(_))
        ));
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DiffEngine>();
    }
}
