//! Record descriptors.
//!
//! This module provides the [`Auditable`] trait that is implemented by the
//! `#[derive(Auditable)]` macro. It stands in for runtime introspection: the
//! field list, value kinds, labels and accessor of a record type are all
//! generated at compile time.

use crate::error::AccessError;
use crate::value::{FieldValue, ValueKind};

/// Compile-time description of one field declared on a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDef {
    /// Field identifier.
    pub name: &'static str,
    /// Declared value kind.
    pub kind: ValueKind,
    /// Display label attached to the field, if any.
    pub label: Option<&'static str>,
}

impl FieldDef {
    /// Creates a field definition without a label.
    #[must_use]
    pub const fn new(name: &'static str, kind: ValueKind) -> Self {
        Self {
            name,
            kind,
            label: None,
        }
    }

    /// Attaches a display label.
    #[must_use]
    pub const fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }
}

/// A record type the diff engine can inspect.
///
/// Two field sets are exposed on purpose:
///
/// - [`own_fields`](Self::own_fields) lists the fields declared directly on
///   the type. Insert diffs use only these.
/// - [`properties`](Self::properties) lists everything [`read`](Self::read)
///   accepts: own fields, fields of an embedded base record, and computed
///   properties. Update diffs walk this broader set.
///
/// # Example
///
/// A hand-written implementation for a type that cannot use the derive:
///
/// ```rust
/// use oxide_audit_core::{AccessError, AuditValue, Auditable, FieldDef, FieldValue, ValueKind};
///
/// struct Tag {
///     name: String,
/// }
///
/// impl Auditable for Tag {
///     const TYPE_NAME: &'static str = "Tag";
///
///     fn own_fields() -> &'static [FieldDef] {
///         const FIELDS: &[FieldDef] = &[FieldDef::new("name", ValueKind::Text).with_label("Tag")];
///         FIELDS
///     }
///
///     fn read(&self, field: &str) -> Result<FieldValue, AccessError> {
///         match field {
///             "name" => Ok(self.name.to_field_value()),
///             _ => Err(AccessError::UnknownField {
///                 type_name: Self::TYPE_NAME,
///                 field: field.to_owned(),
///             }),
///         }
///     }
/// }
///
/// assert_eq!(Tag::properties(), vec!["name"]);
/// assert_eq!(Tag::labels(), vec![("name", "Tag")]);
/// ```
pub trait Auditable {
    /// The record type identifier.
    const TYPE_NAME: &'static str;

    /// Fields declared directly on this type, in declaration order.
    fn own_fields() -> &'static [FieldDef];

    /// Every property [`read`](Self::read) accepts, in a stable order.
    fn properties() -> Vec<&'static str> {
        Self::own_fields().iter().map(|f| f.name).collect()
    }

    /// Reads the current value of a property.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError::UnknownField`] if the type exposes no such
    /// property, or [`AccessError::Unreadable`] if the value cannot be
    /// produced.
    fn read(&self, field: &str) -> Result<FieldValue, AccessError>;

    /// Display labels declared on this type as `(field, label)` pairs.
    fn labels() -> Vec<(&'static str, &'static str)> {
        Self::own_fields()
            .iter()
            .filter_map(|f| f.label.map(|label| (f.name, label)))
            .collect()
    }
}
