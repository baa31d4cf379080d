//! Display labels for fields.
//!
//! Labels come from two places: the `#[audit(label = "...")]` attributes
//! compiled into each [`Auditable`] type, and an external [`LabelSource`]
//! supplied to the engine. The external source wins when both define a
//! label for the same field.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{DiffError, Result};
use crate::schema::Auditable;

/// A lookup of display labels by type and field.
pub trait LabelSource {
    /// Returns the label registered for `field` on `type_name`, if any.
    fn label(&self, type_name: &str, field: &str) -> Option<&str>;
}

impl<L: LabelSource + ?Sized> LabelSource for &L {
    fn label(&self, type_name: &str, field: &str) -> Option<&str> {
        (**self).label(type_name, field)
    }
}

impl<L: LabelSource + ?Sized> LabelSource for Arc<L> {
    fn label(&self, type_name: &str, field: &str) -> Option<&str> {
        (**self).label(type_name, field)
    }
}

/// A `type -> field -> label` table, built once at startup.
///
/// The JSON form is an object of objects:
///
/// ```rust
/// use oxide_audit_core::{LabelRegistry, LabelSource};
///
/// let labels = LabelRegistry::from_json(r#"{"User": {"name": "Full name"}}"#).unwrap();
/// assert_eq!(labels.label("User", "name"), Some("Full name"));
/// assert_eq!(labels.label("User", "email"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelRegistry {
    types: BTreeMap<String, BTreeMap<String, String>>,
}

impl LabelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a registry from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Labels`] if the input is not an object of
    /// string-valued objects.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(DiffError::Labels)
    }

    /// Copies the labels declared on `T`, keeping any already registered.
    pub fn register<T: Auditable>(&mut self) -> &mut Self {
        let fields = self.types.entry(T::TYPE_NAME.to_owned()).or_default();
        for (field, label) in T::labels() {
            fields
                .entry(field.to_owned())
                .or_insert_with(|| label.to_owned());
        }
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<T: Auditable>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Sets the label of one field, replacing any previous one.
    pub fn insert(
        &mut self,
        type_name: impl Into<String>,
        field: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .insert(field.into(), label.into());
        self
    }

    /// Returns the number of labelled fields across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.values().map(BTreeMap::len).sum()
    }

    /// Returns `true` if no label is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LabelSource for LabelRegistry {
    fn label(&self, type_name: &str, field: &str) -> Option<&str> {
        self.types.get(type_name)?.get(field).map(String::as_str)
    }
}

/// Resolves the display name of fields of one record type.
#[derive(Debug)]
pub struct DisplayNameResolver<'a, L: ?Sized> {
    source: &'a L,
    type_name: &'static str,
    declared: Vec<(&'static str, &'static str)>,
}

impl<'a, L: LabelSource + ?Sized> DisplayNameResolver<'a, L> {
    /// Creates a resolver for `T`, consulting `source` before the labels
    /// declared on the type.
    pub fn for_type<T: Auditable>(source: &'a L) -> Self {
        Self {
            source,
            type_name: T::TYPE_NAME,
            declared: T::labels(),
        }
    }

    /// Returns the label of `field`, or `None` if it has none.
    ///
    /// Blank labels count as missing.
    #[must_use]
    pub fn resolve(&self, field: &str) -> Option<&str> {
        let source: &'a L = self.source;
        source
            .label(self.type_name, field)
            .filter(|label| !label.trim().is_empty())
            .or_else(|| {
                self.declared
                    .iter()
                    .find(|(name, _)| *name == field)
                    .map(|(_, label)| *label)
                    .filter(|label| !label.trim().is_empty())
            })
    }

    /// Returns the label of `field`, falling back to the field identifier.
    #[must_use]
    pub fn display_name<'f>(&'f self, field: &'f str) -> &'f str {
        self.resolve(field).unwrap_or(field)
    }
}
