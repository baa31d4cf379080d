//! Comparable field enumeration.

use crate::schema::{Auditable, FieldDef};
use crate::value::ValueKind;

/// One cataloged field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    kind: ValueKind,
    eligible: bool,
}

impl FieldDescriptor {
    /// Returns the field identifier.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the declared value kind.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns whether the field takes part in simple-value comparison.
    #[must_use]
    pub const fn is_eligible(&self) -> bool {
        self.eligible
    }
}

impl From<&FieldDef> for FieldDescriptor {
    fn from(def: &FieldDef) -> Self {
        Self {
            name: def.name,
            kind: def.kind,
            eligible: def.kind.is_simple(),
        }
    }
}

/// The fields declared directly on a record type, in declaration order.
///
/// Fields of an embedded base record are not part of the catalog. Fields of
/// unsupported kind are listed but marked ineligible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldCatalog {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
}

impl FieldCatalog {
    /// Catalogs the own fields of `T`.
    #[must_use]
    pub fn of<T: Auditable>() -> Self {
        Self::from_defs(T::TYPE_NAME, T::own_fields())
    }

    /// Catalogs an explicit list of field definitions.
    #[must_use]
    pub fn from_defs(type_name: &'static str, defs: &[FieldDef]) -> Self {
        Self {
            type_name,
            fields: defs.iter().map(FieldDescriptor::from).collect(),
        }
    }

    /// Returns the cataloged type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns all descriptors.
    #[must_use]
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Iterates over the eligible descriptors.
    pub fn eligible(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|f| f.eligible)
    }

    /// Looks up a descriptor by field identifier.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the number of cataloged fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the type declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
