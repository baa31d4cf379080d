//! # oxide-audit-core
//!
//! Field-level change sets for audit logging.
//!
//! This crate provides:
//! - The [`Auditable`] descriptor trait, generated by `#[derive(Auditable)]`
//!   from the `oxide-audit-derive` crate
//! - A [`FieldCatalog`] of the comparable fields of a record type
//! - A [`ValueNormalizer`] turning field values into canonical strings
//! - A [`DisplayNameResolver`] backed by declared labels and a
//!   [`LabelRegistry`]
//! - The [`DiffEngine`] building insert, delete and update [`ChangeSet`]s
//!
//! ## Example
//!
//! ```rust
//! use chrono::{DateTime, TimeZone, Utc};
//! use oxide_audit_core::{DiffEngine, Operation};
//! use oxide_audit_derive::Auditable;
//! use serde::Serialize;
//!
//! #[derive(Clone, Serialize, Auditable)]
//! struct Customer {
//!     id: i64,
//!     #[audit(label = "Full name")]
//!     name: String,
//!     email: Option<String>,
//!     registered_at: DateTime<Utc>,
//! }
//!
//! let engine = DiffEngine::new();
//! let before = Customer {
//!     id: 7,
//!     name: "Alice".to_string(),
//!     email: None,
//!     registered_at: Utc.with_ymd_and_hms(2024, 1, 5, 10, 0, 0).unwrap(),
//! };
//!
//! // Inserts log every populated field.
//! let created = engine.insert(Some(&before)).unwrap();
//! assert_eq!(created.fields().collect::<Vec<_>>(), vec!["id", "name", "registered_at"]);
//! assert_eq!(created.get("registered_at").unwrap().new_value, "2024-01-05 10:00:00");
//!
//! // Updates log the fields whose canonical value changed.
//! let after = Customer {
//!     name: "Alicia".to_string(),
//!     ..before.clone()
//! };
//! let updated = engine.update(&before, &after).unwrap();
//! assert_eq!(updated.operation(), Operation::Update);
//! assert_eq!(updated.len(), 1);
//! assert_eq!(updated.records()[0].display_name, "Full name");
//! ```
//!
//! ## Field sets
//!
//! Insert diffs log only the fields declared on the record itself with a
//! simple value kind. Update diffs compare every property the record
//! exposes, including fields of an embedded `#[audit(base)]` record,
//! `#[audit(computed = "...")]` properties and collection fields. Delete
//! diffs store a single JSON snapshot of the record.

pub mod catalog;
pub mod change;
pub mod config;
pub mod engine;
pub mod error;
pub mod labels;
pub mod normalize;
pub mod schema;
pub mod value;

pub use catalog::{FieldCatalog, FieldDescriptor};
pub use change::{ChangeRecord, ChangeSet, Operation};
pub use config::DiffConfig;
pub use engine::DiffEngine;
pub use error::{AccessError, DiffError, Result};
pub use labels::{DisplayNameResolver, LabelRegistry, LabelSource};
pub use normalize::{format_w3c, w3c, TemporalFormat, ValueNormalizer};
pub use schema::{Auditable, FieldDef};
pub use value::{AuditValue, FieldValue, ValueKind};
