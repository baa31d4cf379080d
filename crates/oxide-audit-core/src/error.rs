//! Error types for diff operations.

use thiserror::Error;

use crate::change::ChangeSet;

/// A property could not be read from a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The type exposes no property with this name.
    #[error("type `{type_name}` has no readable property `{field}`")]
    UnknownField {
        /// Type that was asked for the property.
        type_name: &'static str,
        /// Requested property name.
        field: String,
    },

    /// The property exists but its value could not be produced.
    #[error("property `{field}` could not be read: {reason}")]
    Unreadable {
        /// Property name.
        field: String,
        /// Why the read failed.
        reason: String,
    },
}

impl AccessError {
    /// Creates an `Unreadable` error.
    pub fn unreadable(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unreadable {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned by the diff engine.
#[derive(Debug, Error)]
pub enum DiffError {
    /// A field could not be read; the diff was abandoned.
    ///
    /// `partial` holds the records assembled before the failure. They do not
    /// describe the whole change and must not be logged as if they did.
    #[error("failed to read `{field}` on `{type_name}`: {source}")]
    Unreadable {
        /// Record type being diffed.
        type_name: &'static str,
        /// Field whose read failed.
        field: String,
        /// Underlying accessor error.
        #[source]
        source: AccessError,
        /// Records assembled before the failure.
        partial: Box<ChangeSet>,
    },

    /// The deleted record could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// A label table could not be parsed.
    #[error("invalid label table: {0}")]
    Labels(#[source] serde_json::Error),

    /// Invalid engine configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl DiffError {
    /// Returns the partial change set of an aborted diff, if any.
    #[must_use]
    pub fn partial(&self) -> Option<&ChangeSet> {
        match self {
            Self::Unreadable { partial, .. } => Some(partial),
            _ => None,
        }
    }
}

/// Result type alias for diff operations.
pub type Result<T> = std::result::Result<T, DiffError>;
