//! Error types for remixer

use thiserror::Error;

use crate::registry::{ContextId, ItemHandle};

/// Result type alias for remixer operations
pub type Result<T> = std::result::Result<T, RemixerError>;

/// Every failure is local and synchronous. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum RemixerError {
    /// Structurally invalid key, title or constraint setup at construction
    #[error("Invalid configuration for `{key}`: {reason}")]
    InvalidConfiguration { key: String, reason: String },

    /// A value rejected by `set_value`. The item keeps its prior value.
    #[error("Value {value} rejected by `{key}`: {reason}")]
    ConstraintViolation {
        key: String,
        value: String,
        reason: String,
    },

    /// An item whose key matches a live group but whose data type or
    /// constraints differ
    #[error("`{key}` is incompatible with live items sharing its key: {reason}")]
    IncompatibleItemsWithSameKey { key: String, reason: String },

    /// A data type name with no registered converter
    #[error("Unknown data type `{0}`")]
    UnknownDataType(String),

    /// A wire record of a known data type whose fields cannot be read
    #[error("Malformed record `{key}`: {reason}")]
    MalformedRecord { key: String, reason: String },

    /// No stored record for a key
    #[error("No variable stored under `{0}`")]
    UnknownKey(String),

    #[error("Unknown or destroyed context {0}")]
    UnknownContext(ContextId),

    #[error("Unknown or destroyed item {0}")]
    UnknownItem(ItemHandle),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("YAML merge key error: {0}")]
    MergeKeys(#[from] yaml_merge_keys::MergeKeyError),

    /// A declaration file that parses but is not a mapping of keys to entries
    #[error("Invalid declaration file: {0}")]
    InvalidDeclarations(String),
}

impl RemixerError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn violation(
        key: &str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::ConstraintViolation {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
