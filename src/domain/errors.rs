//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.
//! Each tier gets its own enum: strict validation, single-record decoding and
//! the file boundary of the persistence engine.

use std::path::PathBuf;

/// A field value rejected by a strict validator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("{field} too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },

    #[error("{field} too short (min {min} characters)")]
    TooShort { field: &'static str, min: usize },

    #[error("{0} contains invalid characters")]
    InvalidCharacters(&'static str),

    #[error("{0} cannot be only whitespace")]
    Blank(&'static str),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("Invalid {0}")]
    InvalidDate(&'static str),

    #[error("{0} cannot be in the future")]
    DateInFuture(&'static str),

    #[error("{0} cannot be in the past")]
    DateInPast(&'static str),

    #[error("{0} too far in the future (max 1 year)")]
    DateTooFar(&'static str),
}

/// Failure to rebuild one entity from its stored record
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Unknown resource type '{0}'")]
    UnknownResourceType(String),

    #[error("Malformed {entity} record: {reason}")]
    MalformedRecord { entity: &'static str, reason: String },

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl RecordError {
    pub fn malformed(entity: &'static str, reason: impl ToString) -> Self {
        RecordError::MalformedRecord {
            entity,
            reason: reason.to_string(),
        }
    }
}

/// Failure at the catalog file boundary
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    #[error("Invalid file extension: {0}")]
    InvalidExtension(String),

    #[error("File does not exist: {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON document: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("Failed to serialize {collection}: {source}")]
    Serialize {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to load {collection}[{index}]: {source}")]
    Record {
        collection: &'static str,
        index: usize,
        #[source]
        source: RecordError,
    },
}
