//! Error types for the catalog crate.
//!
//! Every store operation reports failure through [`CatalogError`]. Validation
//! and uniqueness problems are raised before anything is written, so an
//! `Err` from a mutator always means the backing file is untouched.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while validating, storing or bulk-loading records
///
/// Missing targets on `update`/`delete` of the catalogue are reported as a
/// `false` result rather than `NotFound`; the variant exists for callers that
/// need the distinction (profile updates, CLI lookups).
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A field was missing, empty, malformed or out of range
    #[error("{field} {reason}")]
    Validation { field: String, reason: String },

    /// Another entry already uses this name (case-insensitive)
    #[error("name '{name}' already exists")]
    Duplicate { name: String },

    /// Identifier did not resolve to an entry
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    /// Backing file or bulk source could not be read or written
    #[error("I/O error on {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Collection could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Bulk input was structurally malformed
    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// A bulk row parsed but failed validation
    #[error("Invalid row at line {line}: {source}")]
    InvalidRow {
        line: usize,
        #[source]
        source: Box<CatalogError>,
    },
}

/// Coarse classification used by callers to pick exit/status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Uniqueness,
    NotFound,
    StorageIo,
}

impl CatalogError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(entity: &str, key: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Classify this error. Bulk row errors report the kind of their cause.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::Parse { .. } => ErrorKind::Validation,
            Self::Duplicate { .. } => ErrorKind::Uniqueness,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Storage { .. } | Self::Serialization(_) => ErrorKind::StorageIo,
            Self::InvalidRow { source, .. } => source.kind(),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
