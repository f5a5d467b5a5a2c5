//! Error types for the catalog.

use thiserror::Error;

/// Main error type for catalog operations.
///
/// Lookups against unknown ids are not errors; they return `None`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Validation error: field `{field}` is required")]
    Validation { field: &'static str },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Operation `{operation}` is not a {expected}")]
    WrongOperationKind {
        operation: String,
        expected: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Serialization(e.to_string())
    }
}

/// Result type for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
