//! Error types for the annotated matrix store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by the in-memory store.
///
/// File readers wrap these in `anyhow::Error` with context about which input
/// was being read.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Key sets disagree between matrices and annotation tables
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// A named matrix, annotation field or key does not exist
    #[error("{kind} not found: {name}")]
    NotFound {
        /// What was looked up ("matrix", "field", "key")
        kind: &'static str,
        /// The name that was requested
        name: String,
    },

    /// Matrix dimensions do not match the number of values supplied
    #[error("invalid shape: expected {rows}x{cols} = {expected} values, got {actual}")]
    Shape {
        rows: usize,
        cols: usize,
        expected: usize,
        actual: usize,
    },
}

impl StoreError {
    pub(crate) fn matrix_not_found(name: &str) -> Self {
        StoreError::NotFound {
            kind: "matrix",
            name: name.to_string(),
        }
    }

    pub(crate) fn field_not_found(name: &str) -> Self {
        StoreError::NotFound {
            kind: "field",
            name: name.to_string(),
        }
    }

    pub(crate) fn key_not_found(name: &str) -> Self {
        StoreError::NotFound {
            kind: "key",
            name: name.to_string(),
        }
    }
}
