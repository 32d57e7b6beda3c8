//! Error types for document operations.
//!
//! Path reads and writes, list mutation and decoding all report failures
//! through [`DocumentError`].

use thiserror::Error;

/// Structured error types for document operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A mutator was called on a read-only document
    #[error("Document is read-only: cannot {operation}")]
    ReadOnlyViolation { operation: String },

    /// A strict lookup matched nothing
    #[error("No node matches path '{path}'")]
    NotFound { path: String },

    /// The resolved node is not the variant the operation needs
    #[error("Type mismatch at '{path}': expected {expected}, found {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// A node handle outlived the node it named
    #[error("Node handle {node} no longer refers to a live node")]
    StaleHandle { node: String },

    /// Text or bytes could not be decoded into a document
    #[error("Invalid document input: {reason}")]
    InvalidInput { reason: String },

    /// An attach would give a node a second parent or make it its own ancestor
    #[error("Cannot attach node {node}: {reason}")]
    InvalidStructure { node: String, reason: String },
}

impl DocumentError {
    /// Check if this error is a read-only violation
    pub fn is_read_only_violation(&self) -> bool {
        matches!(self, DocumentError::ReadOnlyViolation { .. })
    }

    /// Check if this error means nothing matched
    pub fn is_not_found(&self) -> bool {
        matches!(self, DocumentError::NotFound { .. })
    }

    /// Check if this error is related to type mismatches
    pub fn is_type_error(&self) -> bool {
        matches!(self, DocumentError::TypeMismatch { .. })
    }

    /// Check if this error came from a stale node handle
    pub fn is_stale_handle(&self) -> bool {
        matches!(self, DocumentError::StaleHandle { .. })
    }

    /// Check if this error came from decoding
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, DocumentError::InvalidInput { .. })
    }

    /// Check if this error is a rejected structural change
    pub fn is_invalid_structure(&self) -> bool {
        matches!(self, DocumentError::InvalidStructure { .. })
    }

    /// Get the path if this is a path-related error
    pub fn path(&self) -> Option<&str> {
        match self {
            DocumentError::NotFound { path } | DocumentError::TypeMismatch { path, .. } => {
                Some(path)
            }
            _ => None,
        }
    }

    /// Fills in the path of a path-related error raised without one.
    pub(crate) fn at_path(self, at: &str) -> Self {
        match self {
            DocumentError::TypeMismatch {
                path,
                expected,
                actual,
            } if path.is_empty() => DocumentError::TypeMismatch {
                path: at.to_string(),
                expected,
                actual,
            },
            other => other,
        }
    }
}

impl From<DocumentError> for crate::Error {
    fn from(err: DocumentError) -> Self {
        crate::Error::Document(err)
    }
}
