//! Error types for path expressions.

use thiserror::Error;

/// Structured error types for compiling path expressions.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LocatorError {
    /// The expression does not follow the locator's grammar
    #[error("Malformed path expression '{expression}': {reason}")]
    MalformedExpression { expression: String, reason: String },
}

impl LocatorError {
    /// Check if this error is a grammar error
    pub fn is_malformed_expression(&self) -> bool {
        matches!(self, LocatorError::MalformedExpression { .. })
    }

    /// Get the offending expression
    pub fn expression(&self) -> &str {
        match self {
            LocatorError::MalformedExpression { expression, .. } => expression,
        }
    }
}

impl From<LocatorError> for crate::Error {
    fn from(err: LocatorError) -> Self {
        crate::Error::Locator(err)
    }
}
