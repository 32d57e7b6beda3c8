//! Error types for the document pool.

use thiserror::Error;

/// Structured error types for pool setup.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PoolError {
    /// A configuration value is out of range
    #[error("Invalid pool configuration: {field} {reason}")]
    InvalidConfig { field: String, reason: String },
}

impl PoolError {
    /// Check if this error is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, PoolError::InvalidConfig { .. })
    }
}

impl From<PoolError> for crate::Error {
    fn from(err: PoolError) -> Self {
        crate::Error::Pool(err)
    }
}
