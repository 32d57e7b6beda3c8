//!
//! dtree: dynamic, path-addressed document trees.
//! This library provides an in-memory tree of named values, objects and lists that is
//! read and written through path expressions and encoded to and from JSON-style text.
//!
//! ## Core Concepts
//!
//! * **Nodes (`node::NodeArena`)**: Every tree lives in an arena of value, object and list
//!   nodes addressed by generational ids. Lists keep a data-free template describing the
//!   shape of their members.
//! * **Documents (`doc::Document`)**: Handles to an object node offering path-addressed
//!   reads and writes, list operations, deep copies and encoding.
//! * **Lists (`doc::DocumentList`)**: Read-only snapshots of a list's members.
//! * **Locators (`locator::Locator`)**: Compile path expressions into matchers that find
//!   nodes for reads and create missing structure for writes.
//! * **Pools (`pool::Pool`)**: Recycle arenas for short-lived documents. Documents are
//!   either pinned (owning their tree) or reusable (bound to a `pool::PoolScope`).
//! * **Canonical encoding**: Field order normalised by name, used for equality and hashing.

pub mod doc;
pub mod locator;
pub mod node;
pub mod pool;
pub mod value;

pub use doc::{Assign, Document, DocumentError, DocumentList, Entry};
pub use locator::{Locator, LocatorError, Matcher, PathLocator, PathMatcher};
pub use node::{NodeArena, NodeId, NodeType, PinMode, Reach, WriteTarget};
pub use pool::{Pool, PoolConfig, PoolError, PoolScope, PoolStats};
pub use value::Value;

/// Result type used throughout the dtree library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the dtree library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured document errors from the doc module
    #[error(transparent)]
    Document(doc::DocumentError),

    /// Structured path expression errors from the locator module
    #[error(transparent)]
    Locator(locator::LocatorError),

    /// Structured pool errors from the pool module
    #[error(transparent)]
    Pool(pool::PoolError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Document(_) => "document",
            Error::Locator(_) => "locator",
            Error::Pool(_) => "pool",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates nothing matched a path.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is a write through a read-only document.
    pub fn is_read_only_violation(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_read_only_violation(),
            _ => false,
        }
    }

    /// Check if this error is type-related.
    pub fn is_type_error(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_type_error(),
            _ => false,
        }
    }

    /// Check if this error is a rejected path expression.
    pub fn is_malformed_expression(&self) -> bool {
        match self {
            Error::Locator(locator_err) => locator_err.is_malformed_expression(),
            _ => false,
        }
    }

    /// Check if this error came from a handle to a freed node.
    pub fn is_stale_handle(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_stale_handle(),
            _ => false,
        }
    }

    /// Check if this error is a decoding failure.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_invalid_input(),
            Error::Serialize(_) => true,
            _ => false,
        }
    }

    /// Check if this error is a rejected structural change.
    pub fn is_invalid_structure(&self) -> bool {
        match self {
            Error::Document(doc_err) => doc_err.is_invalid_structure(),
            _ => false,
        }
    }

    /// Check if this error is a rejected pool configuration.
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::Pool(pool_err) => pool_err.is_config_error(),
            _ => false,
        }
    }
}
