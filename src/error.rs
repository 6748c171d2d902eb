//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use thiserror::Error;

use crate::codec::CodecError;

// == Backend Error Enum ==
/// Errors raised by a backend or registry collaborator.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The store could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The store was reached but the command failed
    #[error("Operation failed: {0}")]
    Operation(String),

    /// The store refused the write (key or value limits)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The store is full and its policy does not evict
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),

    /// A named cache with this name already exists
    #[error("Cache already exists: {0}")]
    AlreadyExists(String),

    /// The operation did not finish before its deadline
    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

// == Cache Error Enum ==
/// Unified error type returned by the facade.
///
/// `target` is the key or cache name the failing operation was about.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Network or store failure
    #[error("Backend unavailable for '{target}': {source}")]
    BackendUnavailable {
        target: String,
        #[source]
        source: BackendError,
    },

    /// Value could not be serialized or deserialized
    #[error("Encoding failed for '{target}': {source}")]
    Encoding {
        target: String,
        #[source]
        source: CodecError,
    },

    /// Caller supplied an unusable argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Namespace operation on a cache that was never created
    #[error("Cache not found: {0}")]
    CacheNotFound(String),

    /// Key operation that requires an existing key
    #[error("Key not found: {0}")]
    KeyNotFound(String),
}

impl CacheError {
    /// Wraps a collaborator failure. A rejected write can never succeed on
    /// retry, so it is reported as the caller's argument error.
    pub(crate) fn backend(target: impl Into<String>, source: BackendError) -> Self {
        match source {
            BackendError::Rejected(reason) => {
                CacheError::InvalidArgument(format!("'{}': {}", target.into(), reason))
            }
            source => CacheError::BackendUnavailable {
                target: target.into(),
                source,
            },
        }
    }

    pub(crate) fn encoding(target: impl Into<String>, source: CodecError) -> Self {
        CacheError::Encoding {
            target: target.into(),
            source,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;
