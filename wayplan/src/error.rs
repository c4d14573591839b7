//! Error types for the wayplan library.
//!
//! This module provides the error hierarchy for every repository operation,
//! using `thiserror` for ergonomic error handling. Callers are expected to
//! tell "nothing to act on" ([`Error::NotFound`]) apart from "something
//! changed underneath you" ([`Error::VersionConflict`]).

use thiserror::Error;

use crate::version::Version;

/// Result type alias for operations that may fail with a wayplan error.
///
/// # Examples
///
/// ```
/// use wayplan::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(2000)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the wayplan library.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced plan or location does not exist.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// The caller's expected version does not match the persisted one.
    ///
    /// Nothing was written. The caller owns the retry decision.
    #[error("version conflict on {resource}: expected {expected}, found {actual}")]
    VersionConflict {
        /// The resource whose version did not match.
        resource: String,
        /// The version the caller supplied.
        expected: Version,
        /// The version currently persisted.
        actual: Version,
    },

    /// The caller cancelled the operation before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A database error occurred.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A database lock timeout occurred.
    #[error("database lock timeout after {seconds}s")]
    LockTimeout {
        /// The number of seconds waited before timing out.
        seconds: u64,
    },

    /// An entity invariant or argument check failed.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// A JSON document could not be read or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: u32,
        /// The schema version found in the database.
        found: u32,
    },

    /// A shard could not be resolved or rejected an operation.
    #[error("shard '{shard}': {message}")]
    Shard {
        /// The shard key or path involved.
        shard: String,
        /// What went wrong.
        message: String,
    },
}

impl From<crate::plan::ValidationError> for Error {
    fn from(err: crate::plan::ValidationError) -> Self {
        Self::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

impl From<crate::version::InvalidVersionError> for Error {
    fn from(err: crate::version::InvalidVersionError) -> Self {
        Self::Validation {
            field: "version".into(),
            message: err.to_string(),
        }
    }
}

impl Error {
    /// Creates a [`Error::NotFound`] for a plan id.
    pub(crate) fn plan_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource: format!("travel plan {id}"),
        }
    }

    /// Creates a [`Error::NotFound`] for a location id.
    pub(crate) fn location_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource: format!("location {id}"),
        }
    }

    /// Creates a [`Error::VersionConflict`] from the stored version.
    pub(crate) fn version_conflict(
        resource: impl std::fmt::Display,
        expected: crate::Version,
        actual: u32,
    ) -> Self {
        match crate::Version::try_from(actual) {
            Ok(actual) => Self::VersionConflict {
                resource: resource.to_string(),
                expected,
                actual,
            },
            Err(e) => e.into(),
        }
    }

    /// Check if the referenced entity does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayplan::Error;
    ///
    /// let err = Error::NotFound { resource: "travel plan 42".into() };
    /// assert!(err.is_not_found());
    /// assert!(!err.is_conflict());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the error is an optimistic concurrency conflict.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayplan::{Error, Version};
    ///
    /// let err = Error::VersionConflict {
    ///     resource: "travel plan 42".into(),
    ///     expected: Version::INITIAL,
    ///     actual: Version::INITIAL.next(),
    /// };
    /// assert!(err.is_conflict());
    /// ```
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    /// Check if the caller cancelled the operation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if the error came from the storage layer.
    #[must_use]
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::LockTimeout { .. })
    }
}
