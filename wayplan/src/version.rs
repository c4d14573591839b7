//! Optimistic concurrency version stamps.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A positive version stamp for optimistic concurrency control.
///
/// Every entity starts at [`Version::INITIAL`] and moves to
/// [`Version::next`] on each accepted write. Version 0 does not exist.
///
/// # Examples
///
/// ```
/// use wayplan::Version;
///
/// let v = Version::INITIAL;
/// assert_eq!(v.value(), 1);
/// assert_eq!(v.next().value(), 2);
/// assert!(Version::try_from(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Version(u32);

impl Version {
    /// The version assigned at creation.
    pub const INITIAL: Self = Self(1);

    /// Returns the underlying version number.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the version that follows this one.
    ///
    /// Saturates at `u32::MAX`. The stored version cannot go past that
    /// point: such a write fails with a storage error and changes nothing.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl TryFrom<u32> for Version {
    type Error = InvalidVersionError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == 0 {
            Err(InvalidVersionError { value })
        } else {
            Ok(Self(value))
        }
    }
}

impl From<Version> for u32 {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for invalid version numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidVersionError {
    /// The rejected value.
    pub value: u32,
}

impl fmt::Display for InvalidVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version {}: versions start at 1", self.value)
    }
}

impl std::error::Error for InvalidVersionError {}
