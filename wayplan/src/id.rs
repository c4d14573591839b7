//! Opaque entity identifiers.
//!
//! Plans and locations are identified by random 128-bit UUIDs. In
//! interchange they are hyphenated lowercase strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.hyphenated())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|e| Error::Validation {
                        field: $field.into(),
                        message: format!("not a valid identifier: {e}"),
                    })
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`TravelPlan`](crate::TravelPlan).
    ///
    /// # Examples
    ///
    /// ```
    /// use wayplan::PlanId;
    ///
    /// let id = PlanId::new();
    /// let parsed: PlanId = id.to_string().parse().unwrap();
    /// assert_eq!(id, parsed);
    /// assert!("not-a-uuid".parse::<PlanId>().is_err());
    /// ```
    PlanId,
    "plan_id"
);

entity_id!(
    /// Identifier of a [`Location`](crate::Location).
    LocationId,
    "location_id"
);

impl PlanId {
    /// Returns the shard key for this plan: the last hex digit of its UUID.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayplan::PlanId;
    ///
    /// let id: PlanId = "6f1c2a0e-8d1b-4c39-9e55-0b7d5a3e2f1a".parse().unwrap();
    /// assert_eq!(id.shard_key(), 'a');
    /// ```
    #[must_use]
    pub fn shard_key(&self) -> char {
        let simple = self.0.simple().to_string();
        simple.chars().last().unwrap_or('0')
    }
}
