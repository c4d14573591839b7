//! Location types.
//!
//! A [`Location`] is owned by exactly one travel plan. Its `plan_id` is a
//! lookup key into the plans table, never an ownership pointer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::plan::{bounded_text, ValidationError};
use crate::{LocationId, PlanId, Version};

/// Maximum length of a location name, in characters.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of location notes, in characters.
pub const MAX_NOTES_LEN: usize = 1000;

/// A validated location name.
///
/// # Examples
///
/// ```
/// use wayplan::LocationName;
///
/// assert_eq!(LocationName::new(" Kyoto ").unwrap().as_str(), "Kyoto");
/// assert!(LocationName::new("").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationName(String);

impl LocationName {
    /// Creates a name, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty after trimming or longer than
    /// [`MAX_NAME_LEN`] characters.
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        bounded_text("name", name.as_ref(), MAX_NAME_LEN).map(Self)
    }

    /// Returns the name text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for LocationName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LocationName> for String {
    fn from(name: LocationName) -> Self {
        name.0
    }
}

impl fmt::Display for LocationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated free-form notes attached to a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Notes(String);

impl Notes {
    /// Parses optional notes. Blank input yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the notes exceed [`MAX_NOTES_LEN`] characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use wayplan::Notes;
    ///
    /// assert!(Notes::parse(None).unwrap().is_none());
    /// assert!(Notes::parse(Some("   ".into())).unwrap().is_none());
    /// assert_eq!(
    ///     Notes::parse(Some("ryokan booked".into())).unwrap().unwrap().as_str(),
    ///     "ryokan booked"
    /// );
    /// ```
    pub fn parse(notes: Option<String>) -> Result<Option<Self>, ValidationError> {
        match notes {
            Some(text) if !text.trim().is_empty() => {
                bounded_text("notes", &text, MAX_NOTES_LEN).map(|t| Some(Self(t)))
            }
            _ => Ok(None),
        }
    }

    /// Returns the notes text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Notes {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        bounded_text("notes", &value, MAX_NOTES_LEN).map(Self)
    }
}

impl From<Notes> for String {
    fn from(notes: Notes) -> Self {
        notes.0
    }
}

/// A stop inside a travel plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    id: LocationId,
    plan_id: PlanId,
    name: LocationName,
    order: u32,
    budget_eur: u32,
    notes: Option<Notes>,
    version: Version,
}

impl Location {
    /// Creates a builder for a location at the given position.
    #[must_use]
    pub fn builder(plan_id: PlanId, name: LocationName, order: u32) -> LocationBuilder {
        LocationBuilder {
            id: None,
            plan_id,
            name,
            order,
            budget_eur: 0,
            notes: None,
            version: Version::INITIAL,
        }
    }

    /// Returns the location id.
    #[must_use]
    pub const fn id(&self) -> LocationId {
        self.id
    }

    /// Returns the id of the owning plan.
    #[must_use]
    pub const fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    /// Returns the name.
    #[must_use]
    pub const fn name(&self) -> &LocationName {
        &self.name
    }

    /// Returns the zero-based position within the plan.
    #[must_use]
    pub const fn order(&self) -> u32 {
        self.order
    }

    /// Returns the budget in euros.
    #[must_use]
    pub const fn budget_eur(&self) -> u32 {
        self.budget_eur
    }

    /// Returns the notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_ref().map(Notes::as_str)
    }

    /// Returns the persisted version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }
}

/// Builder for [`Location`] instances.
#[derive(Debug)]
pub struct LocationBuilder {
    id: Option<LocationId>,
    plan_id: PlanId,
    name: LocationName,
    order: u32,
    budget_eur: u32,
    notes: Option<Notes>,
    version: Version,
}

impl LocationBuilder {
    /// Sets the location id.
    #[must_use]
    pub const fn id(mut self, id: LocationId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the budget in euros.
    #[must_use]
    pub const fn budget_eur(mut self, budget_eur: u32) -> Self {
        self.budget_eur = budget_eur;
        self
    }

    /// Sets the notes.
    #[must_use]
    pub fn notes(mut self, notes: Option<Notes>) -> Self {
        self.notes = notes;
        self
    }

    /// Sets the version.
    #[must_use]
    pub const fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Builds the location, generating an id if none was set.
    #[must_use]
    pub fn build(self) -> Location {
        Location {
            id: self.id.unwrap_or_default(),
            plan_id: self.plan_id,
            name: self.name,
            order: self.order,
            budget_eur: self.budget_eur,
            notes: self.notes,
            version: self.version,
        }
    }
}

/// Input for appending a location to a plan.
///
/// # Examples
///
/// ```
/// use wayplan::NewLocation;
///
/// let tokyo = NewLocation::new("Tokyo", 800, None).unwrap();
/// assert_eq!(tokyo.name.as_str(), "Tokyo");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    /// Location name.
    pub name: LocationName,
    /// Budget in euros.
    pub budget_eur: u32,
    /// Optional notes.
    pub notes: Option<Notes>,
}

impl NewLocation {
    /// Validates raw input into a [`NewLocation`].
    ///
    /// # Errors
    ///
    /// Returns an error if the name or notes violate their bounds.
    pub fn new(
        name: impl AsRef<str>,
        budget_eur: u32,
        notes: Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: LocationName::new(name)?,
            budget_eur,
            notes: Notes::parse(notes)?,
        })
    }
}

/// Input for a version-checked location update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationUpdate {
    /// New name.
    pub name: LocationName,
    /// New budget in euros.
    pub budget_eur: u32,
    /// New notes; `None` clears them.
    pub notes: Option<Notes>,
    /// The version the caller last read.
    pub expected_version: Version,
    /// Target position, if the location should move.
    pub new_order: Option<u32>,
}

impl LocationUpdate {
    /// Validates raw input into a [`LocationUpdate`] without a move.
    ///
    /// # Errors
    ///
    /// Returns an error if the name or notes violate their bounds.
    pub fn new(
        name: impl AsRef<str>,
        budget_eur: u32,
        notes: Option<String>,
        expected_version: Version,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: LocationName::new(name)?,
            budget_eur,
            notes: Notes::parse(notes)?,
            expected_version,
            new_order: None,
        })
    }

    /// Requests that the location move to `order`.
    #[must_use]
    pub const fn with_order(mut self, order: u32) -> Self {
        self.new_order = Some(order);
        self
    }

    /// Builds an update that keeps every field of `location` and only moves it.
    #[must_use]
    pub fn reorder(location: &Location, order: u32) -> Self {
        Self {
            name: location.name.clone(),
            budget_eur: location.budget_eur,
            notes: location.notes.clone(),
            expected_version: location.version,
            new_order: Some(order),
        }
    }
}
