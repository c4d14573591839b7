//! Travel plan types.
//!
//! A [`TravelPlan`] is the aggregate root: it owns an ordered list of
//! [`Location`]s and carries the version stamp that guards its own fields.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::{Location, PlanId, Version};

/// Maximum length of a plan title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Error produced when an entity invariant is violated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field that failed validation.
    pub field: String,
    /// A description of the validation failure.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "validation error for '{}': {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Trims `value` and checks it is non-empty and at most `max` characters.
pub(crate) fn bounded_text(
    field: &str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError {
            field: field.into(),
            message: format!("{field} must be non-empty after trimming whitespace"),
        });
    }
    let len = trimmed.chars().count();
    if len > max {
        return Err(ValidationError {
            field: field.into(),
            message: format!("{field} is {len} characters long, the maximum is {max}"),
        });
    }
    Ok(trimmed.to_string())
}

/// A validated plan title.
///
/// # Examples
///
/// ```
/// use wayplan::Title;
///
/// let title = Title::new("  Japan Trip ").unwrap();
/// assert_eq!(title.as_str(), "Japan Trip");
///
/// assert!(Title::new("   ").is_err());
/// assert!(Title::new("x".repeat(201)).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Title(String);

impl Title {
    /// Creates a title, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns an error if the title is empty after trimming or longer than
    /// [`MAX_TITLE_LEN`] characters.
    pub fn new(title: impl AsRef<str>) -> Result<Self, ValidationError> {
        bounded_text("title", title.as_ref(), MAX_TITLE_LEN).map(Self)
    }

    /// Returns the title text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Title {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Title> for String {
    fn from(title: Title) -> Self {
        title.0
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A travel plan with its budget, version stamp and (optionally) locations.
///
/// # Examples
///
/// ```
/// use wayplan::{Title, TravelPlan, Version};
///
/// let plan = TravelPlan::new(Title::new("Japan Trip").unwrap(), 2000);
/// assert_eq!(plan.version(), Version::INITIAL);
/// assert_eq!(plan.created_at(), plan.updated_at());
/// assert!(plan.locations().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelPlan {
    id: PlanId,
    title: Title,
    budget_eur: u32,
    version: Version,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    locations: Vec<Location>,
}

impl TravelPlan {
    /// Creates a new plan with a fresh id, version 1 and no locations.
    #[must_use]
    pub fn new(title: Title, budget_eur: u32) -> Self {
        Self::builder(title, budget_eur).build()
    }

    /// Creates a builder for restoring a plan with explicit fields.
    #[must_use]
    pub fn builder(title: Title, budget_eur: u32) -> TravelPlanBuilder {
        TravelPlanBuilder {
            id: None,
            title,
            budget_eur,
            version: Version::INITIAL,
            created_at: None,
            updated_at: None,
            locations: Vec::new(),
        }
    }

    /// Returns the plan id.
    #[must_use]
    pub const fn id(&self) -> PlanId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &Title {
        &self.title
    }

    /// Returns the total budget in euros.
    #[must_use]
    pub const fn budget_eur(&self) -> u32 {
        self.budget_eur
    }

    /// Returns the persisted version.
    #[must_use]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the timestamp of the last accepted write.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the locations sorted by order, or an empty slice when they
    /// were not loaded.
    #[must_use]
    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Consumes the plan and returns its locations.
    #[must_use]
    pub fn into_locations(self) -> Vec<Location> {
        self.locations
    }

    pub(crate) fn with_locations(mut self, mut locations: Vec<Location>) -> Self {
        locations.sort_by_key(Location::order);
        self.locations = locations;
        self
    }
}

/// Builder for restoring [`TravelPlan`] instances from storage.
#[derive(Debug)]
pub struct TravelPlanBuilder {
    id: Option<PlanId>,
    title: Title,
    budget_eur: u32,
    version: Version,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    locations: Vec<Location>,
}

impl TravelPlanBuilder {
    /// Sets the plan id.
    #[must_use]
    pub const fn id(mut self, id: PlanId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the version.
    #[must_use]
    pub const fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Sets the creation timestamp.
    #[must_use]
    pub const fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Sets the last update timestamp.
    #[must_use]
    pub const fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.updated_at = Some(updated_at);
        self
    }

    /// Sets the locations. They are sorted by order.
    #[must_use]
    pub fn locations(mut self, mut locations: Vec<Location>) -> Self {
        locations.sort_by_key(Location::order);
        self.locations = locations;
        self
    }

    /// Builds the plan. Missing timestamps default to now, truncated to the
    /// microseconds the store keeps, with `updated_at` defaulting to
    /// `created_at`.
    #[must_use]
    pub fn build(self) -> TravelPlan {
        let created_at = self
            .created_at
            .unwrap_or_else(|| Utc::now().trunc_subsecs(6));
        TravelPlan {
            id: self.id.unwrap_or_default(),
            title: self.title,
            budget_eur: self.budget_eur,
            version: self.version,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
            locations: self.locations,
        }
    }
}
