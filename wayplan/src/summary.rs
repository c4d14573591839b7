//! Transfer objects handed to callers.
//!
//! These are plain serializable snapshots of the entities. They carry the
//! version a caller must echo back on its next write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Location, LocationId, PlanId, TravelPlan, Version};

/// One row of a plan listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Plan id.
    pub id: PlanId,
    /// Plan title.
    pub title: String,
    /// Total budget in euros.
    pub budget_eur: u32,
    /// Current version.
    pub version: Version,
    /// Last accepted write.
    pub updated_at: DateTime<Utc>,
}

/// A plan with its timestamps and ordered locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDetail {
    /// Plan id.
    pub id: PlanId,
    /// Plan title.
    pub title: String,
    /// Total budget in euros.
    pub budget_eur: u32,
    /// Current version.
    pub version: Version,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last accepted write.
    pub updated_at: DateTime<Utc>,
    /// Locations sorted by order.
    pub locations: Vec<LocationItem>,
}

/// A location as seen inside a plan detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationItem {
    /// Location id.
    pub id: LocationId,
    /// Location name.
    pub name: String,
    /// Zero-based position.
    pub order: u32,
    /// Budget in euros.
    pub budget_eur: u32,
    /// Optional notes.
    pub notes: Option<String>,
    /// Current version.
    pub version: Version,
}

impl From<&TravelPlan> for PlanSummary {
    fn from(plan: &TravelPlan) -> Self {
        Self {
            id: plan.id(),
            title: plan.title().to_string(),
            budget_eur: plan.budget_eur(),
            version: plan.version(),
            updated_at: plan.updated_at(),
        }
    }
}

impl From<&TravelPlan> for PlanDetail {
    fn from(plan: &TravelPlan) -> Self {
        Self {
            id: plan.id(),
            title: plan.title().to_string(),
            budget_eur: plan.budget_eur(),
            version: plan.version(),
            created_at: plan.created_at(),
            updated_at: plan.updated_at(),
            locations: plan.locations().iter().map(LocationItem::from).collect(),
        }
    }
}

impl From<&Location> for LocationItem {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id(),
            name: location.name().to_string(),
            order: location.order(),
            budget_eur: location.budget_eur(),
            notes: location.notes().map(str::to_string),
            version: location.version(),
        }
    }
}
