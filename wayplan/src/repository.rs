//! Repository contracts for travel plans and their locations.
//!
//! [`Database`](crate::Database) implements both traits. Every call runs in
//! its own transaction: writes take the store's write lock for their whole
//! duration and either fully apply or leave no trace.

use crate::error::Result;
use crate::{
    Location, LocationId, LocationUpdate, NewLocation, PlanId, PlanSummary, Title, TravelPlan,
    Version,
};

/// Persistence operations on travel plans.
pub trait TravelPlanRepository {
    /// Lists plans, most recently updated first, ties broken by id.
    ///
    /// `page` is one-based. A page past the end is empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`](crate::Error::Validation) if `page` or
    /// `page_size` is zero, or a storage error.
    fn list_plans(&self, page: u32, page_size: u32) -> Result<Vec<PlanSummary>>;

    /// Fetches one plan, optionally with its locations in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the plan does
    /// not exist.
    fn get_plan(&self, id: PlanId, include_locations: bool) -> Result<TravelPlan>;

    /// Persists a new plan at version 1 and returns its id.
    ///
    /// Locations carried by `plan` are stored with it, renumbered densely in
    /// their current order.
    ///
    /// # Errors
    ///
    /// Returns a storage error, including a constraint failure when the id
    /// is already taken.
    fn create_plan(&mut self, plan: &TravelPlan) -> Result<PlanId>;

    /// Replaces title and budget if the stored version equals
    /// `expected_version`, returning the new version.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the plan does
    /// not exist and [`Error::VersionConflict`](crate::Error::VersionConflict)
    /// if its version moved on.
    fn update_plan(
        &mut self,
        id: PlanId,
        title: &Title,
        budget_eur: u32,
        expected_version: Version,
    ) -> Result<Version>;

    /// Deletes a plan and all of its locations.
    ///
    /// Returns `false` if the plan did not exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error or [`Error::Cancelled`](crate::Error::Cancelled).
    fn delete_plan(&mut self, id: PlanId) -> Result<bool>;
}

/// Persistence operations on the locations of a plan.
pub trait LocationRepository {
    /// Lists a plan's locations by order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the plan does
    /// not exist.
    fn list_locations(&self, plan_id: PlanId) -> Result<Vec<Location>>;

    /// Fetches one location of a plan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the location
    /// does not exist or belongs to another plan.
    fn get_location(&self, plan_id: PlanId, location_id: LocationId) -> Result<Location>;

    /// Appends a location to the end of a plan.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the plan does
    /// not exist.
    fn add_location(&mut self, plan_id: PlanId, location: &NewLocation) -> Result<LocationId>;

    /// Applies a version-checked update, moving the location when
    /// `update.new_order` is set. Returns the new version.
    ///
    /// A target order past the end moves the location to the last position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the location
    /// does not exist in the plan and
    /// [`Error::VersionConflict`](crate::Error::VersionConflict) if its
    /// version moved on.
    fn update_location(
        &mut self,
        plan_id: PlanId,
        location_id: LocationId,
        update: &LocationUpdate,
    ) -> Result<Version>;

    /// Removes a location and closes the gap in the plan's order.
    ///
    /// Returns `false` if the location did not exist in the plan.
    ///
    /// # Errors
    ///
    /// Returns a storage error or [`Error::Cancelled`](crate::Error::Cancelled).
    fn delete_location(&mut self, plan_id: PlanId, location_id: LocationId) -> Result<bool>;
}
