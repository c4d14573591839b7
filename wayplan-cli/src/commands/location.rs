//! Location command implementation.

use crate::error::CliError;
use crate::utils::{load_configuration, open_database, GlobalOptions};
use clap::{Args, Subcommand};
use wayplan::{
    LocationId, LocationRepository, LocationUpdate, NewLocation, PlanId, Version,
};

/// Manage the locations of a plan.
#[derive(Args)]
pub struct LocationCommand {
    #[command(subcommand)]
    pub action: LocationAction,
}

/// Location subcommands.
#[derive(Subcommand)]
pub enum LocationAction {
    /// Append a location to a plan and print its id
    Add {
        /// Plan id
        plan: String,

        /// Location name
        #[arg(long)]
        name: String,

        /// Budget in euros
        #[arg(long)]
        budget: u32,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// Update a location, optionally moving it, and print its new version
    Update {
        /// Plan id
        plan: String,

        /// Location id
        location: String,

        /// New name
        #[arg(long)]
        name: String,

        /// New budget in euros
        #[arg(long)]
        budget: u32,

        /// New notes; omitting clears them
        #[arg(long)]
        notes: Option<String>,

        /// The version last read
        #[arg(long)]
        expected_version: u32,

        /// Zero-based target position; past the end moves to the end
        #[arg(long)]
        order: Option<u32>,
    },

    /// Remove a location and close the gap it leaves
    Remove {
        /// Plan id
        plan: String,

        /// Location id
        location: String,
    },
}

impl LocationCommand {
    /// Execute the location command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let mut db = open_database(global, &config)?;

        match self.action {
            LocationAction::Add {
                plan,
                name,
                budget,
                notes,
            } => {
                let plan_id: PlanId = plan.parse()?;
                let id = db.add_location(plan_id, &NewLocation::new(name, budget, notes)?)?;
                println!("{id}");
            }
            LocationAction::Update {
                plan,
                location,
                name,
                budget,
                notes,
                expected_version,
                order,
            } => {
                let plan_id: PlanId = plan.parse()?;
                let location_id: LocationId = location.parse()?;
                let expected = Version::try_from(expected_version).map_err(wayplan::Error::from)?;
                let mut update = LocationUpdate::new(name, budget, notes, expected)?;
                if let Some(order) = order {
                    update = update.with_order(order);
                }
                let version = db.update_location(plan_id, location_id, &update)?;
                println!("{version}");
            }
            LocationAction::Remove { plan, location } => {
                let plan_id: PlanId = plan.parse()?;
                let location_id: LocationId = location.parse()?;
                if !db.delete_location(plan_id, location_id)? {
                    return Err(wayplan::Error::NotFound {
                        resource: format!("location {location_id}"),
                    }
                    .into());
                }
                log::info!("removed location {location_id} from plan {plan_id}");
            }
        }

        Ok(())
    }
}
