//! Plan command implementation.
//!
//! Every write takes the version the caller last saw; a stale version exits
//! with code 1 and changes nothing.

use crate::error::CliError;
use crate::utils::{
    format_timestamp, load_configuration, open_database, print_json, GlobalOptions, OutputFormat,
};
use clap::{Args, Subcommand};
use std::io::Write;
use wayplan::{
    PlanDetail, PlanId, PlanSummary, Title, TravelPlan, TravelPlanRepository, Version,
};

/// Manage travel plans.
#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub action: PlanAction,
}

/// Plan subcommands.
#[derive(Subcommand)]
pub enum PlanAction {
    /// List plans, most recently updated first
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Plans per page (defaults to the configured page size)
        #[arg(long)]
        page_size: Option<u32>,

        /// Output format
        #[arg(long, value_enum, default_value = "table", ignore_case = true)]
        format: OutputFormat,
    },

    /// Show one plan
    Show {
        /// Plan id
        id: String,

        /// Include the plan's locations
        #[arg(long)]
        with_locations: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "table", ignore_case = true)]
        format: OutputFormat,
    },

    /// Create a plan and print its id
    Create {
        /// Plan title
        #[arg(long)]
        title: String,

        /// Budget in euros
        #[arg(long)]
        budget: u32,
    },

    /// Update a plan and print its new version
    Update {
        /// Plan id
        id: String,

        /// New title
        #[arg(long)]
        title: String,

        /// New budget in euros
        #[arg(long)]
        budget: u32,

        /// The version last read
        #[arg(long)]
        expected_version: u32,
    },

    /// Delete a plan and all of its locations
    Delete {
        /// Plan id
        id: String,
    },
}

impl PlanCommand {
    /// Execute the plan command.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let mut db = open_database(global, &config)?;

        match self.action {
            PlanAction::List {
                page,
                page_size,
                format,
            } => {
                let page_size = page_size.unwrap_or_else(|| config.default_page_size());
                let plans = db.list_plans(page, page_size)?;
                match format {
                    OutputFormat::Table => print_summaries(&plans)?,
                    OutputFormat::Json => print_json(&plans)?,
                }
            }
            PlanAction::Show {
                id,
                with_locations,
                format,
            } => {
                let plan = db.get_plan(id.parse()?, with_locations)?;
                let detail = PlanDetail::from(&plan);
                match format {
                    OutputFormat::Table => print_detail(&detail, with_locations)?,
                    OutputFormat::Json => print_json(&detail)?,
                }
            }
            PlanAction::Create { title, budget } => {
                let plan = TravelPlan::new(Title::new(title)?, budget);
                let id = db.create_plan(&plan)?;
                println!("{id}");
            }
            PlanAction::Update {
                id,
                title,
                budget,
                expected_version,
            } => {
                let id: PlanId = id.parse()?;
                let expected = Version::try_from(expected_version).map_err(wayplan::Error::from)?;
                let version = db.update_plan(id, &Title::new(title)?, budget, expected)?;
                println!("{version}");
            }
            PlanAction::Delete { id } => {
                let id: PlanId = id.parse()?;
                if !db.delete_plan(id)? {
                    return Err(wayplan::Error::NotFound {
                        resource: format!("travel plan {id}"),
                    }
                    .into());
                }
                log::info!("deleted plan {id}");
            }
        }

        Ok(())
    }
}

fn print_summaries(plans: &[PlanSummary]) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "ID\tTITLE\tBUDGET_EUR\tVERSION\tUPDATED_AT")?;
    for plan in plans {
        writeln!(
            handle,
            "{}\t{}\t{}\t{}\t{}",
            plan.id,
            plan.title,
            plan.budget_eur,
            plan.version,
            format_timestamp(plan.updated_at)
        )?;
    }
    Ok(())
}

fn print_detail(detail: &PlanDetail, with_locations: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();

    writeln!(handle, "id:         {}", detail.id)?;
    writeln!(handle, "title:      {}", detail.title)?;
    writeln!(handle, "budget_eur: {}", detail.budget_eur)?;
    writeln!(handle, "version:    {}", detail.version)?;
    writeln!(handle, "created_at: {}", format_timestamp(detail.created_at))?;
    writeln!(handle, "updated_at: {}", format_timestamp(detail.updated_at))?;

    if with_locations {
        writeln!(handle)?;
        writeln!(handle, "ORDER\tID\tNAME\tBUDGET_EUR\tVERSION\tNOTES")?;
        for location in &detail.locations {
            writeln!(
                handle,
                "{}\t{}\t{}\t{}\t{}\t{}",
                location.order,
                location.id,
                location.name,
                location.budget_eur,
                location.version,
                location.notes.as_deref().unwrap_or("")
            )?;
        }
    }
    Ok(())
}
