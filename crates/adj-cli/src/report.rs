//! # Report Subcommand
//!
//! Read-only queries over the store file. Every subcommand prints JSON to
//! stdout and never writes the store back.
//!
//! ## Subcommands
//!
//! - `charge`: the full aggregate for one charge.
//! - `punishments`: a charge's punishments plus the suspended punishments
//!   it activated on other charges.
//! - `suspended`: punishments a charge may activate.
//! - `active`: punishments in force for a prisoner.
//! - `additional-days`: punishments a new one may run consecutively to.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use serde::Serialize;

use adj_core::{ChargeNumber, PrisonerNumber};
use adj_lifecycle::model::PunishmentType;
use adj_lifecycle::{AdjudicationRepository, ReportingQueries};

use crate::store::open_context;

/// Arguments for the `adjudications report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Evaluate suspensions and windows as of this date (YYYY-MM-DD).
    #[arg(long)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: ReportCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Print one adjudication.
    Charge {
        #[arg(long)]
        charge: ChargeNumber,
    },

    /// Print a charge's punishments, including activated ones held elsewhere.
    Punishments {
        #[arg(long)]
        charge: ChargeNumber,
    },

    /// Suspended punishments on the prisoner's other charges.
    Suspended {
        #[arg(long)]
        prisoner: PrisonerNumber,
        /// The charge doing the activating; its own punishments are excluded.
        #[arg(long)]
        charge: ChargeNumber,
        /// Also list punishments whose suspension was lost in migration.
        #[arg(long)]
        include_corrupted: bool,
    },

    /// Punishments in force for the prisoner.
    Active {
        #[arg(long)]
        prisoner: PrisonerNumber,
    },

    /// Additional-days punishments heard the same day as the charge.
    AdditionalDays {
        #[arg(long)]
        charge: ChargeNumber,
        /// ADDITIONAL_DAYS or PROSPECTIVE_DAYS.
        #[arg(long = "type", value_parser = parse_punishment_type)]
        punishment_type: PunishmentType,
    },
}

pub fn parse_punishment_type(raw: &str) -> Result<PunishmentType> {
    serde_json::from_value(serde_json::Value::String(raw.trim().to_ascii_uppercase()))
        .map_err(|_| anyhow!("unknown punishment type: {raw}"))
}

pub fn run_report(args: &ReportArgs, store: &Path, config: Option<&Path>) -> Result<u8> {
    let (ctx, repository) = open_context(store, config, args.today)?;
    let queries = ReportingQueries::new(ctx);

    match &args.command {
        ReportCommand::Charge { charge } => {
            let adjudication = repository
                .find_by_charge_number(charge)?
                .with_context(|| format!("adjudication not found: {charge}"))?;
            print_json(&adjudication)
        }
        ReportCommand::Punishments { charge } => print_json(&queries.punishment_view(charge)?),
        ReportCommand::Suspended {
            prisoner,
            charge,
            include_corrupted,
        } => {
            let found = if *include_corrupted {
                queries.activatable(prisoner, charge)?
            } else {
                queries.suspended_punishments(prisoner, charge)?
            };
            print_json(&found)
        }
        ReportCommand::Active { prisoner } => print_json(&queries.active_punishments(prisoner)?),
        ReportCommand::AdditionalDays {
            charge,
            punishment_type,
        } => print_json(&queries.additional_days_for_consecutive(charge, *punishment_type)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<u8> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(0)
}
