//! # Repair Subcommand
//!
//! Runs the activated-suspended-punishment repair over the store file and
//! prints the report as JSON. The store is only written back when the run
//! was not a dry run.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use adj_lifecycle::ActivatedSuspendedRepair;

use crate::store::{open_context, save_store};

/// Arguments for the `adjudications repair-activations` subcommand.
#[derive(Args, Debug)]
pub struct RepairArgs {
    /// Report what would change without saving.
    #[arg(long)]
    pub dry_run: bool,
}

pub fn run_repair(args: &RepairArgs, store: &Path, config: Option<&Path>) -> Result<u8> {
    let (ctx, repository) = open_context(store, config, None)?;
    // The flag can only switch a dry run on, never off.
    let dry_run = args.dry_run || ctx.config().repair_dry_run;
    let job = ActivatedSuspendedRepair::new(ctx.store().clone(), dry_run);
    let report = job.run().context("activation repair failed")?;

    if !report.dry_run {
        save_store(store, &repository)?;
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    println!(
        "OK: {} repaired, {} already applied, {} unmatched, {} failed{}",
        report.repaired.len(),
        report.already_applied,
        report.unmatched,
        report.failed,
        if report.dry_run { " (dry run)" } else { "" }
    );
    Ok(if report.failed > 0 { 2 } else { 0 })
}
