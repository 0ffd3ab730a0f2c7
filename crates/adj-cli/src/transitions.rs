//! # Transitions Subcommand
//!
//! Inspect the status transition graph without touching any store.
//!
//! - `list`: every status with its allowed targets.
//! - `check`: whether a single move is legal, and if not, whether it is
//!   still reachable through intermediate states.

use anyhow::{anyhow, Result};
use clap::{Args, Subcommand};

use adj_state::transitions::{allowed_targets, is_allowed, is_reachable, is_referral, is_terminal};
use adj_state::AdjudicationStatus;

/// Arguments for the `adjudications transitions` subcommand.
#[derive(Args, Debug)]
pub struct TransitionsArgs {
    #[command(subcommand)]
    pub command: TransitionsCommand,
}

#[derive(Subcommand, Debug)]
pub enum TransitionsCommand {
    /// Print the allowed targets of every status, or of one.
    List {
        /// Only this status (e.g. "SCHEDULED").
        #[arg(long, value_parser = parse_status)]
        from: Option<AdjudicationStatus>,
    },

    /// Check a single move. Exits 2 when the move is not allowed.
    Check {
        #[arg(long, value_parser = parse_status)]
        from: AdjudicationStatus,
        #[arg(long, value_parser = parse_status)]
        to: AdjudicationStatus,
    },
}

pub fn parse_status(raw: &str) -> Result<AdjudicationStatus> {
    AdjudicationStatus::from_name(&raw.trim().to_ascii_uppercase())
        .ok_or_else(|| anyhow!("unknown status: {raw}"))
}

pub fn run_transitions(args: &TransitionsArgs) -> Result<u8> {
    match &args.command {
        TransitionsCommand::List { from } => {
            for line in list_lines(*from) {
                println!("{line}");
            }
            Ok(0)
        }
        TransitionsCommand::Check { from, to } => cmd_check(*from, *to),
    }
}

fn list_lines(only: Option<AdjudicationStatus>) -> Vec<String> {
    let statuses: Vec<AdjudicationStatus> = match only {
        Some(status) => vec![status],
        None => AdjudicationStatus::ALL.to_vec(),
    };
    statuses
        .into_iter()
        .map(|status| {
            let targets = allowed_targets(status);
            let mut tags = Vec::new();
            if is_terminal(status) {
                tags.push("terminal");
            }
            if is_referral(status) {
                tags.push("referral");
            }
            let tags = if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            };
            let targets = if targets.is_empty() {
                "-".to_string()
            } else {
                targets
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            format!("{status}{tags} -> {targets}")
        })
        .collect()
}

fn cmd_check(from: AdjudicationStatus, to: AdjudicationStatus) -> Result<u8> {
    if is_allowed(from, to) {
        println!("OK: {from} -> {to} is allowed");
        return Ok(0);
    }
    if is_reachable(from, to) {
        println!("NO: {from} -> {to} is not a direct move, but {to} is reachable from {from}");
    } else {
        println!("NO: {from} -> {to} is not allowed");
    }
    Ok(2)
}
