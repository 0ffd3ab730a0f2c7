//! # Activated Suspended Punishment Repair
//!
//! Older activations copied the suspended punishment into the activating
//! charge (the copy carries `activated_from_charge_number`) and left the
//! origin suspended. This job moves each such activation onto its origin:
//!
//! 1. Find the origin punishment: activated by this charge, same type and
//!    privilege type, still suspended. No looser match is attempted.
//! 2. Append the duplicate's latest schedule to the origin with the
//!    suspension cleared, and save the origin.
//! 3. Remove the duplicate from the activating charge and save it.
//!
//! An origin that already carries the duplicate's schedule window only has
//! the duplicate removed, so an interrupted run can be repeated. Duplicates
//! with no match are left alone. Failures on one record are logged and the
//! batch moves on.

use adj_core::ChargeNumber;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::context::LifecycleContext;
use crate::error::AdjudicationError;
use crate::model::{Punishment, PunishmentSchedule, PunishmentType, ReportedAdjudication};
use crate::repository::AggregateStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairedActivation {
    pub charge_number: ChargeNumber,
    pub origin_charge_number: ChargeNumber,
    pub punishment_type: PunishmentType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairReport {
    /// Duplicates looked at.
    pub examined: usize,
    pub repaired: Vec<RepairedActivation>,
    /// Origin already repaired by an earlier run; only the duplicate went.
    pub already_applied: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub dry_run: bool,
}

enum Resolution {
    Repaired,
    AlreadyApplied,
    Unmatched,
}

#[derive(Debug, Clone)]
pub struct ActivatedSuspendedRepair {
    store: AggregateStore,
    dry_run: bool,
}

impl ActivatedSuspendedRepair {
    pub fn new(store: AggregateStore, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    /// Repair job over the context's store, honouring its dry-run setting.
    pub fn from_context(ctx: &LifecycleContext) -> Self {
        Self::new(ctx.store().clone(), ctx.config().repair_dry_run)
    }

    pub fn run(&self) -> Result<RepairReport, AdjudicationError> {
        let candidates = self.store.repository().find_with_activated_from()?;
        let mut report = RepairReport {
            dry_run: self.dry_run,
            ..RepairReport::default()
        };
        info!(candidates = candidates.len(), dry_run = self.dry_run, "activation repair started");

        for candidate in candidates {
            let charge_number = candidate.charge_number;
            if let Err(err) = self.repair_charge(&charge_number, &mut report) {
                warn!(%charge_number, error = %err, "activation repair failed, skipping");
                report.failed += 1;
            }
        }

        info!(
            examined = report.examined,
            repaired = report.repaired.len(),
            already_applied = report.already_applied,
            unmatched = report.unmatched,
            failed = report.failed,
            "activation repair finished"
        );
        Ok(report)
    }

    fn repair_charge(
        &self,
        charge_number: &ChargeNumber,
        report: &mut RepairReport,
    ) -> Result<(), AdjudicationError> {
        let mut activator = self.store.load(charge_number)?;
        let duplicates: Vec<Punishment> = activator
            .punishments
            .iter()
            .filter(|p| p.activated_from_charge_number.is_some())
            .cloned()
            .collect();

        let mut resolved = Vec::new();
        for duplicate in duplicates {
            report.examined += 1;
            match self.resolve(&activator, &duplicate) {
                Ok(Resolution::Repaired) => {
                    report.repaired.push(RepairedActivation {
                        charge_number: charge_number.clone(),
                        origin_charge_number: duplicate
                            .activated_from_charge_number
                            .clone()
                            .unwrap_or_else(|| charge_number.clone()),
                        punishment_type: duplicate.punishment_type,
                    });
                    resolved.push(duplicate.id);
                }
                Ok(Resolution::AlreadyApplied) => {
                    report.already_applied += 1;
                    resolved.push(duplicate.id);
                }
                Ok(Resolution::Unmatched) => report.unmatched += 1,
                Err(err) => {
                    warn!(%charge_number, punishment_id = %duplicate.id, error = %err, "origin lookup failed, skipping");
                    report.failed += 1;
                }
            }
        }

        if resolved.is_empty() || self.dry_run {
            return Ok(());
        }
        activator.punishments.retain(|p| !resolved.contains(&p.id));
        self.store.save(activator)?;
        debug!(%charge_number, removed = resolved.len(), "duplicates removed");
        Ok(())
    }

    fn resolve(
        &self,
        activator: &ReportedAdjudication,
        duplicate: &Punishment,
    ) -> Result<Resolution, AdjudicationError> {
        let (Some(origin_charge), Some(schedule)) = (
            duplicate.activated_from_charge_number.as_ref(),
            duplicate.latest_schedule(),
        ) else {
            return Ok(Resolution::Unmatched);
        };
        let mut origin = self.store.load(origin_charge)?;
        let activated_here = |p: &Punishment| {
            p.activated_by_charge_number.as_ref() == Some(&activator.charge_number)
                && p.same_kind(duplicate)
        };

        let matched = origin
            .punishments
            .iter()
            .position(|p| activated_here(p) && p.is_suspended());
        if let Some(index) = matched {
            let target = &mut origin.punishments[index];
            target.schedule.push(PunishmentSchedule {
                suspended_until: None,
                ..schedule.clone()
            });
            debug!(
                charge_number = %activator.charge_number,
                origin = %origin_charge,
                punishment_id = %target.id,
                "origin activated"
            );
            if !self.dry_run {
                self.store.save(origin)?;
            }
            return Ok(Resolution::Repaired);
        }

        let already = origin.punishments.iter().any(|p| {
            activated_here(p) && p.latest_schedule().is_some_and(|s| s.same_window(schedule))
        });
        if already {
            return Ok(Resolution::AlreadyApplied);
        }
        debug!(
            charge_number = %activator.charge_number,
            origin = %origin_charge,
            punishment_type = %duplicate.punishment_type,
            "no matching origin punishment"
        );
        Ok(Resolution::Unmatched)
    }
}
