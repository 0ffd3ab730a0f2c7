//! # Punishments
//!
//! Punishments are given on a proved charge. Each one carries a schedule
//! history whose last entry is current.
//!
//! ## Activation
//!
//! A suspended punishment on another of the prisoner's charges can be
//! activated by this charge. The origin punishment is changed in place: its
//! suspension is ended by appending an active schedule entry, and
//! `activated_by_charge_number` records this charge. Nothing is copied into
//! the activating charge. Older records instead hold a duplicate with
//! `activated_from_charge_number`; see [`crate::repair`].
//!
//! Only punishments listed by [`ReportingQueries::activatable`] can be
//! activated.

use std::collections::BTreeMap;

use adj_core::{ChargeNumber, CommentId, PunishmentId, Timestamp};
use adj_state::AdjudicationStatus;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::context::{ActionResult, LifecycleContext};
use crate::error::AdjudicationError;
use crate::events::LifecycleOperation;
use crate::model::punishment::is_additional_days;
use crate::model::{
    PrivilegeType, Punishment, PunishmentComment, PunishmentSchedule, PunishmentType,
    ReportedAdjudication,
};
use crate::reporting::ReportingQueries;

/// Names a punishment on another charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRef {
    pub charge_number: ChargeNumber,
    pub punishment_id: PunishmentId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PunishmentRequest {
    /// Set when amending an existing punishment.
    pub id: Option<PunishmentId>,
    pub punishment_type: PunishmentType,
    pub privilege_type: Option<PrivilegeType>,
    pub other_privilege: Option<String>,
    pub stoppage_percentage: Option<u32>,
    pub amount: Option<f64>,
    pub days: u32,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub suspended_until: Option<NaiveDate>,
    pub consecutive_to_charge_number: Option<ChargeNumber>,
    pub activated_from: Option<ActivationRef>,
}

impl PunishmentRequest {
    pub fn new(punishment_type: PunishmentType) -> Self {
        Self {
            id: None,
            punishment_type,
            privilege_type: None,
            other_privilege: None,
            stoppage_percentage: None,
            amount: None,
            days: 0,
            start_date: None,
            end_date: None,
            suspended_until: None,
            consecutive_to_charge_number: None,
            activated_from: None,
        }
    }

    fn schedule(&self) -> PunishmentSchedule {
        PunishmentSchedule {
            days: self.days,
            start_date: self.start_date,
            end_date: self.end_date,
            suspended_until: self.suspended_until,
        }
    }

    fn build(&self) -> Punishment {
        Punishment {
            id: self.id.unwrap_or_default(),
            punishment_type: self.punishment_type,
            privilege_type: self.privilege_type,
            other_privilege: self.other_privilege.clone(),
            stoppage_percentage: self.stoppage_percentage,
            amount: self.amount,
            schedule: vec![self.schedule()],
            consecutive_to_charge_number: self.consecutive_to_charge_number.clone(),
            activated_from_charge_number: None,
            activated_by_charge_number: None,
        }
    }

    fn amend(&self, punishment: &mut Punishment) {
        punishment.punishment_type = self.punishment_type;
        punishment.privilege_type = self.privilege_type;
        punishment.other_privilege = self.other_privilege.clone();
        punishment.stoppage_percentage = self.stoppage_percentage;
        punishment.amount = self.amount;
        punishment.consecutive_to_charge_number = self.consecutive_to_charge_number.clone();
        let schedule = self.schedule();
        if punishment.latest_schedule() != Some(&schedule) {
            punishment.schedule.push(schedule);
        }
    }
}

/// Check a single punishment request given on `charge_number`.
pub fn validate_request(
    charge_number: &ChargeNumber,
    request: &PunishmentRequest,
) -> Result<(), AdjudicationError> {
    let kind = request.punishment_type;
    match kind {
        PunishmentType::Privilege => match request.privilege_type {
            None => return Err(AdjudicationError::validation("PRIVILEGE requires a privilege type")),
            Some(PrivilegeType::Other)
                if request.other_privilege.as_deref().map_or(true, |s| s.trim().is_empty()) =>
            {
                return Err(AdjudicationError::validation(
                    "PRIVILEGE of type OTHER requires a description",
                ))
            }
            Some(_) => {}
        },
        PunishmentType::Earnings => match request.stoppage_percentage {
            None => return Err(AdjudicationError::validation("EARNINGS requires a stoppage percentage")),
            Some(p) if p > 100 => {
                return Err(AdjudicationError::validation(format!(
                    "stoppage percentage {p} exceeds 100"
                )))
            }
            Some(_) => {}
        },
        PunishmentType::DamagesOwed if request.amount.is_none() => {
            return Err(AdjudicationError::validation("DAMAGES_OWED requires an amount"));
        }
        _ => {}
    }

    let active = request.start_date.is_some() || request.end_date.is_some();
    let suspended = request.suspended_until.is_some();
    if suspended && active {
        return Err(AdjudicationError::validation(
            "a punishment cannot be both suspended and active",
        ));
    }
    if !is_additional_days(kind) {
        let dated = request.start_date.is_some() && request.end_date.is_some();
        if !suspended && !dated {
            return Err(AdjudicationError::validation(format!(
                "{kind} requires a suspension date or start and end dates"
            )));
        }
    }
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if start > end {
            return Err(AdjudicationError::validation("start date is after end date"));
        }
    }

    if let Some(consecutive) = &request.consecutive_to_charge_number {
        if !is_additional_days(kind) {
            return Err(AdjudicationError::validation(format!(
                "{kind} cannot run consecutively"
            )));
        }
        if consecutive == charge_number {
            return Err(AdjudicationError::validation(
                "a punishment cannot run consecutively to its own charge",
            ));
        }
    }

    if let Some(origin) = &request.activated_from {
        if &origin.charge_number == charge_number {
            return Err(AdjudicationError::validation(
                "a charge cannot activate its own punishment",
            ));
        }
        if suspended || request.start_date.is_none() || request.end_date.is_none() {
            return Err(AdjudicationError::validation(
                "an activated punishment needs start and end dates and no suspension",
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PunishmentLifecycleManager {
    ctx: LifecycleContext,
}

impl PunishmentLifecycleManager {
    pub fn new(ctx: LifecycleContext) -> Self {
        Self { ctx }
    }

    /// Add punishments to a proved charge, activating any that name a
    /// suspended punishment on another charge.
    pub fn create(
        &self,
        charge_number: &ChargeNumber,
        requests: Vec<PunishmentRequest>,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        require_proved(&adj)?;
        for request in &requests {
            validate_request(charge_number, request)?;
        }

        let mut origins = Origins::new(&self.ctx, &adj)?;
        for request in &requests {
            match &request.activated_from {
                Some(origin) => origins.activate(charge_number, origin, request)?,
                None => adj.punishments.push(request.build()),
            }
        }

        info!(%charge_number, count = requests.len(), activated = origins.len(), "punishments created");
        self.ctx.commit(
            adj,
            origins.into_changed(),
            LifecycleOperation::CreatePunishments,
            false,
            false,
        )
    }

    /// Replace the charge's punishments with `requests`.
    ///
    /// Requests with an id amend that punishment (pushing a new schedule
    /// entry when the schedule changed). Requests without one are added.
    /// Punishments not named are removed, and activations not named any more
    /// are undone on their origin charge.
    pub fn update(
        &self,
        charge_number: &ChargeNumber,
        requests: Vec<PunishmentRequest>,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        require_proved(&adj)?;
        for request in &requests {
            validate_request(charge_number, request)?;
        }

        let mut origins = Origins::new(&self.ctx, &adj)?;
        let mut kept = Vec::with_capacity(requests.len());
        let mut named_activations = Vec::new();
        for request in &requests {
            if let Some(origin) = &request.activated_from {
                if origins.is_activated_by(charge_number, origin) {
                    origins.reschedule(origin, request)?;
                } else {
                    origins.activate(charge_number, origin, request)?;
                }
                named_activations.push(origin.clone());
                continue;
            }
            match request.id {
                Some(id) => {
                    let mut existing = adj
                        .punishments
                        .iter()
                        .find(|p| p.id == id)
                        .cloned()
                        .ok_or_else(|| AdjudicationError::not_found(format!("punishment {id}")))?;
                    request.amend(&mut existing);
                    kept.push(existing);
                }
                None => kept.push(request.build()),
            }
        }

        let legacy_origins: Vec<ChargeNumber> = kept
            .iter()
            .filter_map(|p| p.activated_from_charge_number.clone())
            .collect();
        let reverted = origins.revert_unnamed(charge_number, &named_activations, &legacy_origins);
        let removed = adj
            .punishments
            .iter()
            .filter(|p| !kept.iter().any(|k| k.id == p.id))
            .count();
        adj.punishments = kept;

        info!(%charge_number, reverted, removed, "punishments updated");
        self.ctx.commit(
            adj,
            origins.into_changed(),
            LifecycleOperation::UpdatePunishments,
            false,
            false,
        )
    }

    pub fn create_comment(
        &self,
        charge_number: &ChargeNumber,
        reporter: &str,
        comment: &str,
    ) -> Result<ActionResult, AdjudicationError> {
        let text = non_empty(comment)?;
        let mut adj = self.ctx.load(charge_number)?;
        let id = CommentId::new();
        adj.punishment_comments.push(PunishmentComment {
            id,
            comment: text,
            reporter: reporter.to_string(),
            created_at: Timestamp::now(),
        });

        info!(%charge_number, comment_id = %id, "punishment comment created");
        self.ctx.commit(
            adj,
            Vec::new(),
            LifecycleOperation::CreatePunishmentComment,
            false,
            false,
        )
    }

    pub fn update_comment(
        &self,
        charge_number: &ChargeNumber,
        comment_id: CommentId,
        reporter: &str,
        comment: &str,
    ) -> Result<ActionResult, AdjudicationError> {
        let text = non_empty(comment)?;
        let mut adj = self.ctx.load(charge_number)?;
        let index = owned_comment(&adj, comment_id, reporter)?;
        adj.punishment_comments[index].comment = text;

        info!(%charge_number, %comment_id, "punishment comment updated");
        self.ctx.commit(
            adj,
            Vec::new(),
            LifecycleOperation::UpdatePunishmentComment,
            false,
            false,
        )
    }

    pub fn delete_comment(
        &self,
        charge_number: &ChargeNumber,
        comment_id: CommentId,
        reporter: &str,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let index = owned_comment(&adj, comment_id, reporter)?;
        adj.punishment_comments.remove(index);

        info!(%charge_number, %comment_id, "punishment comment deleted");
        self.ctx.commit(
            adj,
            Vec::new(),
            LifecycleOperation::DeletePunishmentComment,
            false,
            false,
        )
    }
}

/// Remove every punishment from `adj` and undo the activations it made.
///
/// Returns whether anything was removed and the origin charges that changed.
pub(crate) fn remove_all_punishments(
    ctx: &LifecycleContext,
    adj: &mut ReportedAdjudication,
) -> Result<(bool, Vec<ReportedAdjudication>), AdjudicationError> {
    let mut origins = Origins::new(ctx, adj)?;
    let reverted = origins.revert_unnamed(&adj.charge_number, &[], &[]);
    let removed = !adj.punishments.is_empty() || reverted > 0;
    adj.punishments.clear();
    debug!(charge_number = %adj.charge_number, reverted, removed, "punishments removed");
    Ok((removed, origins.into_changed()))
}

/// Undo an activation of `origin`'s punishments by `activator`, limited to
/// `punishment_id` when given. Returns whether anything changed.
///
/// Every active schedule entry appended after the last suspended or undated
/// entry is dropped, so rescheduled activations unwind completely.
pub fn revert_activation(
    origin: &mut ReportedAdjudication,
    activator: &ChargeNumber,
    punishment_id: Option<PunishmentId>,
) -> bool {
    let mut changed = false;
    for punishment in origin.punishments.iter_mut().filter(|p| {
        p.activated_by_charge_number.as_ref() == Some(activator)
            && punishment_id.map_or(true, |id| p.id == id)
    }) {
        punishment.activated_by_charge_number = None;
        if let Some(keep) = punishment
            .schedule
            .iter()
            .rposition(|s| s.is_suspended() || s.has_no_dates())
        {
            punishment.schedule.truncate(keep + 1);
        }
        changed = true;
    }
    changed
}

fn require_proved(adj: &ReportedAdjudication) -> Result<(), AdjudicationError> {
    if adj.status() != AdjudicationStatus::ChargeProved {
        return Err(AdjudicationError::validation(format!(
            "punishments need a proved charge, {} is {}",
            adj.charge_number,
            adj.status()
        )));
    }
    Ok(())
}

fn non_empty(comment: &str) -> Result<String, AdjudicationError> {
    let trimmed = comment.trim();
    if trimmed.is_empty() {
        return Err(AdjudicationError::validation("comment is empty"));
    }
    Ok(trimmed.to_string())
}

fn owned_comment(
    adj: &ReportedAdjudication,
    comment_id: CommentId,
    reporter: &str,
) -> Result<usize, AdjudicationError> {
    let index = adj
        .punishment_comments
        .iter()
        .position(|c| c.id == comment_id)
        .ok_or_else(|| AdjudicationError::not_found(format!("punishment comment {comment_id}")))?;
    if adj.punishment_comments[index].reporter != reporter {
        return Err(AdjudicationError::Forbidden(format!(
            "punishment comment {comment_id} belongs to another reporter"
        )));
    }
    Ok(index)
}

/// Working copies of the prisoner's other charges touched by an operation.
struct Origins {
    queries: ReportingQueries,
    prisoner: adj_core::PrisonerNumber,
    loaded: BTreeMap<ChargeNumber, ReportedAdjudication>,
    changed: Vec<ChargeNumber>,
}

impl Origins {
    fn new(ctx: &LifecycleContext, adj: &ReportedAdjudication) -> Result<Self, AdjudicationError> {
        let loaded = ctx
            .store()
            .repository()
            .find_by_prisoner(&adj.prisoner_number)?
            .into_iter()
            .filter(|other| other.charge_number != adj.charge_number)
            .map(|other| (other.charge_number.clone(), other))
            .collect();
        Ok(Self {
            queries: ReportingQueries::new(ctx.clone()),
            prisoner: adj.prisoner_number.clone(),
            loaded,
            changed: Vec::new(),
        })
    }

    fn len(&self) -> usize {
        self.changed.len()
    }

    fn punishment_mut(&mut self, origin: &ActivationRef) -> Result<&mut Punishment, AdjudicationError> {
        self.loaded
            .get_mut(&origin.charge_number)
            .and_then(|adj| adj.punishments.iter_mut().find(|p| p.id == origin.punishment_id))
            .ok_or_else(|| {
                AdjudicationError::not_found(format!(
                    "punishment {} on {}",
                    origin.punishment_id, origin.charge_number
                ))
            })
    }

    fn is_activated_by(&self, activator: &ChargeNumber, origin: &ActivationRef) -> bool {
        self.loaded
            .get(&origin.charge_number)
            .and_then(|adj| adj.punishments.iter().find(|p| p.id == origin.punishment_id))
            .is_some_and(|p| p.activated_by_charge_number.as_ref() == Some(activator))
    }

    fn mark(&mut self, charge_number: &ChargeNumber) {
        if !self.changed.contains(charge_number) {
            self.changed.push(charge_number.clone());
        }
    }

    fn activate(
        &mut self,
        activator: &ChargeNumber,
        origin: &ActivationRef,
        request: &PunishmentRequest,
    ) -> Result<(), AdjudicationError> {
        let eligible = self
            .queries
            .activatable(&self.prisoner, activator)?
            .iter()
            .any(|c| c.charge_number == origin.charge_number && c.punishment.id == origin.punishment_id);
        let punishment = self.punishment_mut(origin)?;
        if !eligible || punishment.activated_by_charge_number.is_some() {
            return Err(AdjudicationError::validation(format!(
                "punishment {} on {} is not available for activation",
                origin.punishment_id, origin.charge_number
            )));
        }
        if punishment.punishment_type != request.punishment_type
            || punishment.privilege_type != request.privilege_type
        {
            return Err(AdjudicationError::validation(format!(
                "punishment {} on {} is a {}, not a {}",
                origin.punishment_id,
                origin.charge_number,
                punishment.punishment_type,
                request.punishment_type
            )));
        }
        punishment.activated_by_charge_number = Some(activator.clone());
        punishment.schedule.push(request.schedule());
        debug!(%activator, origin = %origin.charge_number, punishment_id = %origin.punishment_id, "activated");
        self.mark(&origin.charge_number);
        Ok(())
    }

    fn reschedule(
        &mut self,
        origin: &ActivationRef,
        request: &PunishmentRequest,
    ) -> Result<(), AdjudicationError> {
        let schedule = request.schedule();
        let punishment = self.punishment_mut(origin)?;
        if punishment.latest_schedule() == Some(&schedule) {
            return Ok(());
        }
        punishment.schedule.push(schedule);
        self.mark(&origin.charge_number);
        Ok(())
    }

    /// Revert activations by `activator` that are neither named in
    /// `named` nor backed by a kept duplicate from one of `legacy_origins`.
    fn revert_unnamed(
        &mut self,
        activator: &ChargeNumber,
        named: &[ActivationRef],
        legacy_origins: &[ChargeNumber],
    ) -> usize {
        let mut reverted = 0;
        let mut touched = Vec::new();
        for (charge_number, origin) in self.loaded.iter_mut() {
            if legacy_origins.contains(charge_number) {
                continue;
            }
            let stale: Vec<PunishmentId> = origin
                .punishments
                .iter()
                .filter(|p| p.activated_by_charge_number.as_ref() == Some(activator))
                .filter(|p| {
                    !named
                        .iter()
                        .any(|n| &n.charge_number == charge_number && n.punishment_id == p.id)
                })
                .map(|p| p.id)
                .collect();
            for id in stale {
                if revert_activation(origin, activator, Some(id)) {
                    reverted += 1;
                    touched.push(charge_number.clone());
                }
            }
        }
        for charge_number in &touched {
            self.mark(charge_number);
        }
        reverted
    }

    fn into_changed(mut self) -> Vec<ReportedAdjudication> {
        self.changed
            .iter()
            .filter_map(|c| self.loaded.remove(c))
            .collect()
    }
}
