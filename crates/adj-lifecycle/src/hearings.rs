//! # Hearing Lifecycle
//!
//! Hearings, referrals and adjournments. Outcome operations act on the
//! latest hearing (the one with the greatest date-time) unless a hearing id
//! is given.
//!
//! Removing a referral depends on how far the referral got. The decision is
//! an explicit table, see [`ReferralRemoval::decide`].

use adj_core::{ChargeNumber, HearingId};
use adj_state::{apply, transitions, AdjudicationStatus, StatusChange};
use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::context::{ActionResult, LifecycleContext};
use crate::error::AdjudicationError;
use crate::events::LifecycleOperation;
use crate::model::hearing::hearing_type_permitted;
use crate::model::outcome::{is_referral_code, referral_hearing_code, REFERRAL_CODES};
use crate::model::{
    AdjournReason, Hearing, HearingOutcome, HearingOutcomeCode, OicHearingType, Outcome,
    OutcomeCode, Plea, ReferGovReason, ReportedAdjudication,
};
use crate::recompute::settle_status;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HearingRequest {
    pub location_id: i64,
    pub date_time_of_hearing: NaiveDateTime,
    pub oic_hearing_type: OicHearingType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralRequest {
    pub code: HearingOutcomeCode,
    pub adjudicator: String,
    pub details: Option<String>,
    pub refer_gov_reason: Option<ReferGovReason>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjournRequest {
    pub adjudicator: String,
    pub reason: AdjournReason,
    pub plea: Plea,
    pub details: Option<String>,
}

/// What removing a referral takes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferralRemoval {
    /// Still under referral: remove the referral and its hearing outcome.
    ReferralOutcome,
    /// A hearing was scheduled from the referral: remove that decision and
    /// the hearing it produced.
    HearingReferral,
    /// Remove the decision taken on the referral.
    Referral,
}

impl ReferralRemoval {
    pub fn decide(has_subsequent_hearing_outcome: bool, status: AdjudicationStatus) -> Self {
        match (has_subsequent_hearing_outcome, transitions::is_referral(status)) {
            (_, true) => Self::ReferralOutcome,
            (true, false) => Self::HearingReferral,
            (false, false) => Self::Referral,
        }
    }
}

/// Creates, amends and deletes hearings and their referral/adjourn outcomes.
#[derive(Debug, Clone)]
pub struct HearingLifecycleManager {
    ctx: LifecycleContext,
}

impl HearingLifecycleManager {
    pub fn new(ctx: LifecycleContext) -> Self {
        Self { ctx }
    }

    /// Schedule a new hearing. The previous hearing must have an outcome.
    pub fn create_hearing(
        &self,
        charge_number: &ChargeNumber,
        request: HearingRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        check_hearing_type(&adj, request.oic_hearing_type)?;
        if let Some(latest) = adj.latest_hearing() {
            if latest.hearing_outcome.is_none() {
                return Err(AdjudicationError::conflict(format!(
                    "hearing {} on {charge_number} has no outcome yet",
                    latest.id
                )));
            }
            if request.date_time_of_hearing <= latest.date_time_of_hearing {
                return Err(AdjudicationError::validation(
                    "a new hearing must be later than the latest hearing",
                ));
            }
        }

        let hearing = Hearing {
            id: HearingId::new(),
            location_id: request.location_id,
            date_time_of_hearing: request.date_time_of_hearing,
            oic_hearing_type: request.oic_hearing_type,
            agency_id: adj.agency().clone(),
            hearing_outcome: None,
        };
        let hearing_id = hearing.id;
        adj.hearings.push(hearing);
        if adj.status() != AdjudicationStatus::Scheduled {
            apply(&mut adj, AdjudicationStatus::Scheduled, StatusChange::default())?;
        }

        info!(%charge_number, %hearing_id, "hearing created");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::CreateHearing, true, false)
    }

    /// Change the location, time or type of a hearing (latest when `hearing_id` is `None`).
    pub fn amend_hearing(
        &self,
        charge_number: &ChargeNumber,
        hearing_id: Option<HearingId>,
        request: HearingRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        check_hearing_type(&adj, request.oic_hearing_type)?;
        let index = find_hearing(&adj, hearing_id)?;
        let current = adj.hearings[index].date_time_of_hearing;
        let reorders = adj.hearings.iter().enumerate().any(|(i, other)| {
            i != index
                && (other.date_time_of_hearing == request.date_time_of_hearing
                    || (other.date_time_of_hearing < current)
                        != (other.date_time_of_hearing < request.date_time_of_hearing))
        });
        if reorders {
            return Err(AdjudicationError::validation(
                "an amended hearing must stay between the hearings before and after it",
            ));
        }
        let hearing = &mut adj.hearings[index];
        hearing.location_id = request.location_id;
        hearing.date_time_of_hearing = request.date_time_of_hearing;
        hearing.oic_hearing_type = request.oic_hearing_type;

        info!(%charge_number, hearing_id = %adj.hearings[index].id, "hearing amended");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::AmendHearing, true, false)
    }

    /// Delete a hearing that has no outcome (latest when `hearing_id` is `None`).
    pub fn delete_hearing(
        &self,
        charge_number: &ChargeNumber,
        hearing_id: Option<HearingId>,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let index = find_hearing(&adj, hearing_id)?;
        if let Some(outcome) = &adj.hearings[index].hearing_outcome {
            return Err(AdjudicationError::conflict(format!(
                "hearing {} has outcome {} and cannot be deleted",
                adj.hearings[index].id, outcome.code
            )));
        }
        let removed = adj.hearings.remove(index);
        settle_status(&mut adj, StatusChange::default())?;

        info!(%charge_number, hearing_id = %removed.id, status = %adj.status(), "hearing deleted");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::DeleteHearing, true, false)
    }

    /// Refer the charge from its latest hearing.
    ///
    /// A non-referral code is rejected before the aggregate is loaded.
    pub fn create_referral(
        &self,
        charge_number: &ChargeNumber,
        request: ReferralRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        validate_referral(&request)?;
        let mut adj = self.ctx.load(charge_number)?;
        attach_referral(&mut adj, &request)?;

        info!(%charge_number, code = %request.code, "referral created");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::CreateReferral, true, false)
    }

    /// Remove the most recent referral, or the part of it that has progressed.
    pub fn remove_referral(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let referral_index = adj
            .outcomes
            .iter()
            .rposition(|o| is_referral_code(o.code))
            .ok_or_else(|| AdjudicationError::not_found(format!("referral on {charge_number}")))?;
        let referral = adj.outcomes[referral_index].clone();

        let referral_hearing = referral_hearing_code(referral.code).and_then(|code| {
            adj.hearings
                .iter()
                .enumerate()
                .filter(|(_, h)| h.has_outcome(code))
                .max_by_key(|(_, h)| h.date_time_of_hearing)
                .map(|(i, h)| (i, h.date_time_of_hearing))
        });
        // Without a referral hearing, only hearings after the one that was
        // latest when the referral was recorded belong to it.
        let anchor = referral_hearing
            .map(|(_, at)| at)
            .or(referral.after_hearing_at);
        let later_hearings: Vec<HearingId> = adj
            .hearings
            .iter()
            .filter(|h| anchor.map_or(true, |at| h.date_time_of_hearing > at))
            .map(|h| h.id)
            .collect();
        let decision = referral
            .superseded_by
            .and_then(|id| adj.outcomes.iter().find(|o| o.id == id))
            .cloned();
        let has_subsequent_hearing_outcome = decision
            .as_ref()
            .is_some_and(|d| d.code == OutcomeCode::ScheduleHearing)
            && !later_hearings.is_empty();

        let removal = ReferralRemoval::decide(has_subsequent_hearing_outcome, adj.status());
        debug!(%charge_number, ?removal, has_subsequent_hearing_outcome, "removing referral");

        match removal {
            ReferralRemoval::ReferralOutcome => {
                adj.outcomes.remove(referral_index);
                if let Some((index, _)) = referral_hearing {
                    adj.hearings[index].hearing_outcome = None;
                }
            }
            ReferralRemoval::HearingReferral => {
                if let Some(actioned) = adj
                    .hearings
                    .iter()
                    .find(|h| later_hearings.contains(&h.id) && h.hearing_outcome.is_some())
                {
                    return Err(AdjudicationError::conflict(format!(
                        "hearing {} scheduled from the referral already has an outcome",
                        actioned.id
                    )));
                }
                adj.hearings.retain(|h| !later_hearings.contains(&h.id));
                remove_decision(&mut adj, referral_index, decision.as_ref());
            }
            ReferralRemoval::Referral => {
                let decision = decision.ok_or_else(|| {
                    AdjudicationError::conflict(format!(
                        "referral on {charge_number} has no decision to remove"
                    ))
                })?;
                remove_decision(&mut adj, referral_index, Some(&decision));
            }
        }
        settle_status(&mut adj, StatusChange::default())?;

        info!(%charge_number, ?removal, status = %adj.status(), "referral removed");
        self.ctx.commit(
            adj,
            Vec::new(),
            LifecycleOperation::RemoveReferral {
                outcome_only: removal == ReferralRemoval::ReferralOutcome,
            },
            removal == ReferralRemoval::HearingReferral,
            false,
        )
    }

    /// Adjourn the latest hearing.
    pub fn create_adjourn(
        &self,
        charge_number: &ChargeNumber,
        request: AdjournRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        attach_adjourn(&mut adj, &request)?;

        info!(%charge_number, reason = ?request.reason, "hearing adjourned");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::CreateAdjourn, true, false)
    }

    /// Clear the adjournment on the latest hearing and recompute the status.
    pub fn remove_adjourn(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let hearing = adj
            .latest_hearing_mut()
            .filter(|h| h.has_outcome(HearingOutcomeCode::Adjourn))
            .ok_or_else(|| AdjudicationError::validation("No adjourn to remove"))?;
        hearing.hearing_outcome = None;
        settle_status(&mut adj, StatusChange::default())?;

        info!(%charge_number, status = %adj.status(), "adjournment removed");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::RemoveAdjourn, true, false)
    }
}

fn check_hearing_type(
    adj: &ReportedAdjudication,
    hearing_type: OicHearingType,
) -> Result<(), AdjudicationError> {
    if hearing_type_permitted(hearing_type, adj.is_youth_offender) {
        Ok(())
    } else {
        let who = if adj.is_youth_offender { "a youth offender" } else { "an adult" };
        Err(AdjudicationError::validation(format!(
            "hearing type {hearing_type:?} is not valid for {who}"
        )))
    }
}

fn find_hearing(
    adj: &ReportedAdjudication,
    hearing_id: Option<HearingId>,
) -> Result<usize, AdjudicationError> {
    adj.hearing_index(hearing_id).ok_or_else(|| match hearing_id {
        Some(id) => AdjudicationError::not_found(format!("hearing {id}")),
        None => AdjudicationError::not_found(format!("hearing on {}", adj.charge_number)),
    })
}

fn remove_decision(adj: &mut ReportedAdjudication, referral_index: usize, decision: Option<&Outcome>) {
    if let Some(decision) = decision {
        let id = decision.id;
        adj.outcomes[referral_index].superseded_by = None;
        adj.outcomes.retain(|o| o.id != id);
    }
}

/// Check that a referral request is complete, returning its outcome code and status.
pub(crate) fn validate_referral(
    request: &ReferralRequest,
) -> Result<(OutcomeCode, AdjudicationStatus), AdjudicationError> {
    let (_, outcome_code, status) = REFERRAL_CODES
        .iter()
        .find(|(code, _, _)| *code == request.code)
        .copied()
        .ok_or_else(|| {
            AdjudicationError::validation(format!("{} is not a referral code", request.code))
        })?;
    if request.code == HearingOutcomeCode::ReferGov && request.refer_gov_reason.is_none() {
        return Err(AdjudicationError::validation(
            "a referral to the governor requires a reason",
        ));
    }
    Ok((outcome_code, status))
}

/// The latest hearing, which must not have an outcome yet.
pub(crate) fn open_latest_hearing(
    adj: &mut ReportedAdjudication,
) -> Result<&mut Hearing, AdjudicationError> {
    let charge_number = adj.charge_number.clone();
    let hearing = adj
        .latest_hearing_mut()
        .ok_or_else(|| AdjudicationError::not_found(format!("hearing on {charge_number}")))?;
    if let Some(existing) = &hearing.hearing_outcome {
        return Err(AdjudicationError::conflict(format!(
            "hearing {} already has outcome {}",
            hearing.id, existing.code
        )));
    }
    Ok(hearing)
}

pub(crate) fn attach_referral(
    adj: &mut ReportedAdjudication,
    request: &ReferralRequest,
) -> Result<(), AdjudicationError> {
    let (outcome_code, status) = validate_referral(request)?;
    let hearing = open_latest_hearing(adj)?;
    hearing.hearing_outcome = Some(HearingOutcome {
        code: request.code,
        adjudicator: request.adjudicator.clone(),
        details: request.details.clone(),
        reason: None,
        plea: None,
    });
    let mut outcome = Outcome::new(outcome_code).with_details(request.details.clone());
    outcome.refer_gov_reason = request.refer_gov_reason;
    adj.outcomes.push(outcome);
    apply(adj, status, StatusChange::by(request.adjudicator.clone()))?;
    Ok(())
}

pub(crate) fn attach_adjourn(
    adj: &mut ReportedAdjudication,
    request: &AdjournRequest,
) -> Result<(), AdjudicationError> {
    let hearing = open_latest_hearing(adj)?;
    hearing.hearing_outcome = Some(HearingOutcome {
        code: HearingOutcomeCode::Adjourn,
        adjudicator: request.adjudicator.clone(),
        details: request.details.clone(),
        reason: Some(request.reason),
        plea: Some(request.plea),
    });
    apply(
        adj,
        AdjudicationStatus::Adjourned,
        StatusChange::by(request.adjudicator.clone()),
    )?;
    Ok(())
}
