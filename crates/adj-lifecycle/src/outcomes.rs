//! # Outcomes Outside a Hearing
//!
//! Outcomes that are not tied to closing a hearing: a police referral or a
//! decision not to proceed recorded before any hearing, the decision taken
//! on an open referral, and quashing a proved charge.
//!
//! A referral and its decision are linked through the referral's
//! `superseded_by`; a referral with no decision is the open one.

use adj_core::ChargeNumber;
use adj_state::{apply, transitions, AdjudicationStatus, StatusChange};
use tracing::info;

use crate::context::{ActionResult, LifecycleContext};
use crate::error::AdjudicationError;
use crate::events::LifecycleOperation;
use crate::model::outcome::{is_referral_code, status_for, NON_HEARING_CODES};
use crate::model::{NotProceedReason, Outcome, OutcomeCode, QuashedReason, ReportedAdjudication};
use crate::recompute::settle_status;

/// Decisions that may be taken on an open referral.
pub const REFERRAL_DECISION_CODES: &[OutcomeCode] = &[
    OutcomeCode::Prosecution,
    OutcomeCode::NotProceed,
    OutcomeCode::ScheduleHearing,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRequest {
    pub code: OutcomeCode,
    pub details: Option<String>,
    pub reason: Option<NotProceedReason>,
}

impl OutcomeRequest {
    pub fn new(code: OutcomeCode) -> Self {
        Self {
            code,
            details: None,
            reason: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn reason(mut self, reason: NotProceedReason) -> Self {
        self.reason = Some(reason);
        self
    }
}

#[derive(Debug, Clone)]
pub struct OutcomeManager {
    ctx: LifecycleContext,
}

impl OutcomeManager {
    pub fn new(ctx: LifecycleContext) -> Self {
        Self { ctx }
    }

    /// Record `REFER_POLICE` or `NOT_PROCEED` without a hearing.
    pub fn create_outcome(
        &self,
        charge_number: &ChargeNumber,
        request: OutcomeRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        if !NON_HEARING_CODES.contains(&request.code) {
            return Err(AdjudicationError::validation(format!(
                "{} cannot be recorded without a hearing",
                request.code
            )));
        }
        require_reason(&request)?;
        let mut adj = self.ctx.load(charge_number)?;
        if let Some(open) = adj.latest_hearing().filter(|h| h.hearing_outcome.is_none()) {
            return Err(AdjudicationError::conflict(format!(
                "hearing {} is scheduled; record the outcome on the hearing",
                open.id
            )));
        }
        let mut outcome = build_outcome(&request);
        if is_referral_code(request.code) {
            outcome.after_hearing_at = adj.latest_hearing().map(|h| h.date_time_of_hearing);
        }
        adj.outcomes.push(outcome);
        apply(&mut adj, status_for(request.code), StatusChange::default())?;

        info!(%charge_number, code = %request.code, "outcome created");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::CreateOutcome, false, false)
    }

    /// Record the decision on the open referral.
    ///
    /// `PROSECUTION` is only available on a police referral.
    /// `SCHEDULE_HEARING` brings the charge back for a new hearing.
    pub fn create_referral_outcome(
        &self,
        charge_number: &ChargeNumber,
        request: OutcomeRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        if !REFERRAL_DECISION_CODES.contains(&request.code) {
            return Err(AdjudicationError::validation(format!(
                "{} is not a decision on a referral",
                request.code
            )));
        }
        require_reason(&request)?;
        let mut adj = self.ctx.load(charge_number)?;
        let status = adj.status();
        if !transitions::is_referral(status) {
            return Err(AdjudicationError::conflict(format!(
                "{charge_number} is {status}, not under referral"
            )));
        }
        if request.code == OutcomeCode::Prosecution && status != AdjudicationStatus::ReferPolice {
            return Err(AdjudicationError::validation(
                "prosecution only follows a police referral",
            ));
        }
        let referral_index = open_referral_index(&adj)?;
        let decision = build_outcome(&request);
        adj.outcomes[referral_index].superseded_by = Some(decision.id);
        adj.outcomes.push(decision);
        apply(&mut adj, status_for(request.code), StatusChange::default())?;

        info!(%charge_number, code = %request.code, "referral outcome created");
        self.ctx.commit(
            adj,
            Vec::new(),
            LifecycleOperation::CreateReferralOutcome,
            false,
            false,
        )
    }

    /// Quash a proved charge.
    pub fn create_quashed(
        &self,
        charge_number: &ChargeNumber,
        reason: QuashedReason,
        details: Option<String>,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let mut outcome = Outcome::new(OutcomeCode::Quashed).with_details(details);
        outcome.quashed_reason = Some(reason);
        adj.outcomes.push(outcome);
        apply(&mut adj, AdjudicationStatus::Quashed, StatusChange::default())?;

        info!(%charge_number, ?reason, "charge quashed");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::CreateQuashed, false, false)
    }

    /// Undo a quash, returning the charge to `CHARGE_PROVED`.
    pub fn remove_quashed(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let quashed = adj.status() == AdjudicationStatus::Quashed
            && adj
                .latest_outcome()
                .is_some_and(|o| o.code == OutcomeCode::Quashed);
        if !quashed {
            return Err(AdjudicationError::validation("No quashed outcome to remove"));
        }
        adj.outcomes.pop();
        settle_status(&mut adj, StatusChange::default())?;

        info!(%charge_number, status = %adj.status(), "quash removed");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::RemoveQuashed, false, false)
    }
}

fn require_reason(request: &OutcomeRequest) -> Result<(), AdjudicationError> {
    if request.code == OutcomeCode::NotProceed && request.reason.is_none() {
        return Err(AdjudicationError::validation("not proceeding requires a reason"));
    }
    Ok(())
}

fn build_outcome(request: &OutcomeRequest) -> Outcome {
    let mut outcome = Outcome::new(request.code).with_details(request.details.clone());
    outcome.reason = request.reason;
    outcome
}

/// Index of the latest outcome, which must be a referral awaiting a decision.
fn open_referral_index(adj: &ReportedAdjudication) -> Result<usize, AdjudicationError> {
    let index = adj.outcomes.len().checked_sub(1);
    match index.map(|i| (i, &adj.outcomes[i])) {
        Some((i, referral)) if is_referral_code(referral.code) && referral.superseded_by.is_none() => {
            Ok(i)
        }
        _ => Err(AdjudicationError::conflict(format!(
            "{} has no referral awaiting a decision",
            adj.charge_number
        ))),
    }
}
