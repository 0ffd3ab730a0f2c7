//! # Completed Hearings
//!
//! A hearing closes with `COMPLETE` on its hearing outcome and one of the
//! decisions `DISMISSED`, `NOT_PROCEED` or `CHARGE_PROVED` as the latest
//! outcome. The two are created together and removed together.

use adj_core::ChargeNumber;
use adj_state::{apply, StatusChange};
use tracing::info;

use crate::context::{ActionResult, LifecycleContext};
use crate::error::AdjudicationError;
use crate::events::LifecycleOperation;
use crate::hearings::open_latest_hearing;
use crate::model::outcome::{is_completed_hearing_code, status_for};
use crate::model::{
    HearingOutcome, HearingOutcomeCode, NotProceedReason, Outcome, OutcomeCode, Plea,
    ReportedAdjudication,
};
use crate::punishments::remove_all_punishments;
use crate::recompute::settle_status;

const NOTHING_TO_REMOVE: &str = "No completed hearing outcome to remove";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedHearingRequest {
    pub adjudicator: String,
    pub plea: Plea,
    pub details: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CompletedHearingManager {
    ctx: LifecycleContext,
}

impl CompletedHearingManager {
    pub fn new(ctx: LifecycleContext) -> Self {
        Self { ctx }
    }

    pub fn create_dismissed(
        &self,
        charge_number: &ChargeNumber,
        request: CompletedHearingRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        self.complete(charge_number, OutcomeCode::Dismissed, request, None)
    }

    pub fn create_not_proceed(
        &self,
        charge_number: &ChargeNumber,
        request: CompletedHearingRequest,
        reason: NotProceedReason,
    ) -> Result<ActionResult, AdjudicationError> {
        self.complete(charge_number, OutcomeCode::NotProceed, request, Some(reason))
    }

    pub fn create_charge_proved(
        &self,
        charge_number: &ChargeNumber,
        request: CompletedHearingRequest,
    ) -> Result<ActionResult, AdjudicationError> {
        self.complete(charge_number, OutcomeCode::ChargeProved, request, None)
    }

    fn complete(
        &self,
        charge_number: &ChargeNumber,
        code: OutcomeCode,
        request: CompletedHearingRequest,
        reason: Option<NotProceedReason>,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        attach_completed(&mut adj, code, &request, reason)?;

        info!(%charge_number, %code, "hearing completed");
        self.ctx.commit(
            adj,
            Vec::new(),
            LifecycleOperation::CreateCompletedHearing,
            true,
            false,
        )
    }

    /// Remove the completed-hearing outcome and its `COMPLETE` hearing outcome.
    ///
    /// Removing `CHARGE_PROVED` also removes the charge's punishments and
    /// undoes any activations they made on other charges.
    pub fn remove_completed_hearing(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let code = detach_completed(&mut adj)?;
        let (punishments_removed, related) = if code == OutcomeCode::ChargeProved {
            remove_all_punishments(&self.ctx, &mut adj)?
        } else {
            (false, Vec::new())
        };
        settle_status(&mut adj, StatusChange::default())?;

        info!(%charge_number, %code, punishments_removed, "completed hearing removed");
        self.ctx.commit(
            adj,
            related,
            LifecycleOperation::RemoveCompletedHearing,
            true,
            punishments_removed,
        )
    }
}

/// Check that the latest outcome is a completed-hearing outcome paired with
/// `COMPLETE` on the latest hearing.
pub fn validate_can_remove(adj: &ReportedAdjudication) -> Result<OutcomeCode, AdjudicationError> {
    let code = adj
        .latest_outcome()
        .map(|o| o.code)
        .filter(|code| is_completed_hearing_code(*code))
        .ok_or_else(|| AdjudicationError::validation(NOTHING_TO_REMOVE))?;
    let paired = adj
        .latest_hearing()
        .is_some_and(|h| h.has_outcome(HearingOutcomeCode::Complete));
    if !paired {
        return Err(AdjudicationError::validation(NOTHING_TO_REMOVE));
    }
    Ok(code)
}

pub(crate) fn attach_completed(
    adj: &mut ReportedAdjudication,
    code: OutcomeCode,
    request: &CompletedHearingRequest,
    reason: Option<NotProceedReason>,
) -> Result<(), AdjudicationError> {
    if !is_completed_hearing_code(code) {
        return Err(AdjudicationError::validation(format!(
            "{code} does not complete a hearing"
        )));
    }
    if code == OutcomeCode::NotProceed && reason.is_none() {
        return Err(AdjudicationError::validation("not proceeding requires a reason"));
    }
    let hearing = open_latest_hearing(adj)?;
    hearing.hearing_outcome = Some(HearingOutcome {
        code: HearingOutcomeCode::Complete,
        adjudicator: request.adjudicator.clone(),
        details: None,
        reason: None,
        plea: Some(request.plea),
    });
    let mut outcome = Outcome::new(code).with_details(request.details.clone());
    outcome.reason = reason;
    adj.outcomes.push(outcome);
    apply(adj, status_for(code), StatusChange::by(request.adjudicator.clone()))?;
    Ok(())
}

/// Remove the completed-hearing pair, returning the removed outcome code.
pub(crate) fn detach_completed(
    adj: &mut ReportedAdjudication,
) -> Result<OutcomeCode, AdjudicationError> {
    let code = validate_can_remove(adj)?;
    adj.outcomes.pop();
    if let Some(hearing) = adj.latest_hearing_mut() {
        hearing.hearing_outcome = None;
    }
    Ok(code)
}
