//! # Hearing Outcome Amendment
//!
//! Corrects the outcome recorded on the latest hearing. When the requested
//! status is the current one the hearing outcome and outcome are edited in
//! place. Otherwise the existing pair is removed, the status recomputed, and
//! a new pair created for the requested status.
//!
//! Only the adjudicator carries over when the outcome kind changes. Every
//! other field the new kind needs must be on the request.

use adj_core::ChargeNumber;
use adj_state::{AdjudicationStatus, StatusChange};
use tracing::{debug, info};

use crate::completed::{attach_completed, detach_completed, CompletedHearingRequest};
use crate::context::{ActionResult, LifecycleContext};
use crate::error::AdjudicationError;
use crate::events::LifecycleOperation;
use crate::hearings::{attach_adjourn, attach_referral, AdjournRequest, ReferralRequest};
use crate::model::outcome::{is_completed_hearing_code, is_referral_code, referral_hearing_code};
use crate::model::{
    AdjournReason, HearingOutcomeCode, NotProceedReason, OutcomeCode, Plea, ReferGovReason,
    ReportedAdjudication,
};
use crate::punishments::remove_all_punishments;
use crate::recompute::settle_status;

/// What a status's hearing outcome looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutcomeKind {
    Referral(OutcomeCode),
    Adjourn,
    Completed(OutcomeCode),
}

/// Statuses whose outcome can be amended.
const AMENDABLE: &[(AdjudicationStatus, OutcomeKind)] = &[
    (AdjudicationStatus::ReferPolice, OutcomeKind::Referral(OutcomeCode::ReferPolice)),
    (AdjudicationStatus::ReferInad, OutcomeKind::Referral(OutcomeCode::ReferInad)),
    (AdjudicationStatus::ReferGov, OutcomeKind::Referral(OutcomeCode::ReferGov)),
    (AdjudicationStatus::Adjourned, OutcomeKind::Adjourn),
    (AdjudicationStatus::Dismissed, OutcomeKind::Completed(OutcomeCode::Dismissed)),
    (AdjudicationStatus::NotProceed, OutcomeKind::Completed(OutcomeCode::NotProceed)),
    (AdjudicationStatus::ChargeProved, OutcomeKind::Completed(OutcomeCode::ChargeProved)),
];

fn kind_of(status: AdjudicationStatus) -> Result<OutcomeKind, AdjudicationError> {
    AMENDABLE
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| {
            AdjudicationError::validation(format!("outcomes in status {status} cannot be amended"))
        })
}

/// Fields to change. `None` leaves a field as it is on an in-place edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HearingOutcomeAmendment {
    pub adjudicator: Option<String>,
    pub details: Option<String>,
    pub plea: Option<Plea>,
    pub adjourn_reason: Option<AdjournReason>,
    pub not_proceed_reason: Option<NotProceedReason>,
    pub refer_gov_reason: Option<ReferGovReason>,
}

#[derive(Debug, Clone)]
pub struct AmendmentCoordinator {
    ctx: LifecycleContext,
}

impl AmendmentCoordinator {
    pub fn new(ctx: LifecycleContext) -> Self {
        Self { ctx }
    }

    pub fn amend_hearing_outcome(
        &self,
        charge_number: &ChargeNumber,
        status: AdjudicationStatus,
        amendment: HearingOutcomeAmendment,
    ) -> Result<ActionResult, AdjudicationError> {
        let mut adj = self.ctx.load(charge_number)?;
        let current = adj.status();
        let current_kind = kind_of(current)?;
        let target_kind = kind_of(status)?;
        let on_hearing = outcome_on_hearing(&adj, current_kind);

        let (hearing_actioned, punishments_removed, related) = if current == status {
            amend_in_place(&mut adj, current_kind, on_hearing, &amendment)?;
            (on_hearing, false, Vec::new())
        } else {
            if !on_hearing {
                return Err(AdjudicationError::validation(format!(
                    "{current} was recorded without a hearing and can only be edited"
                )));
            }
            let adjudicator = adj
                .latest_hearing()
                .and_then(|h| h.hearing_outcome.as_ref())
                .map(|o| o.adjudicator.clone())
                .unwrap_or_default();
            let (removed, related) = self.detach(&mut adj, current_kind)?;
            settle_status(&mut adj, StatusChange::default())?;
            debug!(%charge_number, from = %current, to = %status, "recreating outcome");
            attach(&mut adj, target_kind, adjudicator, &amendment)?;
            (true, removed, related)
        };

        info!(%charge_number, from = %current, to = %adj.status(), "hearing outcome amended");
        self.ctx.commit(
            adj,
            related,
            LifecycleOperation::AmendHearingOutcome,
            hearing_actioned,
            punishments_removed,
        )
    }

    fn detach(
        &self,
        adj: &mut ReportedAdjudication,
        kind: OutcomeKind,
    ) -> Result<(bool, Vec<ReportedAdjudication>), AdjudicationError> {
        match kind {
            OutcomeKind::Referral(_) => {
                adj.outcomes.pop();
                clear_hearing_outcome(adj);
                Ok((false, Vec::new()))
            }
            OutcomeKind::Adjourn => {
                clear_hearing_outcome(adj);
                Ok((false, Vec::new()))
            }
            OutcomeKind::Completed(_) => match detach_completed(adj)? {
                OutcomeCode::ChargeProved => remove_all_punishments(&self.ctx, adj),
                _ => Ok((false, Vec::new())),
            },
        }
    }
}

/// Whether the current outcome sits on the latest hearing, as opposed to a
/// referral or not-proceed recorded before any hearing.
fn outcome_on_hearing(adj: &ReportedAdjudication, kind: OutcomeKind) -> bool {
    let Some(hearing) = adj.latest_hearing() else {
        return false;
    };
    match kind {
        OutcomeKind::Adjourn => hearing.has_outcome(HearingOutcomeCode::Adjourn),
        OutcomeKind::Referral(code) => {
            referral_hearing_code(code).is_some_and(|h| hearing.has_outcome(h))
        }
        OutcomeKind::Completed(_) => hearing.has_outcome(HearingOutcomeCode::Complete),
    }
}

fn clear_hearing_outcome(adj: &mut ReportedAdjudication) {
    if let Some(hearing) = adj.latest_hearing_mut() {
        hearing.hearing_outcome = None;
    }
}

fn amend_in_place(
    adj: &mut ReportedAdjudication,
    kind: OutcomeKind,
    on_hearing: bool,
    amendment: &HearingOutcomeAmendment,
) -> Result<(), AdjudicationError> {
    if on_hearing {
        if let Some(outcome) = adj.latest_hearing_mut().and_then(|h| h.hearing_outcome.as_mut()) {
            if let Some(adjudicator) = &amendment.adjudicator {
                outcome.adjudicator = adjudicator.clone();
            }
            match kind {
                OutcomeKind::Adjourn => {
                    if amendment.details.is_some() {
                        outcome.details = amendment.details.clone();
                    }
                    if amendment.adjourn_reason.is_some() {
                        outcome.reason = amendment.adjourn_reason;
                    }
                    if amendment.plea.is_some() {
                        outcome.plea = amendment.plea;
                    }
                }
                OutcomeKind::Referral(_) => {
                    if amendment.details.is_some() {
                        outcome.details = amendment.details.clone();
                    }
                }
                OutcomeKind::Completed(_) => {
                    if amendment.plea.is_some() {
                        outcome.plea = amendment.plea;
                    }
                }
            }
        }
    }
    if kind == OutcomeKind::Adjourn {
        return Ok(());
    }

    let charge_number = adj.charge_number.clone();
    let outcome = adj
        .outcomes
        .last_mut()
        .filter(|o| is_referral_code(o.code) || is_completed_hearing_code(o.code))
        .ok_or_else(|| AdjudicationError::not_found(format!("outcome on {charge_number}")))?;
    if amendment.details.is_some() {
        outcome.details = amendment.details.clone();
    }
    if outcome.code == OutcomeCode::NotProceed && amendment.not_proceed_reason.is_some() {
        outcome.reason = amendment.not_proceed_reason;
    }
    if outcome.code == OutcomeCode::ReferGov && amendment.refer_gov_reason.is_some() {
        outcome.refer_gov_reason = amendment.refer_gov_reason;
    }
    Ok(())
}

fn attach(
    adj: &mut ReportedAdjudication,
    kind: OutcomeKind,
    carried_adjudicator: String,
    amendment: &HearingOutcomeAmendment,
) -> Result<(), AdjudicationError> {
    let adjudicator = amendment.adjudicator.clone().unwrap_or(carried_adjudicator);
    match kind {
        OutcomeKind::Referral(code) => {
            let hearing_code = referral_hearing_code(code).ok_or_else(|| {
                AdjudicationError::validation(format!("{code} is not a referral"))
            })?;
            attach_referral(
                adj,
                &ReferralRequest {
                    code: hearing_code,
                    adjudicator,
                    details: amendment.details.clone(),
                    refer_gov_reason: amendment.refer_gov_reason,
                },
            )
        }
        OutcomeKind::Adjourn => {
            let (Some(reason), Some(plea)) = (amendment.adjourn_reason, amendment.plea) else {
                return Err(AdjudicationError::validation(
                    "an adjournment needs a reason and a plea",
                ));
            };
            attach_adjourn(
                adj,
                &AdjournRequest {
                    adjudicator,
                    reason,
                    plea,
                    details: amendment.details.clone(),
                },
            )
        }
        OutcomeKind::Completed(code) => {
            let plea = amendment
                .plea
                .ok_or_else(|| AdjudicationError::validation("a completed hearing needs a plea"))?;
            attach_completed(
                adj,
                code,
                &CompletedHearingRequest {
                    adjudicator,
                    plea,
                    details: amendment.details.clone(),
                },
                amendment.not_proceed_reason,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completed::CompletedHearingManager;
    use crate::events::AdjudicationEventType;
    use crate::hearings::HearingLifecycleManager;
    use crate::outcomes::{OutcomeManager, OutcomeRequest};
    use crate::punishments::{PunishmentLifecycleManager, PunishmentRequest};
    use crate::model::PunishmentType;
    use crate::test_support::*;

    fn coordinator(fx: &Fixture) -> AmendmentCoordinator {
        AmendmentCoordinator::new(fx.ctx.clone())
    }

    fn dismissed(fx: &Fixture) {
        fx.seed(scheduled("1", "A1"));
        CompletedHearingManager::new(fx.ctx.clone())
            .create_dismissed(
                &charge_number("1"),
                CompletedHearingRequest {
                    adjudicator: "Smith".into(),
                    plea: Plea::NotGuilty,
                    details: None,
                },
            )
            .unwrap();
    }

    #[test]
    fn same_status_edits_in_place() {
        let fx = Fixture::new();
        dismissed(&fx);
        let result = coordinator(&fx)
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::Dismissed,
                HearingOutcomeAmendment {
                    details: Some("corrected".into()),
                    plea: Some(Plea::Guilty),
                    ..Default::default()
                },
            )
            .unwrap();
        let adj = result.adjudication;
        assert_eq!(adj.outcomes.len(), 1);
        assert_eq!(adj.outcomes[0].details.as_deref(), Some("corrected"));
        let hearing_outcome = adj.latest_hearing().unwrap().hearing_outcome.as_ref().unwrap();
        assert_eq!(hearing_outcome.plea, Some(Plea::Guilty));
        assert_eq!(hearing_outcome.adjudicator, "Smith");
        assert_eq!(result.events, vec![AdjudicationEventType::HearingOutcomeUpdated]);
    }

    #[test]
    fn change_of_status_recreates_and_carries_adjudicator() {
        let fx = Fixture::new();
        dismissed(&fx);
        let result = coordinator(&fx)
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::ReferInad,
                HearingOutcomeAmendment::default(),
            )
            .unwrap();
        let adj = result.adjudication;
        assert_eq!(adj.status(), AdjudicationStatus::ReferInad);
        assert_eq!(adj.outcomes.len(), 1);
        assert_eq!(adj.outcomes[0].code, OutcomeCode::ReferInad);
        let hearing_outcome = adj.latest_hearing().unwrap().hearing_outcome.as_ref().unwrap();
        assert_eq!(hearing_outcome.code, HearingOutcomeCode::ReferInad);
        assert_eq!(hearing_outcome.adjudicator, "Smith");
    }

    #[test]
    fn adjourn_needs_reason_and_plea_from_request() {
        let fx = Fixture::new();
        dismissed(&fx);
        let before = fx.get("1");
        let err = coordinator(&fx)
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::Adjourned,
                HearingOutcomeAmendment::default(),
            )
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::Validation(_)));
        assert_eq!(fx.get("1"), before);
    }

    #[test]
    fn amending_away_from_charge_proved_removes_punishments() {
        let fx = Fixture::new();
        fx.seed(scheduled("1", "A1"));
        CompletedHearingManager::new(fx.ctx.clone())
            .create_charge_proved(
                &charge_number("1"),
                CompletedHearingRequest {
                    adjudicator: "Smith".into(),
                    plea: Plea::Guilty,
                    details: None,
                },
            )
            .unwrap();
        PunishmentLifecycleManager::new(fx.ctx.clone())
            .create(
                &charge_number("1"),
                vec![PunishmentRequest {
                    days: 3,
                    ..PunishmentRequest::new(PunishmentType::AdditionalDays)
                }],
            )
            .unwrap();

        let result = coordinator(&fx)
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::Dismissed,
                HearingOutcomeAmendment {
                    plea: Some(Plea::NotGuilty),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(result.adjudication.punishments.is_empty());
        assert_eq!(result.adjudication.status(), AdjudicationStatus::Dismissed);
        assert_eq!(
            result.events,
            vec![
                AdjudicationEventType::HearingOutcomeUpdated,
                AdjudicationEventType::PunishmentsDeleted
            ]
        );
    }

    #[test]
    fn adjourned_to_charge_proved() {
        let fx = Fixture::new();
        fx.seed(scheduled("1", "A1"));
        HearingLifecycleManager::new(fx.ctx.clone())
            .create_adjourn(
                &charge_number("1"),
                AdjournRequest {
                    adjudicator: "Jones".into(),
                    reason: AdjournReason::LegalAdvice,
                    plea: Plea::NotAsked,
                    details: None,
                },
            )
            .unwrap();
        let result = coordinator(&fx)
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::ChargeProved,
                HearingOutcomeAmendment {
                    plea: Some(Plea::Guilty),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(result.adjudication.status(), AdjudicationStatus::ChargeProved);
        let hearing_outcome = result
            .adjudication
            .latest_hearing()
            .unwrap()
            .hearing_outcome
            .clone()
            .unwrap();
        assert_eq!(hearing_outcome.adjudicator, "Jones");
    }

    #[test]
    fn pre_hearing_outcome_is_edit_only() {
        let fx = Fixture::new();
        fx.seed(unscheduled("1", "A1"));
        OutcomeManager::new(fx.ctx.clone())
            .create_outcome(
                &charge_number("1"),
                OutcomeRequest::new(OutcomeCode::NotProceed).reason(NotProceedReason::Released),
            )
            .unwrap();
        let coordinator = coordinator(&fx);

        let edited = coordinator
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::NotProceed,
                HearingOutcomeAmendment {
                    not_proceed_reason: Some(NotProceedReason::Other),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited.adjudication.outcomes[0].reason, Some(NotProceedReason::Other));
        assert_eq!(edited.events, vec![AdjudicationEventType::OutcomeUpdated]);

        let err = coordinator
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::Dismissed,
                HearingOutcomeAmendment::default(),
            )
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::Validation(_)));
    }

    #[test]
    fn unamendable_status() {
        let fx = Fixture::new();
        fx.seed(scheduled("1", "A1"));
        let err = coordinator(&fx)
            .amend_hearing_outcome(
                &charge_number("1"),
                AdjudicationStatus::Dismissed,
                HearingOutcomeAmendment::default(),
            )
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::Validation(_)));
    }
}
