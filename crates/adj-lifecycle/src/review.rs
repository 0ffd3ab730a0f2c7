//! Report submission, reviewer status changes, and the reporter-owned
//! damages, evidence and witness lists.

use adj_core::ChargeNumber;
use adj_state::{apply, AdjudicationStatus, StatusChange};
use tracing::info;

use crate::context::{ActionResult, LifecycleContext};
use crate::error::AdjudicationError;
use crate::events::LifecycleOperation;
use crate::model::{
    merge_by_reporter, ReportedAdjudication, ReportedDamage, ReportedEvidence, ReportedWitness,
    ReporterOwned,
};

/// Statuses a reviewer may only set with a reason.
const REASON_REQUIRED: &[AdjudicationStatus] =
    &[AdjudicationStatus::Returned, AdjudicationStatus::Rejected];

#[derive(Debug, Clone)]
pub struct ReviewManager {
    ctx: LifecycleContext,
}

impl ReviewManager {
    pub fn new(ctx: LifecycleContext) -> Self {
        Self { ctx }
    }

    /// Store a newly reported charge.
    pub fn submit_report(
        &self,
        adjudication: ReportedAdjudication,
    ) -> Result<ActionResult, AdjudicationError> {
        let charge_number = adjudication.charge_number.clone();
        if self.ctx.store().find(&charge_number)?.is_some() {
            return Err(AdjudicationError::conflict(format!(
                "adjudication {charge_number} already exists"
            )));
        }
        info!(%charge_number, prisoner_number = %adjudication.prisoner_number, "report submitted");
        self.ctx
            .commit(adjudication, Vec::new(), LifecycleOperation::SetStatus, false, false)
    }

    /// Move the charge to `to` on a reviewer's or reporter's say-so.
    pub fn set_status(
        &self,
        charge_number: &ChargeNumber,
        to: AdjudicationStatus,
        reason: Option<String>,
        details: Option<String>,
        actor: &str,
    ) -> Result<ActionResult, AdjudicationError> {
        if REASON_REQUIRED.contains(&to) && reason.as_deref().map_or(true, str::is_empty) {
            return Err(AdjudicationError::validation(format!("{to} requires a reason")));
        }
        let mut adj = self.ctx.load(charge_number)?;
        let from = adj.status();
        let mut change = StatusChange::by(actor);
        change.reason = reason;
        change.details = details;
        apply(&mut adj, to, change)?;

        info!(%charge_number, %from, %to, actor, "status set");
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::SetStatus, false, false)
    }

    pub fn update_damages(
        &self,
        charge_number: &ChargeNumber,
        reporter: &str,
        damages: Vec<ReportedDamage>,
    ) -> Result<ActionResult, AdjudicationError> {
        check_owner(reporter, &damages)?;
        let mut adj = self.ctx.load(charge_number)?;
        adj.damages = merge_by_reporter(&adj.damages, reporter, damages);
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::UpdateDamages, false, false)
    }

    pub fn update_evidence(
        &self,
        charge_number: &ChargeNumber,
        reporter: &str,
        evidence: Vec<ReportedEvidence>,
    ) -> Result<ActionResult, AdjudicationError> {
        check_owner(reporter, &evidence)?;
        let mut adj = self.ctx.load(charge_number)?;
        adj.evidence = merge_by_reporter(&adj.evidence, reporter, evidence);
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::UpdateEvidence, false, false)
    }

    pub fn update_witnesses(
        &self,
        charge_number: &ChargeNumber,
        reporter: &str,
        witnesses: Vec<ReportedWitness>,
    ) -> Result<ActionResult, AdjudicationError> {
        check_owner(reporter, &witnesses)?;
        let mut adj = self.ctx.load(charge_number)?;
        adj.witnesses = merge_by_reporter(&adj.witnesses, reporter, witnesses);
        self.ctx
            .commit(adj, Vec::new(), LifecycleOperation::UpdateWitnesses, false, false)
    }
}

fn check_owner<T: ReporterOwned>(reporter: &str, entries: &[T]) -> Result<(), AdjudicationError> {
    match entries.iter().find(|e| e.reporter() != reporter) {
        Some(other) => Err(AdjudicationError::validation(format!(
            "entry belongs to {}, not {reporter}",
            other.reporter()
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AdjudicationEventType;
    use crate::model::{DamageCode, WitnessCode};
    use crate::test_support::*;
    use adj_core::{AgencyId, PrisonerNumber};

    fn manager(fx: &Fixture) -> ReviewManager {
        ReviewManager::new(fx.ctx.clone())
    }

    fn reported(charge: &str) -> ReportedAdjudication {
        ReportedAdjudication::new(
            charge_number(charge),
            PrisonerNumber::new("A1").unwrap(),
            AgencyId::new("MDI").unwrap(),
        )
    }

    fn damage(reporter: &str, details: &str) -> ReportedDamage {
        ReportedDamage {
            code: DamageCode::Cleaning,
            details: details.into(),
            reporter: reporter.into(),
        }
    }

    #[test]
    fn submit_then_accept() {
        let fx = Fixture::new();
        let mgr = manager(&fx);
        let submitted = mgr.submit_report(reported("1")).unwrap();
        assert_eq!(submitted.events, vec![AdjudicationEventType::ReportSubmitted]);

        let accepted = mgr
            .set_status(&charge_number("1"), AdjudicationStatus::Unscheduled, None, None, "reviewer")
            .unwrap();
        assert_eq!(accepted.events, vec![AdjudicationEventType::ReportAccepted]);
        let audit = accepted.adjudication.status_audit();
        assert_eq!(audit.last().unwrap().actor.as_deref(), Some("reviewer"));
    }

    #[test]
    fn duplicate_submission_conflicts() {
        let fx = Fixture::new();
        let mgr = manager(&fx);
        mgr.submit_report(reported("1")).unwrap();
        assert_eq!(mgr.submit_report(reported("1")).unwrap_err().status_code(), 409);
    }

    #[test]
    fn return_requires_reason() {
        let fx = Fixture::new();
        let mgr = manager(&fx);
        mgr.submit_report(reported("1")).unwrap();
        let err = mgr
            .set_status(&charge_number("1"), AdjudicationStatus::Returned, None, None, "reviewer")
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::Validation(_)));

        let returned = mgr
            .set_status(
                &charge_number("1"),
                AdjudicationStatus::Returned,
                Some("missing statement".into()),
                Some("add witness statement".into()),
                "reviewer",
            )
            .unwrap();
        assert_eq!(returned.adjudication.status_reason(), Some("missing statement"));
        assert_eq!(returned.events, vec![AdjudicationEventType::ReportReturned]);
    }

    #[test]
    fn illegal_status_change_is_rejected() {
        let fx = Fixture::new();
        fx.seed(unscheduled("1", "A1"));
        let err = manager(&fx)
            .set_status(&charge_number("1"), AdjudicationStatus::Dismissed, None, None, "x")
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::IllegalTransition { .. }));
    }

    #[test]
    fn damages_merge_by_reporter() {
        let fx = Fixture::new();
        let mut adj = unscheduled("1", "A1");
        adj.damages = vec![damage("alice", "a1"), damage("bob", "b1")];
        fx.seed(adj);

        let result = manager(&fx)
            .update_damages(&charge_number("1"), "alice", vec![damage("alice", "a2")])
            .unwrap();
        let details: Vec<_> = result
            .adjudication
            .damages
            .iter()
            .map(|d| d.details.as_str())
            .collect();
        assert_eq!(details, vec!["b1", "a2"]);
        assert_eq!(result.events, vec![AdjudicationEventType::DamagesUpdated]);
    }

    #[test]
    fn entries_must_belong_to_reporter() {
        let fx = Fixture::new();
        fx.seed(unscheduled("1", "A1"));
        let err = manager(&fx)
            .update_witnesses(
                &charge_number("1"),
                "alice",
                vec![ReportedWitness {
                    code: WitnessCode::Officer,
                    first_name: "Ann".into(),
                    last_name: "Lee".into(),
                    reporter: "bob".into(),
                }],
            )
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::Validation(_)));
    }
}
