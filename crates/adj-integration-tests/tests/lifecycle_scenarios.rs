//! # Lifecycle Scenarios
//!
//! End-to-end runs of a charge through review, hearings, outcomes,
//! punishments, quashing and amendment, checking the stored aggregate and
//! the published events after each step.

use std::sync::Arc;

use adj_core::{AgencyId, ChargeNumber, PrisonerNumber};
use adj_lifecycle::model::{
    AdjournReason, NotProceedReason, OicHearingType, OutcomeCode, Plea, PunishmentType,
    QuashedReason,
};
use adj_lifecycle::{
    AdjournRequest, AdjudicationError, AdjudicationEventType, AdjudicationRepository,
    AmendmentCoordinator, CompletedHearingManager, CompletedHearingRequest,
    HearingLifecycleManager, HearingOutcomeAmendment, HearingRequest,
    InMemoryAdjudicationRepository, LifecycleConfig, LifecycleContext, OutcomeManager,
    OutcomeRequest, PunishmentLifecycleManager, PunishmentRequest, RecordingEventPublisher,
    ReportedAdjudication, ReviewManager,
};
use adj_state::{AdjudicationStatus, TransitionKind};
use chrono::{NaiveDate, NaiveDateTime};

// =========================================================================
// Harness
// =========================================================================

struct Harness {
    ctx: LifecycleContext,
    repo: Arc<InMemoryAdjudicationRepository>,
    events: Arc<RecordingEventPublisher>,
}

impl Harness {
    fn new() -> Self {
        let repo = Arc::new(InMemoryAdjudicationRepository::new());
        let events = Arc::new(RecordingEventPublisher::new());
        let ctx = LifecycleContext::new(repo.clone(), events.clone(), LifecycleConfig::default())
            .with_today(date(2026, 3, 1));
        Self { ctx, repo, events }
    }

    fn review(&self) -> ReviewManager {
        ReviewManager::new(self.ctx.clone())
    }

    fn hearings(&self) -> HearingLifecycleManager {
        HearingLifecycleManager::new(self.ctx.clone())
    }

    fn completed(&self) -> CompletedHearingManager {
        CompletedHearingManager::new(self.ctx.clone())
    }

    fn outcomes(&self) -> OutcomeManager {
        OutcomeManager::new(self.ctx.clone())
    }

    fn punishments(&self) -> PunishmentLifecycleManager {
        PunishmentLifecycleManager::new(self.ctx.clone())
    }

    fn stored(&self, charge: &ChargeNumber) -> ReportedAdjudication {
        self.repo.find_by_charge_number(charge).unwrap().unwrap()
    }

    /// Submit and accept `charge`.
    fn accepted(&self, charge: &ChargeNumber) {
        self.review()
            .submit_report(ReportedAdjudication::new(
                charge.clone(),
                PrisonerNumber::new("G7123UE").unwrap(),
                AgencyId::new("LEI").unwrap(),
            ))
            .unwrap();
        self.review()
            .set_status(charge, AdjudicationStatus::Unscheduled, None, None, "reviewer")
            .unwrap();
    }

    fn schedule(&self, charge: &ChargeNumber, when: NaiveDateTime) {
        self.hearings()
            .create_hearing(
                charge,
                HearingRequest {
                    location_id: 27187,
                    date_time_of_hearing: when,
                    oic_hearing_type: OicHearingType::GovAdult,
                },
            )
            .unwrap();
    }

    fn proved(&self, charge: &ChargeNumber) {
        self.accepted(charge);
        self.schedule(charge, at(2026, 2, 1));
        self.completed()
            .create_charge_proved(charge, completed_request())
            .unwrap();
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(14, 0, 0).unwrap()
}

fn charge(raw: &str) -> ChargeNumber {
    ChargeNumber::new(raw).unwrap()
}

fn completed_request() -> CompletedHearingRequest {
    CompletedHearingRequest {
        adjudicator: "Governor Jones".into(),
        plea: Plea::Guilty,
        details: None,
    }
}

fn confinement() -> PunishmentRequest {
    let mut request = PunishmentRequest::new(PunishmentType::Confinement);
    request.days = 5;
    request.start_date = Some(date(2026, 2, 2));
    request.end_date = Some(date(2026, 2, 7));
    request
}

// =========================================================================
// Review
// =========================================================================

#[test]
fn returned_report_is_resubmitted_and_accepted() {
    let h = Harness::new();
    let c = charge("MDI-000123");
    h.review()
        .submit_report(ReportedAdjudication::new(
            c.clone(),
            PrisonerNumber::new("G7123UE").unwrap(),
            AgencyId::new("MDI").unwrap(),
        ))
        .unwrap();
    h.review()
        .set_status(
            &c,
            AdjudicationStatus::Returned,
            Some("statement unclear".into()),
            None,
            "reviewer",
        )
        .unwrap();
    h.review()
        .set_status(&c, AdjudicationStatus::AwaitingReview, None, None, "reporter")
        .unwrap();
    h.review()
        .set_status(&c, AdjudicationStatus::Unscheduled, None, None, "reviewer")
        .unwrap();

    assert_eq!(
        h.events.event_types(),
        vec![
            AdjudicationEventType::ReportSubmitted,
            AdjudicationEventType::ReportReturned,
            AdjudicationEventType::ReportSubmitted,
            AdjudicationEventType::ReportAccepted,
        ]
    );
    let stored = h.stored(&c);
    let trail: Vec<_> = stored.status_audit().iter().map(|e| e.to).collect();
    assert_eq!(
        trail,
        vec![
            AdjudicationStatus::Returned,
            AdjudicationStatus::AwaitingReview,
            AdjudicationStatus::Unscheduled,
        ]
    );
    assert!(stored.status_reason().is_none());
}

// =========================================================================
// Hearings and outcomes
// =========================================================================

#[test]
fn adjourned_hearing_is_rescheduled() {
    let h = Harness::new();
    let c = charge("2");
    h.accepted(&c);
    h.schedule(&c, at(2026, 2, 1));

    let adjourned = h
        .hearings()
        .create_adjourn(
            &c,
            AdjournRequest {
                adjudicator: "Governor Jones".into(),
                reason: AdjournReason::LegalAdvice,
                plea: Plea::NotAsked,
                details: Some("prisoner wants advice".into()),
            },
        )
        .unwrap();
    assert_eq!(adjourned.adjudication.status(), AdjudicationStatus::Adjourned);
    assert_eq!(adjourned.events, vec![AdjudicationEventType::HearingAdjournCreated]);

    h.schedule(&c, at(2026, 2, 15));
    let stored = h.stored(&c);
    assert_eq!(stored.status(), AdjudicationStatus::Scheduled);
    assert_eq!(stored.hearings.len(), 2);
}

#[test]
fn removing_adjourn_reopens_hearing() {
    let h = Harness::new();
    let c = charge("3");
    h.accepted(&c);
    h.schedule(&c, at(2026, 2, 1));
    h.hearings()
        .create_adjourn(
            &c,
            AdjournRequest {
                adjudicator: "Governor Jones".into(),
                reason: AdjournReason::Unfit,
                plea: Plea::Unfit,
                details: None,
            },
        )
        .unwrap();

    let removed = h.hearings().remove_adjourn(&c).unwrap();
    assert_eq!(removed.adjudication.status(), AdjudicationStatus::Scheduled);
    assert!(removed.adjudication.hearings[0].hearing_outcome.is_none());
    assert_eq!(removed.events, vec![AdjudicationEventType::HearingAdjournDeleted]);
    let last = removed.adjudication.status_audit().last().unwrap();
    assert_eq!(last.kind, TransitionKind::Reversion);
}

#[test]
fn police_referral_without_hearing_then_not_proceed() {
    let h = Harness::new();
    let c = charge("4");
    h.accepted(&c);

    let referred = h
        .outcomes()
        .create_outcome(&c, OutcomeRequest::new(OutcomeCode::ReferPolice))
        .unwrap();
    assert_eq!(referred.adjudication.status(), AdjudicationStatus::ReferPolice);
    assert_eq!(referred.events, vec![AdjudicationEventType::RefPoliceOutcome]);

    let decided = h
        .outcomes()
        .create_referral_outcome(
            &c,
            OutcomeRequest::new(OutcomeCode::NotProceed)
                .reason(NotProceedReason::ExpiredNotice)
                .details("police declined"),
        )
        .unwrap();
    assert_eq!(decided.adjudication.status(), AdjudicationStatus::NotProceed);
    assert_eq!(decided.events, vec![AdjudicationEventType::ReferralOutcomeNotProceed]);
}

#[test]
fn not_proceed_requires_reason() {
    let h = Harness::new();
    let c = charge("5");
    h.accepted(&c);
    let before = h.stored(&c);
    let err = h
        .outcomes()
        .create_outcome(&c, OutcomeRequest::new(OutcomeCode::NotProceed))
        .unwrap_err();
    assert!(matches!(err, AdjudicationError::Validation(_)));
    assert_eq!(h.stored(&c), before);
}

// =========================================================================
// Proved charges
// =========================================================================

#[test]
fn quash_and_unquash_keep_punishments() {
    let h = Harness::new();
    let c = charge("6");
    h.proved(&c);
    h.punishments().create(&c, vec![confinement()]).unwrap();

    let quashed = h
        .outcomes()
        .create_quashed(&c, QuashedReason::AppealUpheld, Some("appeal upheld".into()))
        .unwrap();
    assert_eq!(quashed.adjudication.status(), AdjudicationStatus::Quashed);
    assert_eq!(quashed.events, vec![AdjudicationEventType::Quashed]);

    let unquashed = h.outcomes().remove_quashed(&c).unwrap();
    assert_eq!(unquashed.adjudication.status(), AdjudicationStatus::ChargeProved);
    assert_eq!(unquashed.events, vec![AdjudicationEventType::Unquashed]);
    assert_eq!(unquashed.adjudication.punishments.len(), 1);
}

#[test]
fn amending_proved_to_dismissed_drops_punishments() {
    let h = Harness::new();
    let c = charge("7");
    h.proved(&c);
    h.punishments().create(&c, vec![confinement()]).unwrap();
    h.events.clear();

    let amended = AmendmentCoordinator::new(h.ctx.clone())
        .amend_hearing_outcome(
            &c,
            AdjudicationStatus::Dismissed,
            HearingOutcomeAmendment {
                plea: Some(Plea::NotGuilty),
                details: Some("evidence insufficient".into()),
                ..HearingOutcomeAmendment::default()
            },
        )
        .unwrap();

    let adj = &amended.adjudication;
    assert_eq!(adj.status(), AdjudicationStatus::Dismissed);
    assert!(adj.punishments.is_empty());
    assert_eq!(adj.outcomes.len(), 1);
    assert_eq!(adj.outcomes[0].code, OutcomeCode::Dismissed);
    let outcome = adj.hearings[0].hearing_outcome.as_ref().unwrap();
    assert_eq!(outcome.adjudicator, "Governor Jones");
    assert_eq!(outcome.plea, Some(Plea::NotGuilty));
    assert_eq!(
        amended.events,
        vec![
            AdjudicationEventType::HearingOutcomeUpdated,
            AdjudicationEventType::PunishmentsDeleted,
        ]
    );
    assert_eq!(h.events.event_types(), amended.events);
}

#[test]
fn removing_completed_hearing_reopens_it() {
    let h = Harness::new();
    let c = charge("8");
    h.proved(&c);
    h.punishments().create(&c, vec![confinement()]).unwrap();

    let removed = h.completed().remove_completed_hearing(&c).unwrap();
    assert_eq!(removed.adjudication.status(), AdjudicationStatus::Scheduled);
    assert!(removed.adjudication.punishments.is_empty());
    assert!(removed.adjudication.outcomes.is_empty());
    assert!(removed.hearing_actioned);
    assert!(removed.punishments_removed);
}

#[test]
fn rejected_punishment_request_saves_nothing() {
    let h = Harness::new();
    let c = charge("9");
    h.proved(&c);
    let before = h.stored(&c);
    h.events.clear();

    let mut earnings = PunishmentRequest::new(PunishmentType::Earnings);
    earnings.stoppage_percentage = Some(150);
    earnings.days = 7;
    earnings.start_date = Some(date(2026, 2, 2));
    earnings.end_date = Some(date(2026, 2, 9));
    let err = h
        .punishments()
        .create(&c, vec![confinement(), earnings])
        .unwrap_err();

    assert!(matches!(err, AdjudicationError::Validation(_)));
    assert_eq!(h.stored(&c), before);
    assert!(h.events.events().is_empty());
}

#[test]
fn punishments_need_a_proved_charge() {
    let h = Harness::new();
    let c = charge("10");
    h.accepted(&c);
    h.schedule(&c, at(2026, 2, 1));
    let err = h.punishments().create(&c, vec![confinement()]).unwrap_err();
    assert!(matches!(err, AdjudicationError::Validation(_)));
}

#[test]
fn stale_write_is_a_conflict() {
    let h = Harness::new();
    let c = charge("11");
    h.accepted(&c);
    let stale = h.stored(&c);
    h.schedule(&c, at(2026, 2, 1));

    let err = h.repo.save(stale).unwrap_err();
    assert_eq!(err.status_code(), 409);
}
