//! # Domain Events
//!
//! Every mutating lifecycle operation emits one or more events once its
//! aggregate has been saved. Which events is decided by [`select_events`], a
//! pure function of the operation, the resulting status, whether a hearing
//! was actioned, and whether punishments were removed as a side effect.
//! Downstream consumers key off these names; `PUNISHMENTS_DELETED` is the
//! only way they learn that punishments went away with another change.
//!
//! [`EventPublisher`] is the outbound port. [`TracingEventPublisher`] writes
//! events to the log; [`RecordingEventPublisher`] keeps them for tests.

use adj_core::{AgencyId, ChargeNumber, PrisonerNumber, Timestamp};
use adj_state::AdjudicationStatus;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// The operation that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOperation {
    CreateHearing,
    AmendHearing,
    DeleteHearing,
    CreateReferral,
    /// `outcome_only` is set when the case was still under referral and only
    /// the referral itself was removed.
    RemoveReferral {
        outcome_only: bool,
    },
    CreateAdjourn,
    RemoveAdjourn,
    CreateCompletedHearing,
    RemoveCompletedHearing,
    AmendHearingOutcome,
    CreateOutcome,
    CreateReferralOutcome,
    CreateQuashed,
    RemoveQuashed,
    CreatePunishments,
    UpdatePunishments,
    CreatePunishmentComment,
    UpdatePunishmentComment,
    DeletePunishmentComment,
    SetStatus,
    UpdateDamages,
    UpdateEvidence,
    UpdateWitnesses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjudicationEventType {
    ReportSubmitted,
    ReportAccepted,
    ReportReturned,
    ReportRejected,
    StatusUpdated,
    DamagesUpdated,
    EvidenceUpdated,
    WitnessesUpdated,
    HearingCreated,
    HearingUpdated,
    HearingDeleted,
    HearingReferralCreated,
    HearingReferralDeleted,
    HearingAdjournCreated,
    HearingAdjournDeleted,
    HearingCompletedCreated,
    HearingCompletedDeleted,
    HearingOutcomeUpdated,
    OutcomeUpdated,
    RefPoliceOutcome,
    NotProceedOutcome,
    ReferralOutcomeProsecution,
    ReferralOutcomeNotProceed,
    ReferralOutcomeScheduleHearing,
    ReferralOutcomeDeleted,
    ReferralDeleted,
    Quashed,
    Unquashed,
    PunishmentsCreated,
    PunishmentsUpdated,
    PunishmentsDeleted,
    PunishmentCommentCreated,
    PunishmentCommentUpdated,
    PunishmentCommentDeleted,
}

impl AdjudicationEventType {
    /// Name published to consumers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReportSubmitted => "adjudication.report.submitted",
            Self::ReportAccepted => "adjudication.report.accepted",
            Self::ReportReturned => "adjudication.report.returned",
            Self::ReportRejected => "adjudication.report.rejected",
            Self::StatusUpdated => "adjudication.status.updated",
            Self::DamagesUpdated => "adjudication.damages.updated",
            Self::EvidenceUpdated => "adjudication.evidence.updated",
            Self::WitnessesUpdated => "adjudication.witnesses.updated",
            Self::HearingCreated => "adjudication.hearing.created",
            Self::HearingUpdated => "adjudication.hearing.updated",
            Self::HearingDeleted => "adjudication.hearing.deleted",
            Self::HearingReferralCreated => "adjudication.hearingReferral.created",
            Self::HearingReferralDeleted => "adjudication.hearingReferral.deleted",
            Self::HearingAdjournCreated => "adjudication.hearingAdjourn.created",
            Self::HearingAdjournDeleted => "adjudication.hearingAdjourn.deleted",
            Self::HearingCompletedCreated => "adjudication.hearingCompleted.created",
            Self::HearingCompletedDeleted => "adjudication.hearingCompleted.deleted",
            Self::HearingOutcomeUpdated => "adjudication.hearingOutcome.updated",
            Self::OutcomeUpdated => "adjudication.outcome.updated",
            Self::RefPoliceOutcome => "adjudication.outcome.referPolice",
            Self::NotProceedOutcome => "adjudication.outcome.notProceed",
            Self::ReferralOutcomeProsecution => "adjudication.referralOutcome.prosecution",
            Self::ReferralOutcomeNotProceed => "adjudication.referralOutcome.notProceed",
            Self::ReferralOutcomeScheduleHearing => "adjudication.referralOutcome.scheduleHearing",
            Self::ReferralOutcomeDeleted => "adjudication.referralOutcome.deleted",
            Self::ReferralDeleted => "adjudication.referral.deleted",
            Self::Quashed => "adjudication.outcome.quashed",
            Self::Unquashed => "adjudication.outcome.unquashed",
            Self::PunishmentsCreated => "adjudication.punishments.created",
            Self::PunishmentsUpdated => "adjudication.punishments.updated",
            Self::PunishmentsDeleted => "adjudication.punishments.deleted",
            Self::PunishmentCommentCreated => "adjudication.punishmentComment.created",
            Self::PunishmentCommentUpdated => "adjudication.punishmentComment.updated",
            Self::PunishmentCommentDeleted => "adjudication.punishmentComment.deleted",
        }
    }
}

impl std::fmt::Display for AdjudicationEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event for a non-hearing outcome, by resulting status.
const OUTCOME_EVENTS: &[(AdjudicationStatus, AdjudicationEventType)] = &[
    (AdjudicationStatus::ReferPolice, AdjudicationEventType::RefPoliceOutcome),
    (AdjudicationStatus::NotProceed, AdjudicationEventType::NotProceedOutcome),
];

/// Event for a decision on a referral, by resulting status.
const REFERRAL_OUTCOME_EVENTS: &[(AdjudicationStatus, AdjudicationEventType)] = &[
    (
        AdjudicationStatus::Prosecution,
        AdjudicationEventType::ReferralOutcomeProsecution,
    ),
    (
        AdjudicationStatus::NotProceed,
        AdjudicationEventType::ReferralOutcomeNotProceed,
    ),
    (
        AdjudicationStatus::Unscheduled,
        AdjudicationEventType::ReferralOutcomeScheduleHearing,
    ),
];

/// Event for a reviewer status change, by resulting status.
const STATUS_EVENTS: &[(AdjudicationStatus, AdjudicationEventType)] = &[
    (AdjudicationStatus::AwaitingReview, AdjudicationEventType::ReportSubmitted),
    (AdjudicationStatus::Unscheduled, AdjudicationEventType::ReportAccepted),
    (AdjudicationStatus::Returned, AdjudicationEventType::ReportReturned),
    (AdjudicationStatus::Rejected, AdjudicationEventType::ReportRejected),
];

fn lookup(
    table: &[(AdjudicationStatus, AdjudicationEventType)],
    status: AdjudicationStatus,
    fallback: AdjudicationEventType,
) -> AdjudicationEventType {
    table
        .iter()
        .find(|(s, _)| *s == status)
        .map(|(_, e)| *e)
        .unwrap_or(fallback)
}

/// Events to publish for a completed operation.
pub fn select_events(
    operation: LifecycleOperation,
    resulting_status: AdjudicationStatus,
    hearing_actioned: bool,
    punishments_removed: bool,
) -> Vec<AdjudicationEventType> {
    use AdjudicationEventType as E;
    use LifecycleOperation as Op;

    let primary = match operation {
        Op::CreateHearing => E::HearingCreated,
        Op::AmendHearing => E::HearingUpdated,
        Op::DeleteHearing => E::HearingDeleted,
        Op::CreateReferral => E::HearingReferralCreated,
        Op::RemoveReferral { outcome_only: true } => E::ReferralOutcomeDeleted,
        Op::RemoveReferral { .. } if hearing_actioned => E::HearingReferralDeleted,
        Op::RemoveReferral { .. } => E::ReferralDeleted,
        Op::CreateAdjourn => E::HearingAdjournCreated,
        Op::RemoveAdjourn => E::HearingAdjournDeleted,
        Op::CreateCompletedHearing => E::HearingCompletedCreated,
        Op::RemoveCompletedHearing => E::HearingCompletedDeleted,
        Op::AmendHearingOutcome if hearing_actioned => E::HearingOutcomeUpdated,
        Op::AmendHearingOutcome => E::OutcomeUpdated,
        Op::CreateOutcome => lookup(OUTCOME_EVENTS, resulting_status, E::OutcomeUpdated),
        Op::CreateReferralOutcome => {
            lookup(REFERRAL_OUTCOME_EVENTS, resulting_status, E::OutcomeUpdated)
        }
        Op::CreateQuashed => E::Quashed,
        Op::RemoveQuashed => E::Unquashed,
        Op::CreatePunishments => E::PunishmentsCreated,
        Op::UpdatePunishments => E::PunishmentsUpdated,
        Op::CreatePunishmentComment => E::PunishmentCommentCreated,
        Op::UpdatePunishmentComment => E::PunishmentCommentUpdated,
        Op::DeletePunishmentComment => E::PunishmentCommentDeleted,
        Op::SetStatus => lookup(STATUS_EVENTS, resulting_status, E::StatusUpdated),
        Op::UpdateDamages => E::DamagesUpdated,
        Op::UpdateEvidence => E::EvidenceUpdated,
        Op::UpdateWitnesses => E::WitnessesUpdated,
    };

    let mut events = vec![primary];
    if punishments_removed {
        events.push(E::PunishmentsDeleted);
    }
    events
}

/// A published event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjudicationEvent {
    pub event_type: AdjudicationEventType,
    pub charge_number: ChargeNumber,
    pub prisoner_number: PrisonerNumber,
    pub agency_id: AgencyId,
    pub status: AdjudicationStatus,
    pub occurred_at: Timestamp,
}

/// Outbound port for domain events.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &AdjudicationEvent);
}

/// Writes each event to the log at `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: &AdjudicationEvent) {
        tracing::info!(
            event = event.event_type.as_str(),
            charge_number = %event.charge_number,
            prisoner_number = %event.prisoner_number,
            agency_id = %event.agency_id,
            status = %event.status,
            "domain event"
        );
    }
}

/// Keeps every published event in memory.
#[derive(Debug, Default)]
pub struct RecordingEventPublisher {
    events: Mutex<Vec<AdjudicationEvent>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AdjudicationEvent> {
        self.events.lock().clone()
    }

    pub fn event_types(&self) -> Vec<AdjudicationEventType> {
        self.events.lock().iter().map(|e| e.event_type).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: &AdjudicationEvent) {
        self.events.lock().push(event.clone());
    }
}
