//! # Reported Adjudication
//!
//! The aggregate root. Everything a charge owns (hearings, outcomes,
//! punishments, comments, reported damages/evidence/witnesses) lives inside
//! it and is saved with it. References to other charges are charge numbers,
//! resolved through the repository when needed.
//!
//! The status is held in an [`adj_state::StatusRecord`] that only the status
//! engine can write.

use adj_core::{AgencyId, ChargeNumber, HearingId, PrisonerNumber, Timestamp};
use adj_state::{AdjudicationStatus, StatusAuditEntry, StatusRecord, StatusTracked};
use serde::{Deserialize, Serialize};

use super::hearing::Hearing;
use super::outcome::Outcome;
use super::punishment::{Punishment, PunishmentComment};
use super::reported::{ReportedDamage, ReportedEvidence, ReportedWitness};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportedAdjudication {
    pub charge_number: ChargeNumber,
    pub prisoner_number: PrisonerNumber,
    pub originating_agency_id: AgencyId,
    /// Set when the prisoner has been transferred to another establishment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_agency_id: Option<AgencyId>,
    #[serde(default)]
    pub is_youth_offender: bool,
    /// Loaded from the legacy system rather than reported here.
    #[serde(default)]
    pub migrated: bool,
    #[serde(flatten)]
    status: StatusRecord,
    #[serde(default)]
    pub hearings: Vec<Hearing>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    #[serde(default)]
    pub punishments: Vec<Punishment>,
    #[serde(default)]
    pub punishment_comments: Vec<PunishmentComment>,
    #[serde(default)]
    pub damages: Vec<ReportedDamage>,
    #[serde(default)]
    pub evidence: Vec<ReportedEvidence>,
    #[serde(default)]
    pub witnesses: Vec<ReportedWitness>,
    pub created_at: Timestamp,
    /// Optimistic-concurrency counter, bumped by every save.
    #[serde(default)]
    pub version: u64,
}

impl ReportedAdjudication {
    /// A newly reported charge, awaiting review.
    pub fn new(
        charge_number: ChargeNumber,
        prisoner_number: PrisonerNumber,
        originating_agency_id: AgencyId,
    ) -> Self {
        Self {
            charge_number,
            prisoner_number,
            originating_agency_id,
            override_agency_id: None,
            is_youth_offender: false,
            migrated: false,
            status: StatusRecord::new(),
            hearings: Vec::new(),
            outcomes: Vec::new(),
            punishments: Vec::new(),
            punishment_comments: Vec::new(),
            damages: Vec::new(),
            evidence: Vec::new(),
            witnesses: Vec::new(),
            created_at: Timestamp::now(),
            version: 0,
        }
    }

    /// A charge loaded from the legacy system, already in `status`.
    pub fn migrated(
        charge_number: ChargeNumber,
        prisoner_number: PrisonerNumber,
        originating_agency_id: AgencyId,
        status: AdjudicationStatus,
    ) -> Self {
        Self {
            migrated: true,
            status: StatusRecord::imported(status, Some("MIGRATION".to_string())),
            ..Self::new(charge_number, prisoner_number, originating_agency_id)
        }
    }

    pub fn youth_offender(mut self, is_youth_offender: bool) -> Self {
        self.is_youth_offender = is_youth_offender;
        self
    }

    pub fn status(&self) -> AdjudicationStatus {
        self.status.status()
    }

    pub fn status_reason(&self) -> Option<&str> {
        self.status.reason()
    }

    pub fn status_details(&self) -> Option<&str> {
        self.status.details()
    }

    pub fn status_audit(&self) -> &[StatusAuditEntry] {
        self.status.audit()
    }

    /// The establishment currently responsible for the charge.
    pub fn agency(&self) -> &AgencyId {
        self.override_agency_id
            .as_ref()
            .unwrap_or(&self.originating_agency_id)
    }

    /// The hearing with the latest date-time. Ties go to the one added last.
    pub fn latest_hearing(&self) -> Option<&Hearing> {
        self.latest_hearing_index().map(|i| &self.hearings[i])
    }

    pub fn latest_hearing_mut(&mut self) -> Option<&mut Hearing> {
        self.latest_hearing_index().map(move |i| &mut self.hearings[i])
    }

    fn latest_hearing_index(&self) -> Option<usize> {
        self.hearings
            .iter()
            .enumerate()
            .max_by_key(|(_, h)| h.date_time_of_hearing)
            .map(|(i, _)| i)
    }

    /// The hearing `id`, or the latest hearing when no id is given.
    pub fn hearing_index(&self, id: Option<HearingId>) -> Option<usize> {
        match id {
            Some(id) => self.hearings.iter().position(|h| h.id == id),
            None => self.latest_hearing_index(),
        }
    }

    /// The most recently recorded outcome.
    pub fn latest_outcome(&self) -> Option<&Outcome> {
        self.outcomes.last()
    }
}

impl StatusTracked for ReportedAdjudication {
    fn status_record(&self) -> &StatusRecord {
        &self.status
    }

    fn status_record_mut(&mut self) -> &mut StatusRecord {
        &mut self.status
    }
}
