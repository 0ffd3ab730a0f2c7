//! Fixtures shared by the unit tests of the manager modules.

use std::sync::Arc;

use adj_core::{AgencyId, ChargeNumber, HearingId, PrisonerNumber};
use adj_state::{apply, AdjudicationStatus, StatusChange};
use chrono::{NaiveDate, NaiveDateTime};

use crate::config::LifecycleConfig;
use crate::context::LifecycleContext;
use crate::events::RecordingEventPublisher;
use crate::model::{Hearing, OicHearingType, ReportedAdjudication};
use crate::repository::{AdjudicationRepository, InMemoryAdjudicationRepository};

pub(crate) struct Fixture {
    pub ctx: LifecycleContext,
    pub repo: Arc<InMemoryAdjudicationRepository>,
    pub events: Arc<RecordingEventPublisher>,
}

impl Fixture {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryAdjudicationRepository::new());
        let events = Arc::new(RecordingEventPublisher::new());
        let ctx = LifecycleContext::new(repo.clone(), events.clone(), LifecycleConfig::default())
            .with_today(today());
        Self { ctx, repo, events }
    }

    pub fn seed(&self, adjudication: ReportedAdjudication) -> ReportedAdjudication {
        self.repo.save(adjudication).unwrap()
    }

    pub fn get(&self, charge: &str) -> ReportedAdjudication {
        self.repo
            .find_by_charge_number(&charge_number(charge))
            .unwrap()
            .unwrap()
    }
}

pub(crate) fn today() -> NaiveDate {
    date(2026, 3, 1)
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(10, 0, 0).unwrap()
}

pub(crate) fn charge_number(charge: &str) -> ChargeNumber {
    ChargeNumber::new(charge).unwrap()
}

/// A reviewed charge with no hearing.
pub(crate) fn unscheduled(charge: &str, prisoner: &str) -> ReportedAdjudication {
    let mut adj = ReportedAdjudication::new(
        charge_number(charge),
        PrisonerNumber::new(prisoner).unwrap(),
        AgencyId::new("MDI").unwrap(),
    );
    apply(&mut adj, AdjudicationStatus::Unscheduled, StatusChange::default()).unwrap();
    adj
}

pub(crate) fn hearing_at(when: NaiveDateTime) -> Hearing {
    Hearing {
        id: HearingId::new(),
        location_id: 100,
        date_time_of_hearing: when,
        oic_hearing_type: OicHearingType::GovAdult,
        agency_id: AgencyId::new("MDI").unwrap(),
        hearing_outcome: None,
    }
}

/// A charge with one open hearing on 2026-02-01.
pub(crate) fn scheduled(charge: &str, prisoner: &str) -> ReportedAdjudication {
    let mut adj = unscheduled(charge, prisoner);
    adj.hearings.push(hearing_at(at(2026, 2, 1)));
    apply(&mut adj, AdjudicationStatus::Scheduled, StatusChange::default()).unwrap();
    adj
}
