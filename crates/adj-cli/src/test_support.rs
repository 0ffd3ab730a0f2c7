//! Store files seeded through the lifecycle managers, for command tests.

use std::path::Path;
use std::sync::Arc;

use adj_core::{AgencyId, ChargeNumber, PrisonerNumber};
use adj_lifecycle::model::{OicHearingType, Plea, PunishmentType};
use adj_lifecycle::{
    CompletedHearingManager, CompletedHearingRequest, HearingLifecycleManager, HearingRequest,
    InMemoryAdjudicationRepository, LifecycleConfig, LifecycleContext, PunishmentLifecycleManager,
    PunishmentRequest, RecordingEventPublisher, ReportedAdjudication, ReviewManager,
};
use adj_state::AdjudicationStatus;
use chrono::NaiveDate;

use crate::store::save_store;

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn today() -> NaiveDate {
    date(2026, 3, 1)
}

pub(crate) fn charge(raw: &str) -> ChargeNumber {
    ChargeNumber::new(raw).unwrap()
}

pub(crate) struct Seeder {
    pub repo: Arc<InMemoryAdjudicationRepository>,
    ctx: LifecycleContext,
}

impl Seeder {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryAdjudicationRepository::new());
        let ctx = LifecycleContext::new(
            repo.clone(),
            Arc::new(RecordingEventPublisher::new()),
            LifecycleConfig::default(),
        )
        .with_today(today());
        Self { repo, ctx }
    }

    /// A charge proved at a hearing on 2026-02-01 carrying `punishments`.
    pub fn proved(&self, charge_number: &str, prisoner: &str, punishments: Vec<PunishmentRequest>) {
        let charge_number = charge(charge_number);
        let review = ReviewManager::new(self.ctx.clone());
        review
            .submit_report(ReportedAdjudication::new(
                charge_number.clone(),
                PrisonerNumber::new(prisoner).unwrap(),
                AgencyId::new("MDI").unwrap(),
            ))
            .unwrap();
        review
            .set_status(&charge_number, AdjudicationStatus::Unscheduled, None, None, "reviewer")
            .unwrap();
        HearingLifecycleManager::new(self.ctx.clone())
            .create_hearing(
                &charge_number,
                HearingRequest {
                    location_id: 1,
                    date_time_of_hearing: date(2026, 2, 1).and_hms_opt(10, 0, 0).unwrap(),
                    oic_hearing_type: OicHearingType::GovAdult,
                },
            )
            .unwrap();
        CompletedHearingManager::new(self.ctx.clone())
            .create_charge_proved(
                &charge_number,
                CompletedHearingRequest {
                    adjudicator: "adjudicator".into(),
                    plea: Plea::Guilty,
                    details: None,
                },
            )
            .unwrap();
        if !punishments.is_empty() {
            PunishmentLifecycleManager::new(self.ctx.clone())
                .create(&charge_number, punishments)
                .unwrap();
        }
    }

    pub fn write(&self, path: &Path) {
        save_store(path, &self.repo).unwrap();
    }
}

pub(crate) fn suspended_confinement() -> PunishmentRequest {
    let mut request = PunishmentRequest::new(PunishmentType::Confinement);
    request.days = 7;
    request.suspended_until = Some(date(2026, 8, 1));
    request
}

pub(crate) fn active_extra_work() -> PunishmentRequest {
    let mut request = PunishmentRequest::new(PunishmentType::ExtraWork);
    request.days = 10;
    request.start_date = Some(date(2026, 2, 20));
    request.end_date = Some(date(2026, 3, 10));
    request
}
