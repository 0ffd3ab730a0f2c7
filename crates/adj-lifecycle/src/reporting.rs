//! # Reporting Queries
//!
//! Read-only projections over a prisoner's charges. Nothing here mutates an
//! aggregate; activation and the repair job use these lists to decide what
//! may be touched.
//!
//! "Today" is the context's date, so tests and batch runs can pin it.

use adj_core::{ChargeNumber, PrisonerNumber};
use adj_state::AdjudicationStatus;
use chrono::{Months, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::context::LifecycleContext;
use crate::error::AdjudicationError;
use crate::model::punishment::is_additional_days;
use crate::model::{Punishment, PunishmentType, ReportedAdjudication};

/// A punishment together with the charge that owns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargePunishment {
    pub charge_number: ChargeNumber,
    pub punishment: Punishment,
}

/// A punishment as printed on a charge's record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PunishmentView {
    pub punishment: Punishment,
    /// The charge the punishment was originally given on, when it is a
    /// suspended punishment activated by this charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activated_from_charge_number: Option<ChargeNumber>,
}

#[derive(Debug, Clone)]
pub struct ReportingQueries {
    ctx: LifecycleContext,
}

impl ReportingQueries {
    pub fn new(ctx: LifecycleContext) -> Self {
        Self { ctx }
    }

    /// Suspended punishments on the prisoner's other proved charges that are
    /// still suspended today and have not been activated.
    pub fn suspended_punishments(
        &self,
        prisoner_number: &PrisonerNumber,
        excluding: &ChargeNumber,
    ) -> Result<Vec<ChargePunishment>, AdjudicationError> {
        let today = self.ctx.today();
        let charges = self.other_charges(prisoner_number, excluding)?;
        Ok(collect(&charges, |adj, p| {
            adj.status() == AdjudicationStatus::ChargeProved
                && p.is_suspended_on(today)
                && p.activated_by_charge_number.is_none()
        }))
    }

    /// Punishments on migrated charges whose suspension was lost in
    /// migration: no schedule dates at all, heard within the configured
    /// window before today.
    pub fn corrupted_suspended_punishments(
        &self,
        prisoner_number: &PrisonerNumber,
        excluding: &ChargeNumber,
    ) -> Result<Vec<ChargePunishment>, AdjudicationError> {
        let today = self.ctx.today();
        let months = self.ctx.config().corrupted_window_months;
        let window_start = today
            .checked_sub_months(Months::new(months))
            .unwrap_or(NaiveDate::MIN);
        let charges = self.other_charges(prisoner_number, excluding)?;
        Ok(collect(&charges, |adj, p| {
            adj.migrated
                && heard_between(adj, window_start, today)
                && p.has_no_dates()
                && !is_additional_days(p.punishment_type)
                && p.activated_by_charge_number.is_none()
        }))
    }

    /// Everything `excluding` may activate: suspended plus corrupted.
    pub fn activatable(
        &self,
        prisoner_number: &PrisonerNumber,
        excluding: &ChargeNumber,
    ) -> Result<Vec<ChargePunishment>, AdjudicationError> {
        let mut found = self.suspended_punishments(prisoner_number, excluding)?;
        for corrupted in self.corrupted_suspended_punishments(prisoner_number, excluding)? {
            if !found.iter().any(|f| f.punishment.id == corrupted.punishment.id) {
                found.push(corrupted);
            }
        }
        Ok(found)
    }

    /// Punishments of `punishment_type` on other proved charges heard on the
    /// same day as `charge_number`, which a new punishment may run
    /// consecutively to.
    pub fn additional_days_for_consecutive(
        &self,
        charge_number: &ChargeNumber,
        punishment_type: PunishmentType,
    ) -> Result<Vec<ChargePunishment>, AdjudicationError> {
        if !is_additional_days(punishment_type) {
            return Err(AdjudicationError::validation(format!(
                "{punishment_type} cannot run consecutively"
            )));
        }
        let adj = self.ctx.store().load(charge_number)?;
        let Some(hearing_day) = latest_hearing_day(&adj) else {
            debug!(%charge_number, "no hearing, nothing to run consecutively to");
            return Ok(Vec::new());
        };
        let charges = self.other_charges(&adj.prisoner_number, charge_number)?;
        Ok(collect(&charges, |other, p| {
            other.status() == AdjudicationStatus::ChargeProved
                && latest_hearing_day(other) == Some(hearing_day)
                && p.punishment_type == punishment_type
        }))
    }

    /// Punishments in force today across all the prisoner's proved charges.
    pub fn active_punishments(
        &self,
        prisoner_number: &PrisonerNumber,
    ) -> Result<Vec<ChargePunishment>, AdjudicationError> {
        let today = self.ctx.today();
        let charges = self
            .ctx
            .store()
            .repository()
            .find_by_prisoner(prisoner_number)?;
        Ok(collect(&charges, |adj, p| {
            adj.status() == AdjudicationStatus::ChargeProved && p.is_active_on(today)
        }))
    }

    /// The charge's own punishments followed by the suspended punishments
    /// on other charges that it activated.
    pub fn punishment_view(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<Vec<PunishmentView>, AdjudicationError> {
        let adj = self.ctx.store().load(charge_number)?;
        let mut view: Vec<PunishmentView> = adj
            .punishments
            .iter()
            .map(|p| PunishmentView {
                punishment: p.clone(),
                activated_from_charge_number: p.activated_from_charge_number.clone(),
            })
            .collect();
        for origin in self.other_charges(&adj.prisoner_number, charge_number)? {
            for p in &origin.punishments {
                if p.activated_by_charge_number.as_ref() == Some(charge_number) {
                    view.push(PunishmentView {
                        punishment: p.clone(),
                        activated_from_charge_number: Some(origin.charge_number.clone()),
                    });
                }
            }
        }
        Ok(view)
    }

    fn other_charges(
        &self,
        prisoner_number: &PrisonerNumber,
        excluding: &ChargeNumber,
    ) -> Result<Vec<ReportedAdjudication>, AdjudicationError> {
        let mut charges = self
            .ctx
            .store()
            .repository()
            .find_by_prisoner(prisoner_number)?;
        charges.retain(|adj| &adj.charge_number != excluding);
        Ok(charges)
    }
}

fn collect(
    charges: &[ReportedAdjudication],
    keep: impl Fn(&ReportedAdjudication, &Punishment) -> bool,
) -> Vec<ChargePunishment> {
    charges
        .iter()
        .flat_map(|adj| {
            adj.punishments
                .iter()
                .filter(|p| keep(adj, p))
                .map(|p| ChargePunishment {
                    charge_number: adj.charge_number.clone(),
                    punishment: p.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn latest_hearing_day(adj: &ReportedAdjudication) -> Option<NaiveDate> {
    adj.latest_hearing().map(|h| h.date_time_of_hearing.date())
}

fn heard_between(adj: &ReportedAdjudication, from: NaiveDate, to: NaiveDate) -> bool {
    latest_hearing_day(adj).is_some_and(|day| day >= from && day <= to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PunishmentSchedule, Outcome, OutcomeCode};
    use crate::test_support::*;
    use adj_core::{AgencyId, PunishmentId};
    use adj_state::{apply, StatusChange};

    fn queries(fx: &Fixture) -> ReportingQueries {
        ReportingQueries::new(fx.ctx.clone())
    }

    fn prisoner() -> PrisonerNumber {
        PrisonerNumber::new("A1").unwrap()
    }

    fn punishment(punishment_type: PunishmentType, schedule: PunishmentSchedule) -> Punishment {
        Punishment {
            id: PunishmentId::new(),
            punishment_type,
            privilege_type: None,
            other_privilege: None,
            stoppage_percentage: None,
            amount: None,
            schedule: vec![schedule],
            consecutive_to_charge_number: None,
            activated_from_charge_number: None,
            activated_by_charge_number: None,
        }
    }

    fn suspended_until(until: NaiveDate) -> PunishmentSchedule {
        PunishmentSchedule {
            days: 10,
            start_date: None,
            end_date: None,
            suspended_until: Some(until),
        }
    }

    fn undated() -> PunishmentSchedule {
        PunishmentSchedule {
            days: 10,
            start_date: None,
            end_date: None,
            suspended_until: None,
        }
    }

    fn proved(charge: &str, punishments: Vec<Punishment>) -> ReportedAdjudication {
        let mut adj = scheduled(charge, "A1");
        adj.outcomes.push(Outcome::new(OutcomeCode::ChargeProved));
        apply(&mut adj, AdjudicationStatus::ChargeProved, StatusChange::default()).unwrap();
        adj.punishments = punishments;
        adj
    }

    fn migrated_heard_on(charge: &str, heard: NaiveDate, punishments: Vec<Punishment>) -> ReportedAdjudication {
        let mut adj = ReportedAdjudication::migrated(
            charge_number(charge),
            prisoner(),
            AgencyId::new("MDI").unwrap(),
            AdjudicationStatus::ChargeProved,
        );
        adj.hearings.push(hearing_at(heard.and_hms_opt(9, 0, 0).unwrap()));
        adj.punishments = punishments;
        adj
    }

    #[test]
    fn suspended_excludes_current_expired_and_activated() {
        let fx = Fixture::new();
        let live = punishment(PunishmentType::Confinement, suspended_until(date(2026, 6, 1)));
        let expired = punishment(PunishmentType::Confinement, suspended_until(date(2026, 2, 1)));
        let mut activated = punishment(PunishmentType::Earnings, suspended_until(date(2026, 6, 1)));
        activated.activated_by_charge_number = Some(charge_number("9"));
        let live_id = live.id;
        fx.seed(proved("1", vec![live, expired, activated]));
        fx.seed(proved(
            "2",
            vec![punishment(PunishmentType::Confinement, suspended_until(date(2026, 6, 1)))],
        ));

        let found = queries(&fx)
            .suspended_punishments(&prisoner(), &charge_number("2"))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].punishment.id, live_id);
        assert_eq!(found[0].charge_number, charge_number("1"));
    }

    #[test]
    fn corrupted_window_uses_latest_hearing() {
        let fx = Fixture::new();
        fx.seed(migrated_heard_on(
            "M1",
            date(2025, 12, 1),
            vec![punishment(PunishmentType::Confinement, undated())],
        ));
        fx.seed(migrated_heard_on(
            "M2",
            date(2025, 6, 1),
            vec![punishment(PunishmentType::Confinement, undated())],
        ));
        fx.seed(migrated_heard_on(
            "M3",
            date(2026, 1, 10),
            vec![punishment(PunishmentType::AdditionalDays, undated())],
        ));

        let found = queries(&fx)
            .corrupted_suspended_punishments(&prisoner(), &charge_number("2"))
            .unwrap();
        let charges: Vec<_> = found.iter().map(|f| f.charge_number.as_str()).collect();
        assert_eq!(charges, vec!["M1"]);
    }

    #[test]
    fn activatable_is_the_union() {
        let fx = Fixture::new();
        fx.seed(proved(
            "1",
            vec![punishment(PunishmentType::Confinement, suspended_until(date(2026, 6, 1)))],
        ));
        fx.seed(migrated_heard_on(
            "M1",
            date(2026, 1, 1),
            vec![punishment(PunishmentType::Confinement, undated())],
        ));
        let found = queries(&fx).activatable(&prisoner(), &charge_number("2")).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn consecutive_candidates_share_hearing_day() {
        let fx = Fixture::new();
        fx.seed(proved("1", vec![punishment(PunishmentType::AdditionalDays, undated())]));
        fx.seed(proved("2", vec![punishment(PunishmentType::AdditionalDays, undated())]));
        let mut other_day = proved("3", vec![punishment(PunishmentType::AdditionalDays, undated())]);
        other_day.hearings[0].date_time_of_hearing = at(2026, 2, 2);
        fx.seed(other_day);

        let found = queries(&fx)
            .additional_days_for_consecutive(&charge_number("1"), PunishmentType::AdditionalDays)
            .unwrap();
        let charges: Vec<_> = found.iter().map(|f| f.charge_number.as_str()).collect();
        assert_eq!(charges, vec!["2"]);

        let none = queries(&fx)
            .additional_days_for_consecutive(&charge_number("1"), PunishmentType::ProspectiveDays)
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn consecutive_rejects_other_types() {
        let fx = Fixture::new();
        fx.seed(proved("1", Vec::new()));
        let err = queries(&fx)
            .additional_days_for_consecutive(&charge_number("1"), PunishmentType::Confinement)
            .unwrap_err();
        assert!(matches!(err, AdjudicationError::Validation(_)));
    }

    #[test]
    fn consecutive_without_hearing_is_empty() {
        let fx = Fixture::new();
        fx.seed(unscheduled("1", "A1"));
        let found = queries(&fx)
            .additional_days_for_consecutive(&charge_number("1"), PunishmentType::AdditionalDays)
            .unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn view_includes_activations_on_origins() {
        let fx = Fixture::new();
        let mut origin = punishment(PunishmentType::Confinement, suspended_until(date(2026, 6, 1)));
        origin.activated_by_charge_number = Some(charge_number("2"));
        origin.schedule.push(PunishmentSchedule {
            days: 10,
            start_date: Some(date(2026, 3, 1)),
            end_date: Some(date(2026, 3, 10)),
            suspended_until: None,
        });
        fx.seed(proved("1", vec![origin]));
        fx.seed(proved("2", vec![punishment(PunishmentType::ExtraWork, undated())]));

        let view = queries(&fx).punishment_view(&charge_number("2")).unwrap();
        assert_eq!(view.len(), 2);
        assert_eq!(view[0].activated_from_charge_number, None);
        assert_eq!(view[1].activated_from_charge_number, Some(charge_number("1")));

        let active = queries(&fx).active_punishments(&prisoner()).unwrap();
        assert_eq!(active.len(), 2);
    }
}
