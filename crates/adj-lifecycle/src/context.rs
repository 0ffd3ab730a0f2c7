//! Shared wiring for the lifecycle managers.

use std::sync::Arc;

use adj_core::{ChargeNumber, Timestamp};
use chrono::NaiveDate;

use crate::config::LifecycleConfig;
use crate::error::AdjudicationError;
use crate::events::{
    select_events, AdjudicationEvent, AdjudicationEventType, EventPublisher, LifecycleOperation,
};
use crate::model::ReportedAdjudication;
use crate::repository::{AdjudicationRepository, AggregateStore};

/// What a mutating operation hands back.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionResult {
    pub adjudication: ReportedAdjudication,
    pub events: Vec<AdjudicationEventType>,
    pub hearing_actioned: bool,
    pub punishments_removed: bool,
}

/// Store, event publisher and configuration, shared by every manager.
#[derive(Clone)]
pub struct LifecycleContext {
    store: AggregateStore,
    publisher: Arc<dyn EventPublisher>,
    config: LifecycleConfig,
    today: Option<NaiveDate>,
}

impl LifecycleContext {
    pub fn new(
        repository: Arc<dyn AdjudicationRepository>,
        publisher: Arc<dyn EventPublisher>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            store: AggregateStore::new(repository),
            publisher,
            config,
            today: None,
        }
    }

    /// Pin the date used for suspension and window checks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn store(&self) -> &AggregateStore {
        &self.store
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub(crate) fn load(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<ReportedAdjudication, AdjudicationError> {
        self.store.load(charge_number)
    }

    /// Save the other aggregates `working` changed, then `working`, then publish.
    ///
    /// Each aggregate commits on its own. The related charges go first so a
    /// version conflict on one of them leaves `working` unsaved and the
    /// caller can retry the whole operation.
    pub(crate) fn commit(
        &self,
        working: ReportedAdjudication,
        related: Vec<ReportedAdjudication>,
        operation: LifecycleOperation,
        hearing_actioned: bool,
        punishments_removed: bool,
    ) -> Result<ActionResult, AdjudicationError> {
        for other in related {
            tracing::debug!(charge_number = %other.charge_number, "saving related adjudication");
            self.store.save(other)?;
        }
        let saved = self.store.save(working)?;
        let events = select_events(operation, saved.status(), hearing_actioned, punishments_removed);
        let occurred_at = Timestamp::now();
        for event_type in &events {
            self.publisher.publish(&AdjudicationEvent {
                event_type: *event_type,
                charge_number: saved.charge_number.clone(),
                prisoner_number: saved.prisoner_number.clone(),
                agency_id: saved.agency().clone(),
                status: saved.status(),
                occurred_at,
            });
        }
        Ok(ActionResult {
            adjudication: saved,
            events,
            hearing_actioned,
            punishments_removed,
        })
    }
}

impl std::fmt::Debug for LifecycleContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleContext")
            .field("config", &self.config)
            .field("today", &self.today)
            .finish_non_exhaustive()
    }
}
