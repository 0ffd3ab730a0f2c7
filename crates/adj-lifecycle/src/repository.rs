//! # Aggregate Repository
//!
//! [`AdjudicationRepository`] is the single persistence port. Managers never
//! see it directly; they go through [`AggregateStore`], which adds the
//! load-mutate-save cycle every lifecycle operation follows.
//!
//! [`InMemoryAdjudicationRepository`] keeps aggregates in a
//! `parking_lot::RwLock` map and enforces optimistic concurrency on `version`.

use std::collections::BTreeMap;
use std::sync::Arc;

use adj_core::{ChargeNumber, PrisonerNumber};
use parking_lot::RwLock;

use crate::error::AdjudicationError;
use crate::model::ReportedAdjudication;

/// Persistence port for the adjudication aggregate.
pub trait AdjudicationRepository: Send + Sync {
    fn find_by_charge_number(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<Option<ReportedAdjudication>, AdjudicationError>;

    /// Store `adjudication` and return it with its version bumped.
    ///
    /// # Errors
    ///
    /// [`AdjudicationError::Conflict`] when the stored version differs from
    /// the one the caller loaded.
    fn save(
        &self,
        adjudication: ReportedAdjudication,
    ) -> Result<ReportedAdjudication, AdjudicationError>;

    fn find_by_prisoner(
        &self,
        prisoner_number: &PrisonerNumber,
    ) -> Result<Vec<ReportedAdjudication>, AdjudicationError>;

    /// Aggregates holding at least one punishment with an
    /// `activated_from_charge_number`.
    fn find_with_activated_from(&self) -> Result<Vec<ReportedAdjudication>, AdjudicationError>;

    fn all(&self) -> Result<Vec<ReportedAdjudication>, AdjudicationError>;
}

/// Thread-safe, cloneable in-memory repository ordered by charge number.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdjudicationRepository {
    data: Arc<RwLock<BTreeMap<ChargeNumber, ReportedAdjudication>>>,
}

impl InMemoryAdjudicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository holding `records` exactly as given (versions untouched).
    pub fn with_records(records: impl IntoIterator<Item = ReportedAdjudication>) -> Self {
        let data = records
            .into_iter()
            .map(|r| (r.charge_number.clone(), r))
            .collect();
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Every stored aggregate, in charge-number order.
    pub fn snapshot(&self) -> Vec<ReportedAdjudication> {
        self.data.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filtered(&self, keep: impl Fn(&ReportedAdjudication) -> bool) -> Vec<ReportedAdjudication> {
        self.data
            .read()
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

impl AdjudicationRepository for InMemoryAdjudicationRepository {
    fn find_by_charge_number(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<Option<ReportedAdjudication>, AdjudicationError> {
        Ok(self.data.read().get(charge_number).cloned())
    }

    fn save(
        &self,
        mut adjudication: ReportedAdjudication,
    ) -> Result<ReportedAdjudication, AdjudicationError> {
        let mut guard = self.data.write();
        if let Some(stored) = guard.get(&adjudication.charge_number) {
            if stored.version != adjudication.version {
                return Err(AdjudicationError::Conflict(format!(
                    "adjudication {} was modified concurrently (stored version {}, saving version {})",
                    adjudication.charge_number, stored.version, adjudication.version
                )));
            }
        }
        adjudication.version += 1;
        guard.insert(adjudication.charge_number.clone(), adjudication.clone());
        Ok(adjudication)
    }

    fn find_by_prisoner(
        &self,
        prisoner_number: &PrisonerNumber,
    ) -> Result<Vec<ReportedAdjudication>, AdjudicationError> {
        Ok(self.filtered(|r| &r.prisoner_number == prisoner_number))
    }

    fn find_with_activated_from(&self) -> Result<Vec<ReportedAdjudication>, AdjudicationError> {
        Ok(self.filtered(|r| {
            r.punishments
                .iter()
                .any(|p| p.activated_from_charge_number.is_some())
        }))
    }

    fn all(&self) -> Result<Vec<ReportedAdjudication>, AdjudicationError> {
        Ok(self.snapshot())
    }
}

/// Load-mutate-save access to aggregates.
#[derive(Clone)]
pub struct AggregateStore {
    repository: Arc<dyn AdjudicationRepository>,
}

impl AggregateStore {
    pub fn new(repository: Arc<dyn AdjudicationRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &dyn AdjudicationRepository {
        self.repository.as_ref()
    }

    pub fn find(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<Option<ReportedAdjudication>, AdjudicationError> {
        self.repository.find_by_charge_number(charge_number)
    }

    /// Load an aggregate that must exist.
    ///
    /// # Errors
    ///
    /// [`AdjudicationError::NotFound`] when there is no such charge.
    pub fn load(
        &self,
        charge_number: &ChargeNumber,
    ) -> Result<ReportedAdjudication, AdjudicationError> {
        self.find(charge_number)?.ok_or_else(|| {
            AdjudicationError::NotFound(format!("adjudication {charge_number}"))
        })
    }

    pub fn save(
        &self,
        adjudication: ReportedAdjudication,
    ) -> Result<ReportedAdjudication, AdjudicationError> {
        self.repository.save(adjudication)
    }

    /// Load `charge_number`, run `f` on a working copy, and save the copy if
    /// `f` succeeds. Nothing is saved when `f` fails.
    pub fn mutate<R>(
        &self,
        charge_number: &ChargeNumber,
        f: impl FnOnce(&mut ReportedAdjudication) -> Result<R, AdjudicationError>,
    ) -> Result<(ReportedAdjudication, R), AdjudicationError> {
        let mut working = self.load(charge_number)?;
        let result = f(&mut working)?;
        let saved = self.save(working)?;
        Ok((saved, result))
    }
}

impl std::fmt::Debug for AggregateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateStore").finish_non_exhaustive()
    }
}
