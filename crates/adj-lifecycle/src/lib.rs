//! # adj-lifecycle: Adjudication Lifecycle
//!
//! Everything that happens to a reported charge after submission, built on
//! the status engine in `adj-state`:
//!
//! - **Hearings** (`hearings.rs`): scheduling, referrals and adjournments,
//!   including the staged removal of a referral.
//! - **Completed hearings** (`completed.rs`): dismissed, not proceeded with,
//!   or charge proved.
//! - **Outcomes** (`outcomes.rs`): outcomes recorded without a hearing,
//!   decisions on referrals, quashing.
//! - **Amendment** (`amendment.rs`): correcting the outcome of the latest
//!   hearing, in place or by recreating it under another status.
//! - **Punishments** (`punishments.rs`): validation, activation of suspended
//!   punishments on other charges, comments.
//! - **Repair** (`repair.rs`): batch job moving legacy activation duplicates
//!   back onto their origin punishments.
//! - **Reporting** (`reporting.rs`): read-only punishment projections.
//! - **Review** (`review.rs`): submission, reviewer status changes, and the
//!   reporter-owned damages, evidence and witness lists.
//! - **Events** (`events.rs`): which domain events an operation publishes.
//!
//! Every mutating operation loads a working copy of the aggregate, changes
//! it, and commits it through [`LifecycleContext`]: one save (plus one per
//! other charge it touched), then event publication. A failed operation
//! saves nothing.
//!
//! ## Crate Policy
//!
//! - Depends on `adj-core` and `adj-state` internally.
//! - Status is only ever written through `adj_state::apply` and
//!   `adj_state::revert`.

pub mod amendment;
pub mod completed;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod hearings;
pub mod model;
pub mod outcomes;
pub mod punishments;
pub mod recompute;
pub mod repair;
pub mod reporting;
pub mod repository;
pub mod review;

#[cfg(test)]
mod test_support;

pub use amendment::{AmendmentCoordinator, HearingOutcomeAmendment};
pub use completed::{CompletedHearingManager, CompletedHearingRequest};
pub use config::{ConfigError, LifecycleConfig};
pub use context::{ActionResult, LifecycleContext};
pub use error::AdjudicationError;
pub use events::{
    select_events, AdjudicationEvent, AdjudicationEventType, EventPublisher, LifecycleOperation,
    RecordingEventPublisher, TracingEventPublisher,
};
pub use hearings::{
    AdjournRequest, HearingLifecycleManager, HearingRequest, ReferralRemoval, ReferralRequest,
};
pub use model::ReportedAdjudication;
pub use outcomes::{OutcomeManager, OutcomeRequest};
pub use punishments::{ActivationRef, PunishmentLifecycleManager, PunishmentRequest};
pub use recompute::derive_status;
pub use repair::{ActivatedSuspendedRepair, RepairReport, RepairedActivation};
pub use reporting::{ChargePunishment, PunishmentView, ReportingQueries};
pub use repository::{AdjudicationRepository, AggregateStore, InMemoryAdjudicationRepository};
pub use review::ReviewManager;
