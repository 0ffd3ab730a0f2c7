#![deny(missing_docs)]

//! # adj-core: Foundational Types for the Adjudication Stack
//!
//! This crate is the leaf of the workspace dependency graph. It defines the
//! primitives every other crate shares: identifier newtypes and UTC-only
//! timestamps. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ChargeNumber`, `PrisonerNumber`,
//!    `AgencyId`, `HearingId`, `OutcomeId`, `PunishmentId`. You cannot pass a
//!    prisoner number where a charge number is expected, and cross-aggregate
//!    references are always charge-number keys, never object references.
//!
//! 2. **Validated constructors.** String identifiers are trimmed and rejected
//!    when empty; construction is the only place that can fail.
//!
//! 3. **UTC-only timestamps.** Status audit entries and record creation times
//!    use [`Timestamp`], truncated to seconds.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `adj-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::CoreError;
pub use identity::{
    AgencyId, ChargeNumber, CommentId, HearingId, OutcomeId, PrisonerNumber, PunishmentId,
};
pub use temporal::Timestamp;
