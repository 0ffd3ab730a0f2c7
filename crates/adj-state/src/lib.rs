//! # adj-state: Adjudication Status Engine
//!
//! The status graph of a reported adjudication and the engine that moves an
//! adjudication along it.
//!
//! - [`status`]: the fourteen statuses.
//! - [`transitions`]: the transition table and the lookups derived from it.
//! - [`engine`]: [`StatusRecord`], [`apply`] and [`revert`]. Every status
//!   write in the stack goes through here and leaves an audit entry.

pub mod engine;
pub mod error;
pub mod status;
pub mod transitions;

pub use engine::{
    apply, revert, StatusAuditEntry, StatusChange, StatusRecord, StatusTracked, TransitionKind,
};
pub use error::TransitionError;
pub use status::AdjudicationStatus;
