//! Status engine errors.

use thiserror::Error;

use crate::status::AdjudicationStatus;

/// A rejected status move.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// `from → to` is not an edge of the transition table.
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        from: AdjudicationStatus,
        to: AdjudicationStatus,
    },

    /// A reversion to `to` was requested but the current status cannot
    /// have been reached from it.
    #[error("cannot revert from {from} to {to}: {from} is not reachable from {to}")]
    IllegalReversion {
        from: AdjudicationStatus,
        to: AdjudicationStatus,
    },
}
