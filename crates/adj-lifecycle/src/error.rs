//! # Lifecycle Error Types
//!
//! One error enum for every lifecycle operation. Each variant carries enough
//! context to explain the rejection without reading logs, and maps to a
//! status code for whatever transport layer sits on top.
//!
//! Every error is raised before the aggregate is saved: a rejected operation
//! never leaves a partially updated aggregate behind.

use adj_core::CoreError;
use adj_state::{AdjudicationStatus, TransitionError};
use thiserror::Error;

/// Errors arising from adjudication lifecycle operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdjudicationError {
    /// No adjudication, hearing, outcome, punishment or comment for the key.
    #[error("not found: {0}")]
    NotFound(String),

    /// The status move is not an edge of the transition table.
    #[error("illegal transition from {from} to {to}")]
    IllegalTransition {
        from: AdjudicationStatus,
        to: AdjudicationStatus,
    },

    /// A required field is missing or a value is not allowed here.
    #[error("validation error: {0}")]
    Validation(String),

    /// The actor does not own the sub-resource it is trying to change.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The request conflicts with the current aggregate state, or the
    /// aggregate was saved by someone else since it was loaded.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl AdjudicationError {
    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        self.status_and_code().0
    }

    /// Machine-readable error code (e.g. `NOT_FOUND`).
    pub fn error_code(&self) -> &'static str {
        self.status_and_code().1
    }

    fn status_and_code(&self) -> (u16, &'static str) {
        match self {
            Self::NotFound(_) => (404, "NOT_FOUND"),
            Self::IllegalTransition { .. } => (409, "ILLEGAL_TRANSITION"),
            Self::Validation(_) => (400, "VALIDATION_ERROR"),
            Self::Forbidden(_) => (403, "FORBIDDEN"),
            Self::Conflict(_) => (409, "CONFLICT"),
            Self::Repository(_) => (500, "REPOSITORY_ERROR"),
        }
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub(crate) fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<TransitionError> for AdjudicationError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::IllegalTransition { from, to } => Self::IllegalTransition { from, to },
            TransitionError::IllegalReversion { .. } => Self::Conflict(err.to_string()),
        }
    }
}

impl From<CoreError> for AdjudicationError {
    fn from(err: CoreError) -> Self {
        Self::Validation(err.to_string())
    }
}
