//! # Status Transition Engine
//!
//! The only writer of an adjudication's status. A [`StatusRecord`] keeps the
//! current status, the reason and details attached to it, and the append-only
//! audit trail of every move. Its fields are private to this crate, so code
//! outside the engine can read the status but can only change it through
//! [`apply`] or [`revert`].
//!
//! Forward moves must be edges of [`crate::transitions::TRANSITIONS`].
//! Reversions (used when a recorded decision is deleted) may jump back to
//! any status from which the current one is reachable; they are tagged as
//! such in the audit trail.

use adj_core::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::status::AdjudicationStatus;
use crate::transitions::{self, INITIAL_STATUS};

/// How an audit entry came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionKind {
    /// A forward edge of the table.
    Forward,
    /// A step back after a recorded decision was removed.
    Reversion,
    /// A record loaded from a legacy system in a non-initial status.
    Import,
}

/// One row of the status audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusAuditEntry {
    pub from: AdjudicationStatus,
    pub to: AdjudicationStatus,
    pub kind: TransitionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub at: Timestamp,
}

/// The optional context attached to a status move.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusChange {
    pub reason: Option<String>,
    pub details: Option<String>,
    pub actor: Option<String>,
}

impl StatusChange {
    /// A change made by `actor` with no reason or details.
    pub fn by(actor: impl Into<String>) -> Self {
        Self {
            actor: Some(actor.into()),
            ..Self::default()
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Current status plus its audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    status: AdjudicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    status_details: Option<String>,
    #[serde(default)]
    status_audit: Vec<StatusAuditEntry>,
}

impl StatusRecord {
    /// A fresh record in the initial status with an empty trail.
    pub fn new() -> Self {
        Self {
            status: INITIAL_STATUS,
            status_reason: None,
            status_details: None,
            status_audit: Vec::new(),
        }
    }

    /// A record loaded from a legacy system already in `status`.
    ///
    /// The trail starts with a single [`TransitionKind::Import`] entry from
    /// the initial status, so the record still shows how it got where it is.
    pub fn imported(status: AdjudicationStatus, actor: Option<String>) -> Self {
        let mut record = Self::new();
        if status != INITIAL_STATUS {
            record.push(status, TransitionKind::Import, StatusChange {
                actor,
                ..StatusChange::default()
            });
        }
        record
    }

    pub fn status(&self) -> AdjudicationStatus {
        self.status
    }

    pub fn reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }

    pub fn details(&self) -> Option<&str> {
        self.status_details.as_deref()
    }

    /// The audit trail, oldest first.
    pub fn audit(&self) -> &[StatusAuditEntry] {
        &self.status_audit
    }

    fn push(&mut self, to: AdjudicationStatus, kind: TransitionKind, change: StatusChange) {
        self.status_audit.push(StatusAuditEntry {
            from: self.status,
            to,
            kind,
            reason: change.reason.clone(),
            details: change.details.clone(),
            actor: change.actor,
            at: Timestamp::now(),
        });
        self.status = to;
        self.status_reason = change.reason;
        self.status_details = change.details;
    }
}

impl Default for StatusRecord {
    fn default() -> Self {
        Self::new()
    }
}

/// Anything that owns a [`StatusRecord`].
pub trait StatusTracked {
    fn status_record(&self) -> &StatusRecord;
    fn status_record_mut(&mut self) -> &mut StatusRecord;
}

impl StatusTracked for StatusRecord {
    fn status_record(&self) -> &StatusRecord {
        self
    }

    fn status_record_mut(&mut self) -> &mut StatusRecord {
        self
    }
}

/// Move `target` forward to `to`.
///
/// On success the status, reason and details are replaced and exactly one
/// [`TransitionKind::Forward`] entry is appended. On failure nothing changes.
///
/// # Errors
///
/// [`TransitionError::IllegalTransition`] when `current → to` is not in the
/// table.
pub fn apply<T: StatusTracked + ?Sized>(
    target: &mut T,
    to: AdjudicationStatus,
    change: StatusChange,
) -> Result<(), TransitionError> {
    let record = target.status_record_mut();
    transitions::validate_transition(record.status, to)?;
    record.push(to, TransitionKind::Forward, change);
    Ok(())
}

/// Step `target` back to `to` after the decision that moved it was removed.
///
/// Allowed when the current status is reachable from `to`. Reverting to the
/// current status is a no-op and appends nothing.
///
/// # Errors
///
/// [`TransitionError::IllegalReversion`] when the current status cannot have
/// followed `to`.
pub fn revert<T: StatusTracked + ?Sized>(
    target: &mut T,
    to: AdjudicationStatus,
    change: StatusChange,
) -> Result<(), TransitionError> {
    let record = target.status_record_mut();
    let from = record.status;
    if from == to {
        return Ok(());
    }
    if !transitions::is_reachable(to, from) {
        return Err(TransitionError::IllegalReversion { from, to });
    }
    record.push(to, TransitionKind::Reversion, change);
    Ok(())
}
