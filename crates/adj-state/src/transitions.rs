//! # Transition Table
//!
//! The status graph as data. Every legality question (is this edge allowed,
//! is this status terminal, can history be unwound from here to there) is
//! answered by looking at [`TRANSITIONS`]; there is no per-status branching.
//!
//! ```text
//! AWAITING_REVIEW ──▶ RETURNED ──▶ AWAITING_REVIEW
//!        │      └───▶ REJECTED
//!        ▼
//!   UNSCHEDULED ◀──▶ SCHEDULED ──▶ ADJOURNED ──▶ SCHEDULED
//!     │                  │
//!     │                  ├──▶ REFER_POLICE | REFER_INAD | REFER_GOV ──▶ UNSCHEDULED | NOT_PROCEED
//!     │                  │         (REFER_POLICE also ──▶ PROSECUTION)
//!     │                  ├──▶ NOT_PROCEED | DISMISSED
//!     │                  └──▶ CHARGE_PROVED ──▶ QUASHED ──▶ UNSCHEDULED | SCHEDULED
//!     └──▶ REFER_POLICE | NOT_PROCEED   (outcomes recorded ahead of any hearing)
//! ```

use std::collections::VecDeque;

use crate::error::TransitionError;
use crate::status::AdjudicationStatus;
use crate::status::AdjudicationStatus::*;

/// The complete forward transition graph.
pub const TRANSITIONS: &[(AdjudicationStatus, &[AdjudicationStatus])] = &[
    (AwaitingReview, &[Returned, Rejected, Unscheduled]),
    (Returned, &[AwaitingReview]),
    (Rejected, &[]),
    (Unscheduled, &[Scheduled, ReferPolice, NotProceed]),
    (
        Scheduled,
        &[
            Unscheduled,
            Adjourned,
            ReferPolice,
            ReferInad,
            ReferGov,
            NotProceed,
            Dismissed,
            ChargeProved,
        ],
    ),
    (Adjourned, &[Scheduled]),
    (ReferPolice, &[Unscheduled, NotProceed, Prosecution]),
    (ReferInad, &[Unscheduled, NotProceed]),
    (ReferGov, &[Unscheduled, NotProceed]),
    (NotProceed, &[]),
    (Dismissed, &[]),
    (ChargeProved, &[Quashed]),
    (Quashed, &[Unscheduled, Scheduled]),
    (Prosecution, &[]),
];

/// The status every adjudication starts in.
pub const INITIAL_STATUS: AdjudicationStatus = AwaitingReview;

/// Statuses with no outgoing edges.
pub const TERMINAL_STATUSES: &[AdjudicationStatus] = &[Rejected, NotProceed, Dismissed, Prosecution];

/// Statuses meaning the case sits with another authority.
pub const REFERRAL_STATUSES: &[AdjudicationStatus] = &[ReferPolice, ReferInad, ReferGov];

/// Legal targets from `from`.
pub fn allowed_targets(from: AdjudicationStatus) -> &'static [AdjudicationStatus] {
    TRANSITIONS
        .iter()
        .find(|(source, _)| *source == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

/// Whether `from → to` is an edge of the graph.
pub fn is_allowed(from: AdjudicationStatus, to: AdjudicationStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Validate a single forward move.
///
/// # Errors
///
/// [`TransitionError::IllegalTransition`] when the edge is not in the table.
pub fn validate_transition(
    from: AdjudicationStatus,
    to: AdjudicationStatus,
) -> Result<(), TransitionError> {
    if is_allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::IllegalTransition { from, to })
    }
}

/// Whether `status` has no outgoing edges.
pub fn is_terminal(status: AdjudicationStatus) -> bool {
    TERMINAL_STATUSES.contains(&status)
}

/// Whether `status` is one of the referral statuses.
pub fn is_referral(status: AdjudicationStatus) -> bool {
    REFERRAL_STATUSES.contains(&status)
}

/// Whether `to` can be reached from `from` by following one or more edges.
pub fn is_reachable(from: AdjudicationStatus, to: AdjudicationStatus) -> bool {
    let mut seen = vec![from];
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        for next in allowed_targets(current) {
            if *next == to {
                return true;
            }
            if !seen.contains(next) {
                seen.push(*next);
                queue.push_back(*next);
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_status_exactly_once() {
        for status in AdjudicationStatus::ALL {
            let rows = TRANSITIONS.iter().filter(|(s, _)| *s == status).count();
            assert_eq!(rows, 1, "{status} must have exactly one row");
        }
    }

    #[test]
    fn terminal_statuses_have_no_edges() {
        for status in TERMINAL_STATUSES {
            assert!(allowed_targets(*status).is_empty(), "{status} has edges");
        }
    }

    #[test]
    fn every_status_reachable_from_initial() {
        for status in AdjudicationStatus::ALL {
            if status != INITIAL_STATUS {
                assert!(is_reachable(INITIAL_STATUS, status), "{status} unreachable");
            }
        }
    }

    #[test]
    fn referral_statuses_can_return_to_unscheduled() {
        for status in REFERRAL_STATUSES {
            assert!(is_allowed(*status, Unscheduled));
        }
    }

    #[test]
    fn only_police_referral_can_prosecute() {
        assert!(is_allowed(ReferPolice, Prosecution));
        assert!(!is_allowed(ReferInad, Prosecution));
        assert!(!is_allowed(ReferGov, Prosecution));
    }

    #[test]
    fn quashed_allows_redecision() {
        assert_eq!(allowed_targets(Quashed), &[Unscheduled, Scheduled]);
    }

    #[test]
    fn illegal_edge_reports_both_states() {
        let err = validate_transition(Dismissed, Scheduled).unwrap_err();
        assert_eq!(
            err,
            TransitionError::IllegalTransition {
                from: Dismissed,
                to: Scheduled
            }
        );
    }

    #[test]
    fn reachability_follows_multiple_edges() {
        assert!(is_reachable(Scheduled, Quashed));
        assert!(is_reachable(ReferPolice, Scheduled));
        assert!(!is_reachable(Dismissed, Scheduled));
        assert!(is_reachable(ChargeProved, Scheduled));
        assert!(!is_reachable(Prosecution, Unscheduled));
    }
}
