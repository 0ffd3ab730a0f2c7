//! # Property Tests
//!
//! Randomised checks over the status engine, status recomputation and
//! event selection.

use adj_lifecycle::{select_events, AdjudicationEventType, LifecycleOperation};
use adj_state::transitions::{is_allowed, is_reachable};
use adj_state::{apply, revert, AdjudicationStatus, StatusChange, StatusRecord, TransitionKind};
use proptest::prelude::*;

fn any_status() -> impl Strategy<Value = AdjudicationStatus> {
    prop::sample::select(AdjudicationStatus::ALL.to_vec())
}

fn any_operation() -> impl Strategy<Value = LifecycleOperation> {
    use LifecycleOperation::*;
    prop::sample::select(vec![
        CreateHearing,
        AmendHearing,
        DeleteHearing,
        CreateReferral,
        RemoveReferral { outcome_only: true },
        RemoveReferral { outcome_only: false },
        CreateAdjourn,
        RemoveAdjourn,
        CreateCompletedHearing,
        RemoveCompletedHearing,
        AmendHearingOutcome,
        CreateOutcome,
        CreateReferralOutcome,
        CreateQuashed,
        RemoveQuashed,
        CreatePunishments,
        UpdatePunishments,
        CreatePunishmentComment,
        UpdatePunishmentComment,
        DeletePunishmentComment,
        SetStatus,
        UpdateDamages,
        UpdateEvidence,
        UpdateWitnesses,
    ])
}

proptest! {
    /// Starting anywhere, the audit trail is a connected chain: each entry
    /// starts where the previous one ended.
    #[test]
    fn audit_trail_is_a_chain(
        start in any_status(),
        targets in prop::collection::vec(any_status(), 0..50),
    ) {
        let mut record = StatusRecord::imported(start, None);
        for to in targets {
            let _ = apply(&mut record, to, StatusChange::default());
        }
        let audit = record.audit();
        for pair in audit.windows(2) {
            prop_assert_eq!(pair[0].to, pair[1].from);
        }
        if let Some(last) = audit.last() {
            prop_assert_eq!(last.to, record.status());
        }
    }

    /// Every status passed through on a forward walk can be reverted to.
    #[test]
    fn forward_walk_is_revertible(targets in prop::collection::vec(any_status(), 0..30)) {
        let mut record = StatusRecord::new();
        let mut visited = vec![record.status()];
        for to in targets {
            if apply(&mut record, to, StatusChange::default()).is_ok() {
                visited.push(to);
            }
        }
        let current = record.status();
        for earlier in visited {
            prop_assert!(earlier == current || is_reachable(earlier, current));
            let mut copy = record.clone();
            prop_assert!(revert(&mut copy, earlier, StatusChange::default()).is_ok());
            prop_assert_eq!(copy.status(), earlier);
        }
    }

    /// Mixed applies and reverts never log an entry for a rejected move.
    #[test]
    fn rejected_moves_leave_no_trace(
        moves in prop::collection::vec((any::<bool>(), any_status()), 0..40),
    ) {
        let mut record = StatusRecord::new();
        for (forward, to) in moves {
            let before = record.audit().len();
            let from = record.status();
            let result = if forward {
                apply(&mut record, to, StatusChange::default())
            } else {
                revert(&mut record, to, StatusChange::default())
            };
            match result {
                Ok(()) if forward => {
                    prop_assert!(is_allowed(from, to));
                    prop_assert_eq!(record.audit().len(), before + 1);
                    prop_assert_eq!(record.audit()[before].kind, TransitionKind::Forward);
                }
                Ok(()) if from == to => prop_assert_eq!(record.audit().len(), before),
                Ok(()) => {
                    prop_assert_eq!(record.audit().len(), before + 1);
                    prop_assert_eq!(record.audit()[before].kind, TransitionKind::Reversion);
                }
                Err(_) => {
                    prop_assert_eq!(record.audit().len(), before);
                    prop_assert_eq!(record.status(), from);
                }
            }
        }
    }

    /// One primary event, plus a punishments-deleted event exactly when
    /// punishments went.
    #[test]
    fn event_selection_shape(
        operation in any_operation(),
        status in any_status(),
        hearing_actioned in any::<bool>(),
        punishments_removed in any::<bool>(),
    ) {
        let events = select_events(operation, status, hearing_actioned, punishments_removed);
        let expected_len = if punishments_removed { 2 } else { 1 };
        prop_assert_eq!(events.len(), expected_len);
        prop_assert_ne!(events[0], AdjudicationEventType::PunishmentsDeleted);
        prop_assert_eq!(
            events.last() == Some(&AdjudicationEventType::PunishmentsDeleted),
            punishments_removed
        );
    }
}
