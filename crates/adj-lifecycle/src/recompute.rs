//! # Status Recomputation
//!
//! When a recorded decision is removed the status falls back to whatever the
//! remaining history says, not to a fixed predecessor:
//!
//! 1. The latest hearing has no outcome: `SCHEDULED`.
//! 2. The latest hearing was adjourned: `ADJOURNED`.
//! 3. Otherwise the latest outcome decides (`SCHEDULE_HEARING` means
//!    `UNSCHEDULED`; every other code maps to the status of the same name).
//! 4. No outcomes: `SCHEDULED` when there are hearings, else `UNSCHEDULED`.

use adj_state::{revert, AdjudicationStatus, StatusChange};

use crate::error::AdjudicationError;
use crate::model::outcome::status_for;
use crate::model::{HearingOutcomeCode, ReportedAdjudication};

/// The status the aggregate's hearings and outcomes imply.
pub fn derive_status(adjudication: &ReportedAdjudication) -> AdjudicationStatus {
    if let Some(hearing) = adjudication.latest_hearing() {
        match &hearing.hearing_outcome {
            None => return AdjudicationStatus::Scheduled,
            Some(outcome) if outcome.code == HearingOutcomeCode::Adjourn => {
                return AdjudicationStatus::Adjourned
            }
            Some(_) => {}
        }
    }
    match adjudication.latest_outcome() {
        Some(outcome) => status_for(outcome.code),
        None if adjudication.hearings.is_empty() => AdjudicationStatus::Unscheduled,
        None => AdjudicationStatus::Scheduled,
    }
}

/// Revert the status to what the remaining history implies.
pub(crate) fn settle_status(
    adjudication: &mut ReportedAdjudication,
    change: StatusChange,
) -> Result<AdjudicationStatus, AdjudicationError> {
    let target = derive_status(adjudication);
    tracing::debug!(
        charge_number = %adjudication.charge_number,
        from = %adjudication.status(),
        to = %target,
        "recomputed status"
    );
    revert(adjudication, target, change)?;
    Ok(target)
}
