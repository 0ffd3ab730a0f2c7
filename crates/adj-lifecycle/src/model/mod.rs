//! The adjudication aggregate and everything it owns.

pub mod adjudication;
pub mod hearing;
pub mod outcome;
pub mod punishment;
pub mod reported;

pub use adjudication::ReportedAdjudication;
pub use hearing::{AdjournReason, Hearing, HearingOutcome, HearingOutcomeCode, OicHearingType, Plea};
pub use outcome::{NotProceedReason, Outcome, OutcomeCode, QuashedReason, ReferGovReason};
pub use punishment::{
    PrivilegeType, Punishment, PunishmentComment, PunishmentSchedule, PunishmentType,
};
pub use reported::{
    merge_by_reporter, DamageCode, EvidenceCode, ReportedDamage, ReportedEvidence,
    ReportedWitness, ReporterOwned, WitnessCode,
};
