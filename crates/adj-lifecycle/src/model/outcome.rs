//! Outcome records and the code tables that relate them to statuses and
//! hearing outcomes.

use adj_core::{OutcomeId, Timestamp};
use adj_state::AdjudicationStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::hearing::HearingOutcomeCode;

/// Code of an outcome record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeCode {
    /// Decision on a referral to hear the charge (again) in this establishment.
    ScheduleHearing,
    ReferPolice,
    ReferInad,
    ReferGov,
    NotProceed,
    Dismissed,
    ChargeProved,
    Prosecution,
    Quashed,
}

impl OutcomeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScheduleHearing => "SCHEDULE_HEARING",
            Self::ReferPolice => "REFER_POLICE",
            Self::ReferInad => "REFER_INAD",
            Self::ReferGov => "REFER_GOV",
            Self::NotProceed => "NOT_PROCEED",
            Self::Dismissed => "DISMISSED",
            Self::ChargeProved => "CHARGE_PROVED",
            Self::Prosecution => "PROSECUTION",
            Self::Quashed => "QUASHED",
        }
    }
}

impl std::fmt::Display for OutcomeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The status each outcome code leaves an adjudication in.
pub const OUTCOME_STATUS: &[(OutcomeCode, AdjudicationStatus)] = &[
    (OutcomeCode::ScheduleHearing, AdjudicationStatus::Unscheduled),
    (OutcomeCode::ReferPolice, AdjudicationStatus::ReferPolice),
    (OutcomeCode::ReferInad, AdjudicationStatus::ReferInad),
    (OutcomeCode::ReferGov, AdjudicationStatus::ReferGov),
    (OutcomeCode::NotProceed, AdjudicationStatus::NotProceed),
    (OutcomeCode::Dismissed, AdjudicationStatus::Dismissed),
    (OutcomeCode::ChargeProved, AdjudicationStatus::ChargeProved),
    (OutcomeCode::Prosecution, AdjudicationStatus::Prosecution),
    (OutcomeCode::Quashed, AdjudicationStatus::Quashed),
];

/// Referral hearing-outcome codes with their outcome code and status.
pub const REFERRAL_CODES: &[(HearingOutcomeCode, OutcomeCode, AdjudicationStatus)] = &[
    (
        HearingOutcomeCode::ReferPolice,
        OutcomeCode::ReferPolice,
        AdjudicationStatus::ReferPolice,
    ),
    (
        HearingOutcomeCode::ReferInad,
        OutcomeCode::ReferInad,
        AdjudicationStatus::ReferInad,
    ),
    (
        HearingOutcomeCode::ReferGov,
        OutcomeCode::ReferGov,
        AdjudicationStatus::ReferGov,
    ),
];

/// Outcome codes that close a hearing with `COMPLETE`.
pub const COMPLETED_HEARING_CODES: &[OutcomeCode] = &[
    OutcomeCode::Dismissed,
    OutcomeCode::NotProceed,
    OutcomeCode::ChargeProved,
];

/// Outcome codes that may be recorded without a hearing.
pub const NON_HEARING_CODES: &[OutcomeCode] = &[OutcomeCode::ReferPolice, OutcomeCode::NotProceed];

/// Status an outcome code leads to.
pub fn status_for(code: OutcomeCode) -> AdjudicationStatus {
    OUTCOME_STATUS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, status)| *status)
        .unwrap_or(AdjudicationStatus::Unscheduled)
}

/// Outcome code for a referral hearing-outcome code, if it is one.
pub fn referral_outcome_code(code: HearingOutcomeCode) -> Option<OutcomeCode> {
    REFERRAL_CODES
        .iter()
        .find(|(h, _, _)| *h == code)
        .map(|(_, o, _)| *o)
}

/// Hearing-outcome code for a referral outcome code, if it is one.
pub fn referral_hearing_code(code: OutcomeCode) -> Option<HearingOutcomeCode> {
    REFERRAL_CODES
        .iter()
        .find(|(_, o, _)| *o == code)
        .map(|(h, _, _)| *h)
}

/// Whether `code` is one of the referral outcome codes.
pub fn is_referral_code(code: OutcomeCode) -> bool {
    referral_hearing_code(code).is_some()
}

/// Whether `code` closes a hearing.
pub fn is_completed_hearing_code(code: OutcomeCode) -> bool {
    COMPLETED_HEARING_CODES.contains(&code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotProceedReason {
    AnotherWay,
    Released,
    WitnessNotAttend,
    Unfit,
    Flawed,
    ExpiredNotice,
    ExpiredHearing,
    NotFair,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuashedReason {
    FlawedCase,
    JudicialReview,
    AppealUpheld,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReferGovReason {
    ReviewForReferPolice,
    GovInquiry,
    Other,
}

/// A decision recorded on the charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    pub code: OutcomeCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<NotProceedReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quashed_reason: Option<QuashedReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refer_gov_reason: Option<ReferGovReason>,
    /// The decision taken on this referral, when one has been recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superseded_by: Option<OutcomeId>,
    /// Date of the latest hearing when a referral was recorded without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_hearing_at: Option<NaiveDateTime>,
    pub created_at: Timestamp,
}

impl Outcome {
    /// A new outcome with only its code set.
    pub fn new(code: OutcomeCode) -> Self {
        Self {
            id: OutcomeId::new(),
            code,
            details: None,
            reason: None,
            quashed_reason: None,
            refer_gov_reason: None,
            superseded_by: None,
            after_hearing_at: None,
            created_at: Timestamp::now(),
        }
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}
