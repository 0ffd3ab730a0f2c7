//! Hearings and the outcome recorded against a hearing.

use adj_core::{AgencyId, HearingId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Type of hearing. The `*_YOI` types are for youth offenders; `GOV` is a
/// legacy type accepted for both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OicHearingType {
    GovAdult,
    GovYoi,
    InadAdult,
    InadYoi,
    Gov,
}

/// Hearing types a youth offender may be heard under.
pub const YOUTH_HEARING_TYPES: &[OicHearingType] =
    &[OicHearingType::GovYoi, OicHearingType::InadYoi, OicHearingType::Gov];

/// Hearing types an adult may be heard under.
pub const ADULT_HEARING_TYPES: &[OicHearingType] = &[
    OicHearingType::GovAdult,
    OicHearingType::InadAdult,
    OicHearingType::Gov,
];

/// Whether `hearing_type` matches the prisoner's youth/adult classification.
pub fn hearing_type_permitted(hearing_type: OicHearingType, is_youth_offender: bool) -> bool {
    let permitted = if is_youth_offender {
        YOUTH_HEARING_TYPES
    } else {
        ADULT_HEARING_TYPES
    };
    permitted.contains(&hearing_type)
}

/// Code of the outcome recorded on a hearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HearingOutcomeCode {
    ReferPolice,
    ReferInad,
    ReferGov,
    Adjourn,
    Complete,
    /// Outcome recorded in the legacy system; read-only here.
    Nomis,
}

impl HearingOutcomeCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReferPolice => "REFER_POLICE",
            Self::ReferInad => "REFER_INAD",
            Self::ReferGov => "REFER_GOV",
            Self::Adjourn => "ADJOURN",
            Self::Complete => "COMPLETE",
            Self::Nomis => "NOMIS",
        }
    }
}

impl std::fmt::Display for HearingOutcomeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a hearing was adjourned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjournReason {
    LegalAdvice,
    LegalRepresentation,
    RoAttend,
    Help,
    Unfit,
    Witness,
    WitnessSupport,
    Mckenzie,
    Evidence,
    Investigation,
    Other,
}

/// The prisoner's plea at a hearing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Plea {
    Unfit,
    Abstain,
    Guilty,
    NotGuilty,
    NotAsked,
}

/// The outcome recorded against one hearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HearingOutcome {
    pub code: HearingOutcomeCode,
    pub adjudicator: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<AdjournReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plea: Option<Plea>,
}

/// A hearing of the charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hearing {
    pub id: HearingId,
    pub location_id: i64,
    pub date_time_of_hearing: NaiveDateTime,
    pub oic_hearing_type: OicHearingType,
    pub agency_id: AgencyId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hearing_outcome: Option<HearingOutcome>,
}

impl Hearing {
    /// Whether an outcome with `code` is recorded on this hearing.
    pub fn has_outcome(&self, code: HearingOutcomeCode) -> bool {
        self.hearing_outcome.as_ref().is_some_and(|o| o.code == code)
    }
}
