//! # Adjudication Status
//!
//! The fourteen lifecycle states of a reported adjudication. The enum carries
//! names only; which moves are legal, which states are terminal and which are
//! referrals live in the lookup tables of [`crate::transitions`].

use serde::{Deserialize, Serialize};

/// The lifecycle status of a reported adjudication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdjudicationStatus {
    /// Report submitted, waiting for a reviewer. Initial state.
    AwaitingReview,
    /// Sent back to the reporter for changes.
    Returned,
    /// Rejected by the reviewer. Terminal.
    Rejected,
    /// Accepted; no hearing scheduled.
    Unscheduled,
    /// A hearing is scheduled and has no outcome yet.
    Scheduled,
    /// The latest hearing was adjourned.
    Adjourned,
    /// Referred to the police.
    ReferPolice,
    /// Referred to the independent adjudicator.
    ReferInad,
    /// Referred back to the governor.
    ReferGov,
    /// Not proceeded with. Terminal.
    NotProceed,
    /// Dismissed at hearing. Terminal.
    Dismissed,
    /// Charge proved at hearing.
    ChargeProved,
    /// A proved charge was quashed.
    Quashed,
    /// Prosecuted by the police. Terminal.
    Prosecution,
}

impl AdjudicationStatus {
    /// Every status, in declaration order.
    pub const ALL: [AdjudicationStatus; 14] = [
        Self::AwaitingReview,
        Self::Returned,
        Self::Rejected,
        Self::Unscheduled,
        Self::Scheduled,
        Self::Adjourned,
        Self::ReferPolice,
        Self::ReferInad,
        Self::ReferGov,
        Self::NotProceed,
        Self::Dismissed,
        Self::ChargeProved,
        Self::Quashed,
        Self::Prosecution,
    ];

    /// The canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingReview => "AWAITING_REVIEW",
            Self::Returned => "RETURNED",
            Self::Rejected => "REJECTED",
            Self::Unscheduled => "UNSCHEDULED",
            Self::Scheduled => "SCHEDULED",
            Self::Adjourned => "ADJOURNED",
            Self::ReferPolice => "REFER_POLICE",
            Self::ReferInad => "REFER_INAD",
            Self::ReferGov => "REFER_GOV",
            Self::NotProceed => "NOT_PROCEED",
            Self::Dismissed => "DISMISSED",
            Self::ChargeProved => "CHARGE_PROVED",
            Self::Quashed => "QUASHED",
            Self::Prosecution => "PROSECUTION",
        }
    }

    /// Parse a canonical wire name. Returns `None` for anything else.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }
}

impl std::fmt::Display for AdjudicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
