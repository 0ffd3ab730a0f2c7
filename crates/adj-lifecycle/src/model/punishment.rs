//! Punishments, their schedules, and punishment comments.

use adj_core::{ChargeNumber, CommentId, PunishmentId, Timestamp};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PunishmentType {
    Privilege,
    Earnings,
    Confinement,
    RemovalActivity,
    ExclusionWork,
    ExtraWork,
    RemovalWing,
    AdditionalDays,
    ProspectiveDays,
    DamagesOwed,
}

impl PunishmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Privilege => "PRIVILEGE",
            Self::Earnings => "EARNINGS",
            Self::Confinement => "CONFINEMENT",
            Self::RemovalActivity => "REMOVAL_ACTIVITY",
            Self::ExclusionWork => "EXCLUSION_WORK",
            Self::ExtraWork => "EXTRA_WORK",
            Self::RemovalWing => "REMOVAL_WING",
            Self::AdditionalDays => "ADDITIONAL_DAYS",
            Self::ProspectiveDays => "PROSPECTIVE_DAYS",
            Self::DamagesOwed => "DAMAGES_OWED",
        }
    }
}

impl std::fmt::Display for PunishmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Types served as extra days in custody. They carry no schedule dates and
/// are the only types that may run consecutively to another charge.
pub const ADDITIONAL_DAYS_TYPES: &[PunishmentType] =
    &[PunishmentType::AdditionalDays, PunishmentType::ProspectiveDays];

pub fn is_additional_days(punishment_type: PunishmentType) -> bool {
    ADDITIONAL_DAYS_TYPES.contains(&punishment_type)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivilegeType {
    Canteen,
    Facilities,
    Monies,
    Tv,
    Association,
    Gym,
    Other,
}

/// One scheduling of a punishment. A punishment's current schedule is the
/// last entry; earlier entries are history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunishmentSchedule {
    pub days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspended_until: Option<NaiveDate>,
}

impl PunishmentSchedule {
    pub fn is_suspended(&self) -> bool {
        self.suspended_until.is_some()
    }

    pub fn has_no_dates(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none() && self.suspended_until.is_none()
    }

    /// Whether `other` carries the same days and active window.
    pub fn same_window(&self, other: &PunishmentSchedule) -> bool {
        self.days == other.days
            && self.start_date == other.start_date
            && self.end_date == other.end_date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Punishment {
    pub id: PunishmentId,
    #[serde(rename = "type")]
    pub punishment_type: PunishmentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privilege_type: Option<PrivilegeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_privilege: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stoppage_percentage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub schedule: Vec<PunishmentSchedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consecutive_to_charge_number: Option<ChargeNumber>,
    /// Set on a legacy duplicate: the charge whose suspended punishment this
    /// copy activated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_from_charge_number: Option<ChargeNumber>,
    /// Set on a suspended punishment once another charge has activated it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activated_by_charge_number: Option<ChargeNumber>,
}

impl Punishment {
    /// The current schedule entry.
    pub fn latest_schedule(&self) -> Option<&PunishmentSchedule> {
        self.schedule.last()
    }

    /// Whether the current schedule is a suspension.
    pub fn is_suspended(&self) -> bool {
        self.latest_schedule().is_some_and(PunishmentSchedule::is_suspended)
    }

    /// Whether the punishment is suspended until `today` or later.
    pub fn is_suspended_on(&self, today: NaiveDate) -> bool {
        self.latest_schedule()
            .and_then(|s| s.suspended_until)
            .is_some_and(|until| until >= today)
    }

    /// Whether the punishment is in force on `today`: not suspended, and
    /// either undated or not yet ended.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        match self.latest_schedule() {
            Some(s) if s.is_suspended() => false,
            Some(s) => s.end_date.map_or(true, |end| end >= today),
            None => false,
        }
    }

    /// Whether the current schedule carries no dates at all.
    pub fn has_no_dates(&self) -> bool {
        self.latest_schedule().map_or(true, PunishmentSchedule::has_no_dates)
    }

    /// Whether this punishment matches `other` on type and privilege type.
    pub fn same_kind(&self, other: &Punishment) -> bool {
        self.punishment_type == other.punishment_type && self.privilege_type == other.privilege_type
    }
}

/// A free-text note on a charge's punishments, owned by its reporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunishmentComment {
    pub id: CommentId,
    pub comment: String,
    pub reporter: String,
    pub created_at: Timestamp,
}
