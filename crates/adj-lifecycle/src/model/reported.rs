//! Damages, evidence and witnesses attached to the report.
//!
//! Each entry belongs to the reporter who added it. An edit by one reporter
//! replaces that reporter's entries and leaves everyone else's alone; see
//! [`merge_by_reporter`].

use serde::{Deserialize, Serialize};

/// An entry attributed to a reporter.
pub trait ReporterOwned {
    fn reporter(&self) -> &str;
}

/// Replace `reporter`'s entries in `existing` with `replacement`.
///
/// Entries owned by other reporters keep their order and come first; the
/// replacement entries follow. `existing` is not modified.
pub fn merge_by_reporter<T>(existing: &[T], reporter: &str, replacement: Vec<T>) -> Vec<T>
where
    T: ReporterOwned + Clone,
{
    existing
        .iter()
        .filter(|entry| entry.reporter() != reporter)
        .cloned()
        .chain(replacement)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DamageCode {
    ElectricalRepair,
    PlumbingRepair,
    FurnitureOrFabricRepair,
    LockRepair,
    Redecoration,
    Cleaning,
    ReplaceAnItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvidenceCode {
    Photo,
    BodyWornCamera,
    Cctv,
    BaggedAndTagged,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WitnessCode {
    Officer,
    Staff,
    OtherPerson,
    Victim,
    Prisoner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedDamage {
    pub code: DamageCode,
    pub details: String,
    pub reporter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedEvidence {
    pub code: EvidenceCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub details: String,
    pub reporter: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportedWitness {
    pub code: WitnessCode,
    pub first_name: String,
    pub last_name: String,
    pub reporter: String,
}

impl ReporterOwned for ReportedDamage {
    fn reporter(&self) -> &str {
        &self.reporter
    }
}

impl ReporterOwned for ReportedEvidence {
    fn reporter(&self) -> &str {
        &self.reporter
    }
}

impl ReporterOwned for ReportedWitness {
    fn reporter(&self) -> &str {
        &self.reporter
    }
}
