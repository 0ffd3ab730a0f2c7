//! Lifecycle configuration.
//!
//! Defaults are built in. A YAML file may override them, and environment
//! variables override the file:
//!
//! - `ADJUDICATIONS_CORRUPTED_WINDOW_MONTHS` (default: 6)
//! - `ADJUDICATIONS_REPAIR_DRY_RUN` (default: false)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CORRUPTED_WINDOW_MONTHS_VAR: &str = "ADJUDICATIONS_CORRUPTED_WINDOW_MONTHS";
pub const REPAIR_DRY_RUN_VAR: &str = "ADJUDICATIONS_REPAIR_DRY_RUN";

const DEFAULT_CORRUPTED_WINDOW_MONTHS: u32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// How far back, in months, a migrated charge's latest hearing may be for
    /// its undated punishments to be offered as suspended.
    pub corrupted_window_months: u32,
    /// Report what the activation repair would change without saving.
    pub repair_dry_run: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            corrupted_window_months: DEFAULT_CORRUPTED_WINDOW_MONTHS,
            repair_dry_run: false,
        }
    }
}

impl LifecycleConfig {
    /// Defaults, overlaid by `path` when given, overlaid by the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.with_overrides(|var| std::env::var(var).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Apply overrides looked up through `lookup` (normally the environment).
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(raw) = lookup(CORRUPTED_WINDOW_MONTHS_VAR) {
            self.corrupted_window_months =
                raw.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                    var: CORRUPTED_WINDOW_MONTHS_VAR,
                    value: raw.clone(),
                })?;
        }
        if let Some(raw) = lookup(REPAIR_DRY_RUN_VAR) {
            self.repair_dry_run = parse_flag(&raw).ok_or_else(|| ConfigError::InvalidOverride {
                var: REPAIR_DRY_RUN_VAR,
                value: raw.clone(),
            })?;
        }
        Ok(self)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    YamlParse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid value for {var}: {value:?}")]
    InvalidOverride { var: &'static str, value: String },
}
