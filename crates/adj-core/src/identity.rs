//! # Identity Newtypes
//!
//! Identifiers used across the adjudication stack. Each identifier is a
//! distinct type: a [`PrisonerNumber`] cannot be passed where a
//! [`ChargeNumber`] is expected.
//!
//! ## Validation
//!
//! String-based identifiers ([`ChargeNumber`], [`PrisonerNumber`],
//! [`AgencyId`]) are trimmed and must be non-empty. Deserialization routes
//! through the same constructor, so a stored record with an empty charge
//! number is rejected at load time rather than accepted silently.
//! UUID-based identifiers are always valid by construction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Implement `Deserialize` for a validating string newtype by routing the
/// raw string through `new()`.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

macro_rules! string_identifier {
    ($(#[$meta:meta])* $ty:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $ty(String);

        impl $ty {
            /// Create a validated identifier. Surrounding whitespace is trimmed.
            pub fn new(value: impl Into<String>) -> Result<Self, CoreError> {
                let value = value.into();
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return Err(CoreError::InvalidIdentifier {
                        kind: $kind,
                        reason: "must not be empty".to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl_validating_deserialize!($ty);
    };
}

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $ty(Uuid);

        impl $ty {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $ty {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String-based identifiers
// ---------------------------------------------------------------------------

string_identifier!(
    /// Unique identifier of one disciplinary case; the aggregate key.
    ///
    /// Also used as the lookup key for every cross-case reference
    /// (activation, consecutive additional days).
    ChargeNumber,
    "charge number"
);

string_identifier!(
    /// Prison-service number of the prisoner the charge was raised against.
    PrisonerNumber,
    "prisoner number"
);

string_identifier!(
    /// Establishment (agency) code, e.g. `MDI`.
    AgencyId,
    "agency id"
);

// ---------------------------------------------------------------------------
// UUID-based identifiers (always valid by construction)
// ---------------------------------------------------------------------------

uuid_identifier!(
    /// Identifier of a hearing within an adjudication.
    HearingId
);

uuid_identifier!(
    /// Identifier of an outcome record within an adjudication.
    OutcomeId
);

uuid_identifier!(
    /// Identifier of a punishment. Stable across activation, so an origin
    /// punishment can be addressed from the activating charge.
    PunishmentId
);

uuid_identifier!(
    /// Identifier of a punishment comment.
    CommentId
);
