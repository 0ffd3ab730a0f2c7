//! # Core Error Types
//!
//! Errors raised while constructing foundational values. Domain crates wrap
//! these in their own error enums via `#[from]`.

use thiserror::Error;

/// Error constructing a core primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// An identifier was empty or malformed.
    #[error("invalid {kind}: {reason}")]
    InvalidIdentifier {
        /// The identifier kind (e.g. "charge number").
        kind: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A timestamp string could not be parsed or was not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
