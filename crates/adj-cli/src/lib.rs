//! # adj-cli: Adjudications Command Line
//!
//! Provides the `adjudications` binary for working with a JSON store file of
//! reported adjudications outside any service.
//!
//! ## Subcommands
//!
//! - `adjudications transitions`: inspect the status transition graph.
//! - `adjudications report`: read-only punishment and charge queries.
//! - `adjudications repair-activations`: move legacy activation copies
//!   back onto their origin punishments.
//!
//! ```bash
//! adjudications transitions check --from SCHEDULED --to CHARGE_PROVED
//! adjudications --store data/adjudications.json report active --prisoner A1234AA
//! adjudications --store data/adjudications.json repair-activations --dry-run
//! ```

pub mod repair;
pub mod report;
pub mod store;
pub mod transitions;

#[cfg(test)]
mod test_support;
