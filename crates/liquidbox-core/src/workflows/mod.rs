//! # Workflows Module
//!
//! The top-level entry points of a campaign, one per stage:
//!
//! - **Box-spec generation** ([`generate`]) - Expands mixture recipes, pure
//!   solvents and solute/solvent pairs into a deduplicated, deterministically
//!   ordered list of box compositions.
//! - **Packing** ([`pack`]) - Packs, parameterizes and writes out a single
//!   entry of that list, addressed by index, into its own directory.
//! - **Equilibration analysis** ([`equilibration`]) - Scans the run logs of
//!   every entry and aggregates per-observable equilibration statistics.
//!
//! Each stage is a batch job driven by a configuration struct from
//! [`crate::engine::config`] and reports progress through a
//! [`crate::engine::progress::ProgressReporter`].

pub mod equilibration;
pub mod generate;
pub mod pack;
