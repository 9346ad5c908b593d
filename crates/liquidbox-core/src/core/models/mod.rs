//! Data models for box compositions and molecular structures.
//!
//! - [`species`] and [`box_entry`] describe *what* goes into a box: mixture
//!   recipes, solute/solvent pairs and the integer-count [`box_entry::BoxEntry`]
//!   compositions derived from them.
//! - [`atom`], [`element`], [`topology`], [`molecule`] and [`system`] describe
//!   *how* a box is realised: resolved molecular templates and the
//!   atom-resolved system assembled from packed coordinates.
//! - [`ids`] names the per-entry output directories.

pub mod atom;
pub mod box_entry;
pub mod element;
pub mod ids;
pub mod molecule;
pub mod species;
pub mod system;
pub mod topology;
