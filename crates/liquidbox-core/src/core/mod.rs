//! # Core Module
//!
//! Stateless building blocks used by the workflows.
//!
//! - **Data Models** ([`models`]) - Mixture recipes, box entries, molecular templates and systems
//! - **File I/O** ([`io`]) - Box-spec lists, campaign inputs, coordinate formats, topology text and run logs
//! - **Force Fields** ([`forcefield`]) - Lennard-Jones parameter sets and their assignment to atoms
//! - **Templates** ([`templates`]) - Species-to-structure registry
//! - **Packing** ([`packing`]) - The packmol backend
//! - **Statistics** ([`stats`]) - Statistical inefficiency and equilibration detection

pub mod forcefield;
pub mod io;
pub mod models;
pub mod packing;
pub mod stats;
pub mod templates;
