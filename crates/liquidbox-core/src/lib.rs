//! # liquidbox
//!
//! Enumerates the simulation boxes of a liquid-mixture campaign, packs and
//! parameterizes each box, and summarizes how well the resulting simulations
//! have equilibrated.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`BoxEntry`,
//!   `MoleculeTemplate`, `MolecularSystem`), file formats, and the default
//!   collaborators (template registry, packmol backend, force-field
//!   parameterizer, equilibration detector).
//!
//! - **[`engine`]: The Contracts.** Configuration with builders, the
//!   `EngineError` taxonomy, progress reporting, and the collaborator traits
//!   the workflows are written against.
//!
//! - **[`workflows`]: The Public API.** The box-spec generator, the
//!   per-entry packing orchestrator and the equilibration analyzer.

pub mod core;
pub mod engine;
pub mod workflows;
