//! # Engine Module
//!
//! Configuration, errors, progress reporting and the collaborator contracts
//! shared by every workflow.
//!
//! - **Configuration** ([`config`]) - Generation, packing and analysis settings with builders
//! - **Collaborators** ([`collaborators`]) - Traits for structure resolution, packing,
//!   parameterization and equilibration detection
//! - **Progress Monitoring** ([`progress`]) - Events a front-end can render
//! - **Error Handling** ([`error`]) - The [`error::EngineError`] taxonomy

pub mod collaborators;
pub mod config;
pub mod error;
pub mod progress;
