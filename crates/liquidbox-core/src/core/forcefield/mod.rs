//! # Force Field Module
//!
//! Per-atom-type Lennard-Jones parameter sets loaded from TOML ([`params`]) and
//! the default [`Parameterizer`](crate::engine::collaborators::Parameterizer)
//! that applies them to an assembled system ([`parameterization`]).

pub mod parameterization;
pub mod params;

pub use parameterization::ForcefieldParameterizer;
