//! Contracts of the external collaborators the workflows orchestrate.
//!
//! Molecule resolution, physical packing, force-field parameterization and
//! equilibration detection are delegated through these traits. The crate ships
//! default implementations ([`crate::core::templates::TemplateRegistry`],
//! [`crate::core::packing::PackmolPacker`],
//! [`crate::core::forcefield::ForcefieldParameterizer`] and
//! [`crate::core::stats::AutocorrelationDetector`]); tests and other front-ends
//! can substitute their own.

use crate::core::models::molecule::MoleculeTemplate;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::path::Path;
use thiserror::Error;

/// Conversion factor from amu/Å³ to g/mL.
pub const AMU_PER_CUBIC_ANGSTROM_IN_G_PER_ML: f64 = 1.660_539_066_60;

#[derive(Debug, Error)]
pub enum StructureResolutionError {
    #[error("No structure is known for species '{species}'")]
    UnknownSpecies { species: String },
    #[error("Structure for species '{species}' is malformed: {reason}")]
    Malformed { species: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PackingError {
    #[error("Failed to launch packing program '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Packing could not satisfy the placement constraints: {0}")]
    Unsatisfied(String),
    #[error("Packing output is unusable: {0}")]
    Output(String),
    #[error("I/O error while packing: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParameterizationError {
    #[error("Force field '{forcefield}' has no parameters for atom type '{ff_type}' (atom '{atom_name}' of '{species}')")]
    MissingAtomType {
        forcefield: String,
        ff_type: String,
        atom_name: String,
        species: String,
    },
}

/// How the size of the packed box is determined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxTarget {
    /// A cubic box sized to reach the given mass density.
    Density { grams_per_ml: f64 },
    /// A fixed orthorhombic box.
    Dimensions { angstroms: [f64; 3] },
}

impl BoxTarget {
    /// Box edge lengths in Angstroms for a payload of `total_mass` g/mol.
    pub fn edges(&self, total_mass: f64) -> [f64; 3] {
        match *self {
            Self::Density { grams_per_ml } => {
                let volume = total_mass * AMU_PER_CUBIC_ANGSTROM_IN_G_PER_ML / grams_per_ml;
                let edge = volume.cbrt();
                [edge, edge, edge]
            }
            Self::Dimensions { angstroms } => angstroms,
        }
    }
}

/// Everything a packer needs to place the molecules of one box.
#[derive(Debug, Clone)]
pub struct PackingRequest<'a> {
    /// Bulk species and their copy counts, in output order.
    pub species: Vec<(&'a MoleculeTemplate, u32)>,
    /// A single embedded molecule placed before the bulk species.
    pub solute: Option<&'a MoleculeTemplate>,
    pub center_solute: bool,
    /// Minimum inter-atomic distance between molecules, in Angstroms.
    pub tolerance: f64,
    pub target: BoxTarget,
    /// Entry-scoped directory the packer may use for scratch files.
    pub working_directory: &'a Path,
}

impl PackingRequest<'_> {
    pub fn total_mass(&self) -> f64 {
        self.solute.map_or(0.0, MoleculeTemplate::mass)
            + self
                .species
                .iter()
                .map(|(t, n)| t.mass() * f64::from(*n))
                .sum::<f64>()
    }

    pub fn box_edges(&self) -> [f64; 3] {
        self.target.edges(self.total_mass())
    }
}

/// Coordinates for every atom instance plus the resulting periodic box.
///
/// Positions follow the request order: solute atoms first, then each bulk
/// species' copies.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedCoordinates {
    pub positions: Vec<Point3<f64>>,
    pub box_vectors: [[f64; 3]; 3],
}

/// The equilibration statistics of one time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquilibrationEstimate {
    /// Index of the first sample of the equilibrated region.
    pub t0: usize,
    /// Statistical inefficiency (≥ 1).
    pub g: f64,
    /// Effectively uncorrelated samples in the equilibrated region.
    pub neff_max: f64,
}

impl EquilibrationEstimate {
    /// Builds an estimate with `neff_max = (total_samples - t0) / g`.
    pub fn from_t0_and_g(total_samples: usize, t0: usize, g: f64) -> Self {
        Self {
            t0,
            g,
            neff_max: total_samples.saturating_sub(t0) as f64 / g,
        }
    }
}

pub trait StructureResolver {
    fn resolve(&self, species: &str) -> Result<MoleculeTemplate, StructureResolutionError>;
}

pub trait Packer {
    fn pack(&self, request: &PackingRequest<'_>) -> Result<PackedCoordinates, PackingError>;
}

pub trait Parameterizer {
    /// Name of the force field written to provenance and output files.
    fn forcefield_name(&self) -> &str;

    fn parameterize(&self, system: &mut MolecularSystem) -> Result<(), ParameterizationError>;
}

pub trait EquilibrationDetector {
    fn detect(&self, samples: &[f64]) -> EquilibrationEstimate;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;

    #[test]
    fn density_target_gives_cubic_box_of_matching_volume() {
        // 1000 waters at 1 g/mL occupy roughly 29.9 nm^3.
        let edges = BoxTarget::Density { grams_per_ml: 1.0 }.edges(18.015 * 1000.0);
        assert_eq!(edges[0], edges[1]);
        assert_eq!(edges[1], edges[2]);
        let volume = edges[0].powi(3);
        assert!((volume - 29_914.6).abs() < 0.1, "volume was {}", volume);
    }

    #[test]
    fn dimension_target_is_passed_through() {
        let target = BoxTarget::Dimensions {
            angstroms: [10.0, 20.0, 30.0],
        };
        assert_eq!(target.edges(1e6), [10.0, 20.0, 30.0]);
    }

    #[test]
    fn request_mass_counts_solute_and_copies() {
        let mut water = MoleculeTemplate::new("O", "HOH");
        water.atoms.push(Atom::new("O", Element::O, Point3::origin()));
        water.atoms.push(Atom::new("H1", Element::H, Point3::origin()));
        water.atoms.push(Atom::new("H2", Element::H, Point3::origin()));
        let mut ion = MoleculeTemplate::new("[Cl-]", "CL");
        ion.atoms.push(Atom::new("CL", Element::Cl, Point3::origin()));

        let request = PackingRequest {
            species: vec![(&water, 10)],
            solute: Some(&ion),
            center_solute: true,
            tolerance: 2.0,
            target: BoxTarget::Density { grams_per_ml: 1.0 },
            working_directory: Path::new("."),
        };
        assert!((request.total_mass() - (180.15 + 35.45)).abs() < 1e-9);
    }

    #[test]
    fn neff_follows_remaining_samples_over_g() {
        let estimate = EquilibrationEstimate::from_t0_and_g(1000, 100, 2.0);
        assert_eq!(estimate.t0, 100);
        assert_eq!(estimate.neff_max, 450.0);
    }
}
