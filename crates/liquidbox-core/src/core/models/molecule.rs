use super::atom::Atom;
use super::topology::Bond;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A resolved molecular structure used as the template for every copy of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeTemplate {
    /// The species identifier the template was resolved from.
    pub species: String,
    /// Short residue label written to coordinate files.
    pub residue_name: String,
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
}

impl MoleculeTemplate {
    pub fn new(species: impl Into<String>, residue_name: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            residue_name: residue_name.into(),
            atoms: Vec::new(),
            bonds: Vec::new(),
        }
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Molecular mass in g/mol.
    pub fn mass(&self) -> f64 {
        self.atoms.iter().map(Atom::mass).sum()
    }

    /// Geometric center of the template's atoms, or the origin for an empty template.
    pub fn centroid(&self) -> Point3<f64> {
        if self.atoms.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.atoms.iter().map(|a| a.position.coords).sum();
        Point3::from(sum / self.atoms.len() as f64)
    }

    /// Atom positions translated so that the centroid sits at the origin.
    pub fn centered_positions(&self) -> Vec<Point3<f64>> {
        let shift = self.centroid().coords;
        self.atoms.iter().map(|a| a.position - shift).collect()
    }
}
