use super::atom::Atom;
use super::molecule::MoleculeTemplate;
use super::topology::Bond;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One molecule instance inside a [`MolecularSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoleculeRecord {
    pub species: String,
    pub residue_name: String,
    /// One-based residue number, unique within the system.
    pub residue_number: usize,
    pub first_atom: usize,
    pub atom_count: usize,
}

/// An atom-resolved, periodic system assembled from molecular templates.
///
/// Every atom of every molecule copy is stored explicitly; bonds use
/// system-wide atom indices. Once a force field has been applied `forcefield`
/// names it and every atom carries its interaction parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MolecularSystem {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    pub molecules: Vec<MoleculeRecord>,
    /// Periodic box vectors in Angstroms, one row per vector.
    pub box_vectors: [[f64; 3]; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forcefield: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("Received {received} atom positions but the topology has {expected} atoms")]
    PositionCountMismatch { expected: usize, received: usize },
}

impl MolecularSystem {
    /// Number of atoms obtained by replicating the templates.
    pub fn expected_atom_count(
        solute: Option<&MoleculeTemplate>,
        species: &[(&MoleculeTemplate, u32)],
    ) -> usize {
        solute.map_or(0, MoleculeTemplate::atom_count)
            + species
                .iter()
                .map(|(t, n)| t.atom_count() * *n as usize)
                .sum::<usize>()
    }

    /// Rebuilds the atom-resolved topology from templates and packed coordinates.
    ///
    /// The solute (if any) comes first, followed by each species replicated by
    /// its count in input order; `positions` must follow the same order.
    pub fn assemble(
        solute: Option<&MoleculeTemplate>,
        species: &[(&MoleculeTemplate, u32)],
        positions: &[Point3<f64>],
        box_vectors: [[f64; 3]; 3],
    ) -> Result<Self, AssemblyError> {
        let expected = Self::expected_atom_count(solute, species);
        if positions.len() != expected {
            return Err(AssemblyError::PositionCountMismatch {
                expected,
                received: positions.len(),
            });
        }

        let mut system = Self {
            box_vectors,
            ..Default::default()
        };
        let copies = solute
            .map(|t| (t, 1u32))
            .into_iter()
            .chain(species.iter().copied());
        for (template, count) in copies {
            for _ in 0..count {
                system.push_copy(template, positions);
            }
        }
        Ok(system)
    }

    fn push_copy(&mut self, template: &MoleculeTemplate, positions: &[Point3<f64>]) {
        let first_atom = self.atoms.len();
        for (offset, atom) in template.atoms.iter().enumerate() {
            let mut copy = atom.clone();
            copy.position = positions[first_atom + offset];
            self.atoms.push(copy);
        }
        self.bonds
            .extend(template.bonds.iter().map(|b| b.offset(first_atom)));
        self.molecules.push(MoleculeRecord {
            species: template.species.clone(),
            residue_name: template.residue_name.clone(),
            residue_number: self.molecules.len() + 1,
            first_atom,
            atom_count: template.atom_count(),
        });
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn molecule_count(&self) -> usize {
        self.molecules.len()
    }

    pub fn total_mass(&self) -> f64 {
        self.atoms.iter().map(Atom::mass).sum()
    }

    /// Consecutive runs of identical species, as `(species, residue name, count)`.
    pub fn molecule_blocks(&self) -> Vec<(&str, &str, usize)> {
        let mut blocks: Vec<(&str, &str, usize)> = Vec::new();
        for molecule in &self.molecules {
            match blocks.last_mut() {
                Some((species, _, count)) if *species == molecule.species => *count += 1,
                _ => blocks.push((molecule.species.as_str(), molecule.residue_name.as_str(), 1)),
            }
        }
        blocks
    }

    pub fn molecule_atoms(&self, molecule: &MoleculeRecord) -> &[Atom] {
        &self.atoms[molecule.first_atom..molecule.first_atom + molecule.atom_count]
    }

    pub fn is_parameterized(&self) -> bool {
        self.forcefield.is_some() && self.atoms.iter().all(Atom::is_parameterized)
    }
}

/// A cubic box of the given edge length, in the row-vector layout used by [`MolecularSystem`].
pub fn cubic_box(edge: f64) -> [[f64; 3]; 3] {
    [[edge, 0.0, 0.0], [0.0, edge, 0.0], [0.0, 0.0, edge]]
}

/// An orthorhombic box with the given edge lengths.
pub fn orthorhombic_box(edges: [f64; 3]) -> [[f64; 3]; 3] {
    [
        [edges[0], 0.0, 0.0],
        [0.0, edges[1], 0.0],
        [0.0, 0.0, edges[2]],
    ]
}
