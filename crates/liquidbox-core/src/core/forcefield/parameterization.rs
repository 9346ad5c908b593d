use super::params::Forcefield;
use crate::core::models::atom::LennardJones;
use crate::core::models::system::MolecularSystem;
use crate::engine::collaborators::{ParameterizationError, Parameterizer};
use tracing::debug;

/// Assigns per-type Lennard-Jones parameters from a loaded [`Forcefield`].
pub struct ForcefieldParameterizer {
    forcefield: Forcefield,
}

impl ForcefieldParameterizer {
    pub fn new(forcefield: Forcefield) -> Self {
        Self { forcefield }
    }

    pub fn forcefield(&self) -> &Forcefield {
        &self.forcefield
    }
}

impl Parameterizer for ForcefieldParameterizer {
    fn forcefield_name(&self) -> &str {
        &self.forcefield.globals.name
    }

    /// Parameterizes every atom or none: the system is left untouched when
    /// any atom type is unknown.
    fn parameterize(&self, system: &mut MolecularSystem) -> Result<(), ParameterizationError> {
        let mut assigned = Vec::with_capacity(system.atoms.len());
        for (index, atom) in system.atoms.iter().enumerate() {
            let vdw = self.forcefield.vdw(&atom.force_field_type).ok_or_else(|| {
                let species = system
                    .molecules
                    .iter()
                    .find(|m| (m.first_atom..m.first_atom + m.atom_count).contains(&index))
                    .map_or_else(String::new, |m| m.species.clone());
                ParameterizationError::MissingAtomType {
                    forcefield: self.forcefield.globals.name.clone(),
                    ff_type: atom.force_field_type.clone(),
                    atom_name: atom.name.clone(),
                    species,
                }
            })?;
            assigned.push(LennardJones {
                sigma: vdw.sigma(),
                epsilon: vdw.epsilon(),
            });
        }

        for (atom, lj) in system.atoms.iter_mut().zip(assigned) {
            atom.lj = Some(lj);
        }
        system.forcefield = Some(self.forcefield.globals.name.clone());
        debug!(
            atoms = system.atoms.len(),
            forcefield = %self.forcefield.globals.name,
            "Assigned Lennard-Jones parameters"
        );
        Ok(())
    }
}
