//! GROMACS-style topology text for a parameterized system.

use crate::core::models::system::{MolecularSystem, MoleculeRecord};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use thiserror::Error;

const NM_PER_ANGSTROM: f64 = 0.1;
const KJ_PER_KCAL: f64 = 4.184;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Atom {index} ('{name}') has no force-field parameters")]
    Unparameterized { index: usize, name: String },
}

/// Writes `[ defaults ]`, `[ atomtypes ]`, one `[ moleculetype ]` per species,
/// `[ system ]` and `[ molecules ]`.
///
/// Lennard-Jones parameters are converted from Angstrom/kcal to nm/kJ and the
/// Lorentz-Berthelot combination rule is declared. Molecule types are named
/// after their residue, with a numeric suffix when two species share one.
pub fn write_topology(
    system: &MolecularSystem,
    title: &str,
    writer: &mut impl Write,
) -> Result<(), TopologyError> {
    writeln!(writer, "; Generated by liquidbox")?;
    if let Some(ff) = &system.forcefield {
        writeln!(writer, "; force field: {}", ff)?;
    }
    writeln!(writer)?;
    writeln!(writer, "[ defaults ]")?;
    writeln!(writer, "; nbfunc  comb-rule  gen-pairs  fudgeLJ  fudgeQQ")?;
    writeln!(writer, "  1       2          yes        0.5      0.8333")?;
    writeln!(writer)?;

    writeln!(writer, "[ atomtypes ]")?;
    writeln!(writer, "; name      mass     charge  ptype  sigma(nm)     epsilon(kJ/mol)")?;
    let mut seen_types = HashSet::new();
    for (index, atom) in system.atoms.iter().enumerate() {
        let lj = atom.lj.ok_or_else(|| TopologyError::Unparameterized {
            index,
            name: atom.name.clone(),
        })?;
        if seen_types.insert(atom.force_field_type.as_str()) {
            writeln!(
                writer,
                "  {:<8} {:>9.4} {:>8.4}  A      {:>12.6e}  {:>12.6e}",
                atom.force_field_type,
                atom.mass(),
                0.0,
                lj.sigma * NM_PER_ANGSTROM,
                lj.epsilon * KJ_PER_KCAL
            )?;
        }
    }

    let mut type_names: HashMap<&str, String> = HashMap::new();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut first_of_species: Vec<&MoleculeRecord> = Vec::new();
    for molecule in &system.molecules {
        if type_names.contains_key(molecule.species.as_str()) {
            continue;
        }
        let mut name = molecule.residue_name.clone();
        let mut suffix = 2;
        while used_names.contains(&name) {
            name = format!("{}{}", molecule.residue_name, suffix);
            suffix += 1;
        }
        used_names.insert(name.clone());
        type_names.insert(molecule.species.as_str(), name);
        first_of_species.push(molecule);
    }

    for molecule in &first_of_species {
        let name = &type_names[molecule.species.as_str()];
        write_moleculetype(system, molecule, name, writer)?;
    }

    writeln!(writer)?;
    writeln!(writer, "[ system ]")?;
    writeln!(writer, "{}", title)?;
    writeln!(writer)?;
    writeln!(writer, "[ molecules ]")?;
    writeln!(writer, "; name      count")?;
    for (species, _, count) in system.molecule_blocks() {
        writeln!(writer, "  {:<10} {}", type_names[species], count)?;
    }
    Ok(())
}

fn write_moleculetype(
    system: &MolecularSystem,
    molecule: &MoleculeRecord,
    name: &str,
    writer: &mut impl Write,
) -> Result<(), TopologyError> {
    writeln!(writer)?;
    writeln!(writer, "; species: {}", molecule.species)?;
    writeln!(writer, "[ moleculetype ]")?;
    writeln!(writer, "; name      nrexcl")?;
    writeln!(writer, "  {:<10} 3", name)?;
    writeln!(writer)?;
    writeln!(writer, "[ atoms ]")?;
    writeln!(writer, ";  nr  type      resnr  residue  atom   cgnr  charge      mass")?;
    for (k, atom) in system.molecule_atoms(molecule).iter().enumerate() {
        writeln!(
            writer,
            "  {:>4}  {:<8}  {:>5}  {:<7}  {:<5}  {:>4}  {:>10.5}  {:>8.4}",
            k + 1,
            atom.force_field_type,
            1,
            molecule.residue_name,
            atom.name,
            k + 1,
            atom.partial_charge,
            atom.mass()
        )?;
    }

    let range = molecule.first_atom..molecule.first_atom + molecule.atom_count;
    let bonds: Vec<_> = system
        .bonds
        .iter()
        .filter(|b| range.contains(&b.i) && range.contains(&b.j))
        .collect();
    if !bonds.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "[ bonds ]")?;
        writeln!(writer, ";  ai    aj  funct")?;
        for bond in bonds {
            writeln!(
                writer,
                "  {:>4}  {:>4}  1",
                bond.i - molecule.first_atom + 1,
                bond.j - molecule.first_atom + 1
            )?;
        }
    }
    Ok(())
}

pub fn write_topology_path(
    system: &MolecularSystem,
    title: &str,
    path: &Path,
) -> Result<(), TopologyError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_topology(system, title, &mut writer)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::{Atom, LennardJones};
    use crate::core::models::element::Element;
    use crate::core::models::molecule::MoleculeTemplate;
    use crate::core::models::system::cubic_box;
    use crate::core::models::topology::{Bond, BondOrder};
    use nalgebra::Point3;

    fn parameterized(mut atom: Atom, ff_type: &str, sigma: f64, epsilon: f64) -> Atom {
        atom.force_field_type = ff_type.to_string();
        atom.lj = Some(LennardJones { sigma, epsilon });
        atom
    }

    fn system() -> MolecularSystem {
        let mut water = MoleculeTemplate::new("O", "HOH");
        water.atoms.push(parameterized(
            Atom::new("OW", Element::O, Point3::origin()),
            "O_3",
            3.15,
            0.152,
        ));
        water.atoms.push(parameterized(
            Atom::new("HW1", Element::H, Point3::origin()),
            "H_",
            0.4,
            0.046,
        ));
        water.bonds.push(Bond::new(0, 1, BondOrder::Single));
        let mut ion = MoleculeTemplate::new("[Na+]", "HOH");
        ion.atoms.push(parameterized(
            Atom::new("NA", Element::Na, Point3::origin()),
            "Na",
            2.5,
            0.1,
        ));

        let positions = vec![Point3::origin(); 1 + 2 * 3];
        let mut system =
            MolecularSystem::assemble(Some(&ion), &[(&water, 3)], &positions, cubic_box(10.0))
                .unwrap();
        system.forcefield = Some("test-ff".to_string());
        system
    }

    fn render(system: &MolecularSystem) -> String {
        let mut buffer = Vec::new();
        write_topology(system, "entry-0000", &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn writes_one_moleculetype_per_species_and_block_counts() {
        let text = render(&system());

        assert_eq!(text.matches("[ moleculetype ]").count(), 2);
        assert_eq!(text.matches("[ bonds ]").count(), 1);
        assert!(text.contains("; force field: test-ff"));
        let molecules = text.split("[ molecules ]").nth(1).unwrap();
        let rows: Vec<&str> = molecules
            .lines()
            .filter(|l| !l.trim().is_empty() && !l.starts_with(';'))
            .collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].trim_start().starts_with("HOH "));
        assert!(rows[0].trim_end().ends_with(" 1"));
        assert!(rows[1].trim_start().starts_with("HOH2"));
        assert!(rows[1].trim_end().ends_with(" 3"));
    }

    #[test]
    fn atom_types_are_listed_once_in_gromacs_units() {
        let text = render(&system());
        let types = text
            .split("[ atomtypes ]")
            .nth(1)
            .unwrap()
            .split("[ moleculetype ]")
            .next()
            .unwrap();
        assert_eq!(types.matches("O_3").count(), 1);
        assert!(types.contains("3.150000e-1"));
        assert!(types.contains("6.359680e-1"));
    }

    #[test]
    fn unparameterized_atoms_are_rejected() {
        let mut system = system();
        system.atoms[2].lj = None;
        let mut buffer = Vec::new();
        let err = write_topology(&system, "t", &mut buffer).unwrap_err();
        assert!(matches!(err, TopologyError::Unparameterized { index: 2, .. }));
    }
}
