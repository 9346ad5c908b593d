use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::system::{MolecularSystem, MoleculeRecord};
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

const ANGSTROM_PER_NM: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroMetadata {
    pub title: String,
}

impl Default for GroMetadata {
    fn default() -> Self {
        Self {
            title: "Generated by liquidbox".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum GroError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("File ended after {found} of {expected} atom lines")]
    Truncated { expected: usize, found: usize },
}

fn field(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

pub struct GroFile;

impl MolecularFile for GroFile {
    type Metadata = GroMetadata;
    type Error = GroError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut lines = reader.lines();
        let title = lines.next().transpose()?.unwrap_or_default();
        let count_line = lines.next().transpose()?.ok_or(GroError::Parse {
            line: 2,
            reason: "missing atom count".into(),
        })?;
        let expected: usize = count_line.trim().parse().map_err(|_| GroError::Parse {
            line: 2,
            reason: format!("invalid atom count '{}'", count_line.trim()),
        })?;

        let mut system = MolecularSystem::default();
        let mut current_residue: Option<(String, String)> = None;
        for k in 0..expected {
            let line_num = k + 3;
            let line = lines.next().transpose()?.ok_or(GroError::Truncated {
                expected,
                found: k,
            })?;
            let parse_err = |reason: String| GroError::Parse {
                line: line_num,
                reason,
            };
            let res_nr = field(&line, 0, 5).to_string();
            let res_name = field(&line, 5, 10).to_string();
            let name = field(&line, 10, 15);
            let coord = |start: usize| -> Result<f64, GroError> {
                let text = field(&line, start, start + 8);
                text.parse::<f64>()
                    .map(|v| v * ANGSTROM_PER_NM)
                    .map_err(|_| parse_err(format!("invalid coordinate '{}'", text)))
            };
            let position = Point3::new(coord(20)?, coord(28)?, coord(36)?);
            let element = Element::infer(name)
                .ok_or_else(|| parse_err(format!("cannot infer element of atom '{}'", name)))?;

            let index = system.atoms.len();
            let key = (res_nr, res_name.clone());
            if current_residue.as_ref() != Some(&key) {
                system.molecules.push(MoleculeRecord {
                    species: res_name.clone(),
                    residue_name: res_name,
                    residue_number: system.molecules.len() + 1,
                    first_atom: index,
                    atom_count: 0,
                });
                current_residue = Some(key);
            }
            if let Some(molecule) = system.molecules.last_mut() {
                molecule.atom_count += 1;
            }
            system.atoms.push(Atom::new(name, element, position));
        }

        let box_line = lines.next().transpose()?.ok_or(GroError::Parse {
            line: expected + 3,
            reason: "missing box line".into(),
        })?;
        let values: Vec<f64> = box_line
            .split_whitespace()
            .map(|v| v.parse::<f64>().map(|x| x * ANGSTROM_PER_NM))
            .collect::<Result<_, _>>()
            .map_err(|_| GroError::Parse {
                line: expected + 3,
                reason: format!("invalid box line '{}'", box_line.trim()),
            })?;
        system.box_vectors = match values.as_slice() {
            [x, y, z] => [[*x, 0.0, 0.0], [0.0, *y, 0.0], [0.0, 0.0, *z]],
            [v1x, v2y, v3z, v1y, v1z, v2x, v2z, v3x, v3y] => [
                [*v1x, *v1y, *v1z],
                [*v2x, *v2y, *v2z],
                [*v3x, *v3y, *v3z],
            ],
            _ => {
                return Err(GroError::Parse {
                    line: expected + 3,
                    reason: format!("box line needs 3 or 9 values, got {}", values.len()),
                });
            }
        };

        Ok((system, GroMetadata { title }))
    }

    /// Writes fixed-column GROMACS coordinates in nanometers.
    ///
    /// Residue and atom numbers wrap at 100000 as GROMACS expects.
    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", metadata.title)?;
        writeln!(writer, "{:>5}", system.atom_count())?;
        for molecule in &system.molecules {
            for (offset, atom) in system.molecule_atoms(molecule).iter().enumerate() {
                let p = atom.position / ANGSTROM_PER_NM;
                writeln!(
                    writer,
                    "{:>5}{:<5.5}{:>5.5}{:>5}{:>8.3}{:>8.3}{:>8.3}",
                    molecule.residue_number % 100_000,
                    molecule.residue_name,
                    atom.name,
                    (molecule.first_atom + offset + 1) % 100_000,
                    p.x,
                    p.y,
                    p.z
                )?;
            }
        }

        let b = system.box_vectors.map(|row| row.map(|v| v / ANGSTROM_PER_NM));
        let off_diagonal = [b[0][1], b[0][2], b[1][0], b[1][2], b[2][0], b[2][1]];
        if off_diagonal.iter().all(|v| *v == 0.0) {
            writeln!(writer, "{:>10.5}{:>10.5}{:>10.5}", b[0][0], b[1][1], b[2][2])?;
        } else {
            writeln!(
                writer,
                "{:>10.5}{:>10.5}{:>10.5}{:>10.5}{:>10.5}{:>10.5}{:>10.5}{:>10.5}{:>10.5}",
                b[0][0], b[1][1], b[2][2], b[0][1], b[0][2], b[1][0], b[1][2], b[2][0], b[2][1]
            )?;
        }
        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(system, &GroMetadata::default(), writer)
    }
}
