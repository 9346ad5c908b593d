use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::system::{MolecularSystem, MoleculeRecord};
use crate::core::models::topology::{Bond, BondOrder};
use nalgebra::Point3;
use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BgfMetadata {
    /// Header records (`BIOGRF`, `DESCRP`, `REMARK`, `FORCEFIELD`, ...) in file order.
    pub header_lines: Vec<String>,
    pub format_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
}

#[derive(Debug, Error)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 80 chars)")]
    LineTooShort,
    #[error("Cannot infer an element from type '{ff_type}' or name '{name}'")]
    UnknownElement { ff_type: String, name: String },
    #[error("CRYSTX record needs three lengths and three angles")]
    InvalidCrystx,
    #[error("Invalid bond order '{value}' in ORDER record")]
    InvalidBondOrder { value: String },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_float(line: &str, line_num: usize, start: usize, end: usize) -> Result<f64, BgfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidFloat {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

fn parse_int<T: std::str::FromStr>(
    line: &str,
    line_num: usize,
    start: usize,
    end: usize,
) -> Result<T, BgfError> {
    let value = slice_and_trim(line, start, end);
    value.parse().map_err(|_| BgfError::Parse {
        line: line_num,
        kind: BgfParseErrorKind::InvalidInt {
            columns: format!("{}-{}", start + 1, end),
            value: value.into(),
        },
    })
}

/// Box vectors (rows) from cell lengths and angles in degrees.
fn box_from_cell(lengths: [f64; 3], angles: [f64; 3]) -> [[f64; 3]; 3] {
    let [a, b, c] = lengths;
    let [alpha, beta, gamma] = angles.map(f64::to_radians);
    let bx = b * gamma.cos();
    let by = b * gamma.sin();
    let cx = c * beta.cos();
    let cy = c * (alpha.cos() - beta.cos() * gamma.cos()) / gamma.sin();
    let cz = (c * c - cx * cx - cy * cy).max(0.0).sqrt();
    let clean = |v: f64| if v.abs() < 1e-9 { 0.0 } else { v };
    [
        [a, 0.0, 0.0],
        [clean(bx), clean(by), 0.0],
        [clean(cx), clean(cy), clean(cz)],
    ]
}

fn cell_from_box(vectors: &[[f64; 3]; 3]) -> ([f64; 3], [f64; 3]) {
    let norm = |v: &[f64; 3]| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    let angle = |u: &[f64; 3], v: &[f64; 3]| {
        let dot = u[0] * v[0] + u[1] * v[1] + u[2] * v[2];
        (dot / (norm(u) * norm(v))).clamp(-1.0, 1.0).acos().to_degrees()
    };
    let [a, b, c] = vectors;
    (
        [norm(a), norm(b), norm(c)],
        [angle(b, c), angle(a, c), angle(a, b)],
    )
}

fn has_box(vectors: &[[f64; 3]; 3]) -> bool {
    vectors.iter().flatten().any(|v| *v != 0.0)
}

pub struct BgfFile;

impl MolecularFile for BgfFile {
    type Metadata = BgfMetadata;
    type Error = BgfError;

    /// Reads atoms, connectivity and the periodic cell of a BGF file.
    ///
    /// Every change of chain or residue number starts a new molecule record,
    /// whose species is the residue name. Elements are inferred from the
    /// force-field type first and the atom name second.
    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut system = MolecularSystem::default();
        let mut metadata = BgfMetadata::default();
        let mut serial_to_index: HashMap<usize, usize> = HashMap::new();

        let mut conect: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        let mut orders: HashMap<usize, Vec<BondOrder>> = HashMap::new();
        let mut current_residue: Option<(String, isize)> = None;

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let Some(record_type) = line.split_whitespace().next() else {
                continue;
            };

            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 80 {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::LineTooShort,
                        });
                    }

                    let serial: usize = parse_int(&line, line_num, 7, 12)?;
                    let name = slice_and_trim(&line, 13, 18);
                    let res_name = slice_and_trim(&line, 19, 22);
                    let chain_id = slice_and_trim(&line, 23, 24).to_string();
                    let res_id: isize = parse_int(&line, line_num, 25, 30)?;
                    let x = parse_float(&line, line_num, 30, 40)?;
                    let y = parse_float(&line, line_num, 40, 50)?;
                    let z = parse_float(&line, line_num, 50, 60)?;
                    let ff_type = slice_and_trim(&line, 61, 66);
                    let charge = parse_float(&line, line_num, 72, 80)?;

                    if name.is_empty() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::MissingRequiredField {
                                columns: "14-18".into(),
                            },
                        });
                    }
                    if ff_type.is_empty() {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::MissingRequiredField {
                                columns: "62-66".into(),
                            },
                        });
                    }
                    let element = Element::infer(ff_type)
                        .or_else(|| Element::infer(name))
                        .ok_or_else(|| BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::UnknownElement {
                                ff_type: ff_type.into(),
                                name: name.into(),
                            },
                        })?;

                    let index = system.atoms.len();
                    if serial_to_index.insert(serial, index).is_some() {
                        return Err(BgfError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            serial
                        )));
                    }

                    let residue_key = (chain_id, res_id);
                    if current_residue.as_ref() != Some(&residue_key) {
                        system.molecules.push(MoleculeRecord {
                            species: res_name.to_string(),
                            residue_name: res_name.to_string(),
                            residue_number: system.molecules.len() + 1,
                            first_atom: index,
                            atom_count: 0,
                        });
                        current_residue = Some(residue_key);
                    }
                    if let Some(molecule) = system.molecules.last_mut() {
                        molecule.atom_count += 1;
                    }

                    let mut atom = Atom::new(name, element, Point3::new(x, y, z));
                    atom.force_field_type = ff_type.to_string();
                    atom.partial_charge = charge;
                    system.atoms.push(atom);
                }
                "CONECT" | "ORDER" => {
                    let mut parts = line.split_whitespace().skip(1);
                    let Some(Ok(center)) = parts.next().map(str::parse::<usize>) else {
                        continue;
                    };
                    if record_type == "CONECT" {
                        let partners = conect.entry(center).or_default();
                        partners.extend(parts.filter_map(|p| p.parse::<usize>().ok()));
                    } else {
                        let parsed = parts
                            .map(|p| {
                                p.parse::<BondOrder>().map_err(|_| BgfError::Parse {
                                    line: line_num,
                                    kind: BgfParseErrorKind::InvalidBondOrder { value: p.into() },
                                })
                            })
                            .collect::<Result<Vec<_>, _>>()?;
                        orders.entry(center).or_default().extend(parsed);
                    }
                }
                "CRYSTX" => {
                    let values: Vec<f64> = line
                        .split_whitespace()
                        .skip(1)
                        .filter_map(|v| v.parse().ok())
                        .collect();
                    if values.len() < 6 {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::InvalidCrystx,
                        });
                    }
                    system.box_vectors = box_from_cell(
                        [values[0], values[1], values[2]],
                        [values[3], values[4], values[5]],
                    );
                }
                "FORMAT" => metadata.format_lines.push(line.clone()),
                "END" => break,
                _ => metadata.header_lines.push(line.clone()),
            }
        }

        if system.atoms.is_empty() {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        let mut bonds: BTreeMap<(usize, usize), BondOrder> = BTreeMap::new();
        for (center, partners) in &conect {
            let lookup = |serial: &usize| {
                serial_to_index.get(serial).copied().ok_or_else(|| {
                    BgfError::Inconsistency(format!(
                        "CONECT references unknown atom serial {}",
                        serial
                    ))
                })
            };
            let i = lookup(center)?;
            for (k, partner) in partners.iter().enumerate() {
                let j = lookup(partner)?;
                let order = orders
                    .get(center)
                    .and_then(|o| o.get(k))
                    .copied()
                    .unwrap_or_default();
                let key = (i.min(j), i.max(j));
                let slot = bonds.entry(key).or_insert(order);
                if order != BondOrder::Single {
                    *slot = order;
                }
            }
        }
        system.bonds = bonds
            .into_iter()
            .map(|((i, j), order)| Bond::new(i, j, order))
            .collect();

        Ok((system, metadata))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in &metadata.header_lines {
            writeln!(writer, "{}", line)?;
        }
        if has_box(&system.box_vectors) {
            let (lengths, angles) = cell_from_box(&system.box_vectors);
            writeln!(
                writer,
                "CRYSTX {:>11.5}{:>11.5}{:>11.5}{:>11.5}{:>11.5}{:>11.5}",
                lengths[0], lengths[1], lengths[2], angles[0], angles[1], angles[2]
            )?;
        }
        for line in &metadata.format_lines {
            writeln!(writer, "{}", line)?;
        }

        let mut neighbors: BTreeMap<usize, Vec<(usize, BondOrder)>> = BTreeMap::new();
        for bond in &system.bonds {
            if bond.j >= system.atoms.len() {
                return Err(BgfError::Inconsistency(format!(
                    "Bond atom index {} not found",
                    bond.j
                )));
            }
            neighbors.entry(bond.i).or_default().push((bond.j, bond.order));
            neighbors.entry(bond.j).or_default().push((bond.i, bond.order));
        }

        for molecule in &system.molecules {
            for (offset, atom) in system.molecule_atoms(molecule).iter().enumerate() {
                let index = molecule.first_atom + offset;
                let bonded = neighbors.get(&index).map_or(0, Vec::len);
                writeln!(
                    writer,
                    "{:<6} {:>5} {:<5.5} {:<3.3} {:1} {:>5}{:>10.5}{:>10.5}{:>10.5} {:<5.5}{:>3}{:>2} {:>8.5}",
                    "HETATM",
                    index + 1,
                    atom.name,
                    molecule.residue_name,
                    "A",
                    molecule.residue_number,
                    atom.position.x,
                    atom.position.y,
                    atom.position.z,
                    atom.force_field_type,
                    bonded,
                    0,
                    atom.partial_charge
                )?;
            }
        }

        if !neighbors.is_empty() {
            writeln!(writer, "FORMAT CONECT (a6,12i6)")?;
            for (atom, conns) in &neighbors {
                write!(writer, "CONECT{:>6}", atom + 1)?;
                for (partner, _) in conns {
                    write!(writer, "{:>6}", partner + 1)?;
                }
                writeln!(writer)?;
                if conns.iter().any(|(_, o)| *o != BondOrder::Single) {
                    write!(writer, "ORDER {:>6}", atom + 1)?;
                    for (_, order) in conns {
                        write!(writer, "{:>6}", *order as u8)?;
                    }
                    writeln!(writer)?;
                }
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        let forcefield = system.forcefield.as_deref().unwrap_or("NONE");
        let metadata = BgfMetadata {
            header_lines: vec![
                "BIOGRF  332".to_string(),
                "REMARK Generated by liquidbox".to_string(),
                format!("FORCEFIELD {}", forcefield),
            ],
            format_lines: vec![
                "FORMAT ATOM   (a6,1x,i5,1x,a5,1x,a3,1x,a1,1x,a5,3f10.5,1x,a5,i3,i2,1x,f8.5)"
                    .to_string(),
            ],
        };
        Self::write_to(system, &metadata, writer)
    }
}
