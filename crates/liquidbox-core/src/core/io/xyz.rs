use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::element::Element;
use crate::core::models::system::MolecularSystem;
use nalgebra::Point3;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XyzMetadata {
    pub comment: String,
}

#[derive(Debug, Error)]
pub enum XyzError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },
    #[error("File ended after {found} of {expected} atom lines")]
    Truncated { expected: usize, found: usize },
}

/// Plain XYZ: an atom count, a comment line, then `symbol x y z` per atom.
///
/// The format carries no residues or bonds; a system read from it has atoms only.
pub struct XyzFile;

impl MolecularFile for XyzFile {
    type Metadata = XyzMetadata;
    type Error = XyzError;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        let mut lines = reader.lines();
        let count_line = lines.next().transpose()?.ok_or(XyzError::Parse {
            line: 1,
            reason: "missing atom count".into(),
        })?;
        let expected: usize = count_line.trim().parse().map_err(|_| XyzError::Parse {
            line: 1,
            reason: format!("invalid atom count '{}'", count_line.trim()),
        })?;
        let comment = lines.next().transpose()?.unwrap_or_default();

        let mut system = MolecularSystem::default();
        for k in 0..expected {
            let line_num = k + 3;
            let line = lines.next().transpose()?.ok_or(XyzError::Truncated {
                expected,
                found: k,
            })?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            let [label, x, y, z, ..] = parts.as_slice() else {
                return Err(XyzError::Parse {
                    line: line_num,
                    reason: format!("expected 'symbol x y z', got '{}'", line.trim()),
                });
            };
            let element = Element::infer(label).ok_or_else(|| XyzError::Parse {
                line: line_num,
                reason: format!("unknown element '{}'", label),
            })?;
            let coord = |text: &str| {
                text.parse::<f64>().map_err(|_| XyzError::Parse {
                    line: line_num,
                    reason: format!("invalid coordinate '{}'", text),
                })
            };
            let position = Point3::new(coord(*x)?, coord(*y)?, coord(*z)?);
            system.atoms.push(Atom::new(label, element, position));
        }

        Ok((system, XyzMetadata { comment }))
    }

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        writeln!(writer, "{}", system.atom_count())?;
        writeln!(writer, "{}", metadata.comment)?;
        for atom in &system.atoms {
            writeln!(
                writer,
                "{:<2} {:>14.6} {:>14.6} {:>14.6}",
                atom.element.symbol(),
                atom.position.x,
                atom.position.y,
                atom.position.z
            )?;
        }
        Ok(())
    }

    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        Self::write_to(system, &XyzMetadata::default(), writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_symbols_and_coordinates() {
        let text = "3\nwater\nO 0.0 0.0 0.1\nH 0.0 0.75 -0.47\nH 0.0 -0.75 -0.47\n";
        let (system, metadata) = XyzFile::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(metadata.comment, "water");
        assert_eq!(system.atom_count(), 3);
        assert_eq!(system.atoms[0].element, Element::O);
        assert_eq!(system.atoms[2].position, Point3::new(0.0, -0.75, -0.47));
    }

    #[test]
    fn written_file_reads_back() {
        let mut system = MolecularSystem::default();
        system.atoms.push(Atom::new("CL", Element::Cl, Point3::new(1.5, -2.25, 3.0)));
        let mut buffer = Vec::new();
        XyzFile::write_system_to(&system, &mut buffer).unwrap();

        let (back, _) = XyzFile::read_from(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(back.atoms[0].element, Element::Cl);
        assert_eq!(back.atoms[0].position, Point3::new(1.5, -2.25, 3.0));
    }

    #[test]
    fn rejects_short_and_truncated_files() {
        let err = XyzFile::read_from(&mut Cursor::new("2\n\nO 0 0\n")).unwrap_err();
        assert!(matches!(err, XyzError::Parse { line: 3, .. }));

        let err = XyzFile::read_from(&mut Cursor::new("2\n\nO 0 0 0\n")).unwrap_err();
        assert!(matches!(
            err,
            XyzError::Truncated {
                expected: 2,
                found: 1
            }
        ));
    }
}
