use crate::core::models::system::MolecularSystem;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A coordinate format a [`MolecularSystem`] can be read from and written to.
///
/// Formats only implement the stream-level methods; the `*_path` helpers
/// open the file and handle buffering and the final flush.
pub trait MolecularFile {
    /// Header data carried by the format besides atoms and bonds, e.g. a title.
    type Metadata;

    type Error: Error + From<io::Error>;

    fn read_from(
        reader: &mut impl BufRead,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error>;

    fn write_to(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    /// Writes the system with whatever header the format derives on its own.
    fn write_system_to(
        system: &MolecularSystem,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error>;

    fn read_from_path(
        path: impl AsRef<Path>,
    ) -> Result<(MolecularSystem, Self::Metadata), Self::Error> {
        Self::read_from(&mut BufReader::new(File::open(path)?))
    }

    fn write_to_path(
        system: &MolecularSystem,
        metadata: &Self::Metadata,
        path: impl AsRef<Path>,
    ) -> Result<(), Self::Error> {
        with_buffered_file(path, |writer| Self::write_to(system, metadata, writer))
    }

    fn write_system_to_path(
        system: &MolecularSystem,
        path: impl AsRef<Path>,
    ) -> Result<(), Self::Error> {
        with_buffered_file(path, |writer| Self::write_system_to(system, writer))
    }
}

fn with_buffered_file<E: From<io::Error>>(
    path: impl AsRef<Path>,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<(), E>,
) -> Result<(), E> {
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}
