use crate::core::models::box_entry::{BoxEntry, BoxSpecRecord, MismatchedRecordError};
use serde::Serialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BoxSpecIoError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("Invalid box-spec entry {index} in '{path}': {source}")]
    Record {
        path: String,
        index: usize,
        source: MismatchedRecordError,
    },
}

impl BoxSpecIoError {
    pub fn path(&self) -> &str {
        match self {
            Self::Io { path, .. } | Self::Json { path, .. } | Self::Record { path, .. } => path,
        }
    }
}

/// Renders records as JSON with four-space indentation.
pub fn to_json(records: &[BoxSpecRecord]) -> Result<String, serde_json::Error> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    records.serialize(&mut serializer)?;
    // serde_json only ever emits valid UTF-8.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes the box-spec list, replacing `path` only once the whole file is on disk.
pub fn write_box_specs(path: &Path, entries: &[BoxEntry]) -> Result<(), BoxSpecIoError> {
    let display = path.to_string_lossy().to_string();
    let records: Vec<BoxSpecRecord> = entries.iter().map(BoxEntry::to_record).collect();
    let json = to_json(&records).map_err(|e| BoxSpecIoError::Json {
        path: display.clone(),
        source: e,
    })?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = Path::new(&staging);
    fs::write(staging, json).map_err(|e| BoxSpecIoError::Io {
        path: staging.to_string_lossy().to_string(),
        source: e,
    })?;
    fs::rename(staging, path).map_err(|e| BoxSpecIoError::Io {
        path: display,
        source: e,
    })
}

pub fn read_box_specs(path: &Path) -> Result<Vec<BoxSpecRecord>, BoxSpecIoError> {
    let display = path.to_string_lossy().to_string();
    let content = fs::read_to_string(path).map_err(|e| BoxSpecIoError::Io {
        path: display.clone(),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| BoxSpecIoError::Json {
        path: display,
        source: e,
    })
}

/// Reads the box-spec list and validates that every record is index-aligned.
pub fn read_box_entries(path: &Path) -> Result<Vec<BoxEntry>, BoxSpecIoError> {
    read_box_specs(path)?
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            BoxEntry::try_from(record).map_err(|source| BoxSpecIoError::Record {
                path: path.to_string_lossy().to_string(),
                index,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entries() -> Vec<BoxEntry> {
        vec![
            BoxEntry::pure("O", 10),
            BoxEntry::new(vec![("N".into(), 5), ("O".into(), 5)]),
        ]
    }

    #[test]
    fn json_uses_four_space_indent_and_parallel_arrays() {
        let records: Vec<_> = entries()[..1].iter().map(BoxEntry::to_record).collect();
        let json = to_json(&records).unwrap();
        let expected = "[\n    {\n        \"smiles\": [\n            \"O\"\n        ],\n        \"n_molecules\": [\n            10\n        ]\n    }\n]";
        assert_eq!(json, expected);
    }

    #[test]
    fn written_file_reads_back_identically() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("liquid-boxes.json");
        write_box_specs(&path, &entries()).unwrap();

        assert_eq!(read_box_entries(&path).unwrap(), entries());
        assert!(!dir.path().join("liquid-boxes.json.tmp").exists());
    }

    #[test]
    fn misaligned_record_names_its_index() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(
            &path,
            r#"[{"smiles": ["O"], "n_molecules": [10]}, {"smiles": ["A", "B"], "n_molecules": [1]}]"#,
        )
        .unwrap();
        let err = read_box_entries(&path).unwrap_err();
        assert!(matches!(err, BoxSpecIoError::Record { index: 1, .. }));
    }

    #[test]
    fn missing_and_malformed_files_are_distinguished() {
        let dir = tempdir().unwrap();
        let missing = read_box_specs(&dir.path().join("none.json")).unwrap_err();
        assert!(matches!(missing, BoxSpecIoError::Io { .. }));

        let path = dir.path().join("garbage.json");
        fs::write(&path, "not json").unwrap();
        let malformed = read_box_specs(&path).unwrap_err();
        assert!(matches!(malformed, BoxSpecIoError::Json { .. }));
    }
}
