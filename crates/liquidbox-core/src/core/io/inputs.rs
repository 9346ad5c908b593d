use crate::core::models::species::{MixtureRecipe, SolutePair};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("JSON parsing error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

impl InputError {
    pub fn path(&self) -> &str {
        match self {
            Self::Io { path, .. } | Self::Json { path, .. } | Self::Csv { path, .. } => path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecipeFile {
    entries: Vec<MixtureRecipe>,
}

/// Reads mixture recipes from `{"entries": [{"components": [...]}, ...]}`.
pub fn read_recipes(path: &Path) -> Result<Vec<MixtureRecipe>, InputError> {
    let display = path.to_string_lossy().to_string();
    let content = std::fs::read_to_string(path).map_err(|e| InputError::Io {
        path: display.clone(),
        source: e,
    })?;
    let file: RecipeFile = serde_json::from_str(&content).map_err(|e| InputError::Json {
        path: display,
        source: e,
    })?;
    Ok(file.entries)
}

/// Pure solvents and solute/solvent pairs taken from a solvation table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolvationTable {
    /// Every distinct solvent of the table, sorted.
    pub pure_solvents: Vec<String>,
    /// One pair per row, in file order.
    pub pairs: Vec<SolutePair>,
}

/// Reads a CSV with `Solute` and `Solvent` columns; other columns are ignored.
pub fn read_solvation_table(path: &Path) -> Result<SolvationTable, InputError> {
    let display = path.to_string_lossy().to_string();
    let file = std::fs::File::open(path).map_err(|e| InputError::Io {
        path: display.clone(),
        source: e,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let mut pairs = Vec::new();
    for result in reader.deserialize::<SolutePair>() {
        let pair = result.map_err(|e| InputError::Csv {
            path: display.clone(),
            source: e,
        })?;
        pairs.push(pair);
    }
    let pure_solvents = pairs
        .iter()
        .map(|p| p.solvent.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    Ok(SolvationTable {
        pure_solvents,
        pairs,
    })
}
