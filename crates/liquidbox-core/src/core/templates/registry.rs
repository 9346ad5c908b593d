use crate::core::io::bgf::BgfFile;
use crate::core::io::traits::MolecularFile;
use crate::core::models::molecule::MoleculeTemplate;
use crate::engine::collaborators::{StructureResolutionError, StructureResolver};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const DEFAULT_RESIDUE_NAME: &str = "MOL";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TemplateEntry {
    /// BGF file holding one molecule, relative to the registry file.
    pub structure: PathBuf,
    /// Overrides the residue name found in the structure file.
    #[serde(default)]
    pub residue: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    species: HashMap<String, TemplateEntry>,
}

/// Maps species identifiers to template structure files on disk.
///
/// ```toml
/// [species."O"]
/// structure = "templates/water.bgf"
///
/// [species."CCO"]
/// structure = "templates/ethanol.bgf"
/// residue = "ETH"
/// ```
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    base_dir: PathBuf,
    entries: HashMap<String, TemplateEntry>,
}

#[derive(Debug, Error)]
pub enum TemplateLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

impl TemplateRegistry {
    pub fn new(base_dir: PathBuf, entries: HashMap<String, TemplateEntry>) -> Self {
        Self { base_dir, entries }
    }

    pub fn load(path: &Path) -> Result<Self, TemplateLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| TemplateLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: RegistryFile = toml::from_str(&content).map_err(|e| TemplateLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::new(base_dir, file.species))
    }

    pub fn get(&self, species: &str) -> Option<&TemplateEntry> {
        self.entries.get(species)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl StructureResolver for TemplateRegistry {
    fn resolve(&self, species: &str) -> Result<MoleculeTemplate, StructureResolutionError> {
        let entry = self
            .get(species)
            .ok_or_else(|| StructureResolutionError::UnknownSpecies {
                species: species.to_string(),
            })?;
        let path = self.base_dir.join(&entry.structure);
        let malformed = |reason: String| StructureResolutionError::Malformed {
            species: species.to_string(),
            reason,
        };

        let (system, _) = BgfFile::read_from_path(&path)
            .map_err(|e| malformed(format!("{}: {}", path.display(), e)))?;
        if system.molecule_count() > 1 {
            return Err(malformed(format!(
                "{} holds {} residues, expected a single molecule",
                path.display(),
                system.molecule_count()
            )));
        }

        let residue_name = entry
            .residue
            .clone()
            .or_else(|| system.molecules.first().map(|m| m.residue_name.clone()))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_RESIDUE_NAME.to_string());
        debug!(
            species,
            atoms = system.atom_count(),
            path = %path.display(),
            "Resolved molecular template"
        );

        let mut template = MoleculeTemplate::new(species, residue_name);
        template.atoms = system.atoms;
        template.bonds = system.bonds;
        Ok(template)
    }
}
