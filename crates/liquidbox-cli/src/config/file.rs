use crate::error::{CliError, Result};
use liquidbox::engine::config::{CoordinateFormat, FailurePolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A campaign configuration file. Every value is optional; missing values
/// fall back to built-in defaults.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub generate: Option<FileGenerateConfig>,
    pub packing: Option<FilePackingConfig>,
    pub analysis: Option<FileAnalysisConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileGenerateConfig {
    #[serde(rename = "n-molecules")]
    pub n_molecules: Option<u32>,
    #[serde(rename = "component-boxes")]
    pub component_boxes: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FilePackingConfig {
    pub density: Option<f64>,
    #[serde(rename = "box-size")]
    pub box_size: Option<[f64; 3]>,
    pub tolerance: Option<f64>,
    #[serde(rename = "center-solute")]
    pub center_solute: Option<bool>,
    #[serde(rename = "on-failure")]
    pub on_failure: Option<FailurePolicy>,
    #[serde(rename = "skip-existing")]
    pub skip_existing: Option<bool>,
    pub formats: Option<Vec<CoordinateFormat>>,
    pub topology: Option<bool>,
    #[serde(rename = "force-field")]
    pub force_field: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub packmol: Option<PathBuf>,
    pub seed: Option<i64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileAnalysisConfig {
    pub runs: Option<Vec<String>>,
    pub logs: Option<Vec<String>>,
    #[serde(rename = "required-files")]
    pub required_files: Option<Vec<String>>,
    pub stride: Option<u64>,
    pub timestep: Option<f64>,
    #[serde(rename = "step-column")]
    pub step_column: Option<String>,
    #[serde(rename = "time-column")]
    pub time_column: Option<String>,
    pub exclude: Option<Vec<String>>,
    #[serde(rename = "write-combined")]
    pub write_combined: Option<bool>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading campaign configuration from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}
