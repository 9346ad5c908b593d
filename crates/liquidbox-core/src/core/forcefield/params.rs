use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Van der Waals parameters of one atom type.
///
/// Either the sigma/epsilon form or the DREIDING radius/well-depth form is
/// accepted; the radius is the position of the potential minimum.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(untagged)]
pub enum VdwParam {
    SigmaEpsilon { sigma: f64, epsilon: f64 },
    RadiusWellDepth { radius: f64, well_depth: f64 },
}

impl VdwParam {
    /// Collision diameter in Angstroms.
    pub fn sigma(&self) -> f64 {
        match *self {
            Self::SigmaEpsilon { sigma, .. } => sigma,
            Self::RadiusWellDepth { radius, .. } => radius / 2f64.powf(1.0 / 6.0),
        }
    }

    /// Well depth in kcal/mol.
    pub fn epsilon(&self) -> f64 {
        match *self {
            Self::SigmaEpsilon { epsilon, .. } => epsilon,
            Self::RadiusWellDepth { well_depth, .. } => well_depth,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct GlobalParams {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Forcefield {
    pub globals: GlobalParams,
    #[serde(rename = "atom-types")]
    pub atom_types: HashMap<String, VdwParam>,
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
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

impl Forcefield {
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ParamLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn vdw(&self, ff_type: &str) -> Option<&VdwParam> {
        self.atom_types.get(ff_type)
    }
}
