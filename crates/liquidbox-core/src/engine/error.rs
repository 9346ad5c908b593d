use std::path::Path;
use thiserror::Error;

use super::collaborators::{ParameterizationError, StructureResolutionError};
use super::config::ConfigError;
use crate::core::io::boxspec::BoxSpecIoError;
use crate::core::io::inputs::InputError;
use crate::core::io::runlog::RunLogError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Mixture recipe {recipe} is invalid: {reason}")]
    Validation { recipe: usize, reason: String },

    #[error("Packing failed for entry {index}: {message}")]
    Packing { index: usize, message: String },

    #[error("Could not resolve species '{species}' of entry {index}: {source}")]
    StructureResolution {
        index: usize,
        species: String,
        #[source]
        source: StructureResolutionError,
    },

    #[error("Parameterization failed for entry {index}: {source}")]
    Parameterization {
        index: usize,
        #[source]
        source: ParameterizationError,
    },

    #[error("Failed to parse '{path}': {reason}")]
    Parse { path: String, reason: String },

    #[error("Entry index {index} is out of range for a box-spec list of {len} entries")]
    EntryIndexOutOfRange { index: usize, len: usize },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn parse(path: &Path, reason: impl Into<String>) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

impl From<BoxSpecIoError> for EngineError {
    fn from(err: BoxSpecIoError) -> Self {
        match err {
            BoxSpecIoError::Io { path, source } => Self::Io { path, source },
            other => Self::Parse {
                path: other.path().to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<RunLogError> for EngineError {
    fn from(err: RunLogError) -> Self {
        match err {
            RunLogError::Io { path, source } => Self::Io { path, source },
            other => Self::Parse {
                path: other.path().to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<InputError> for EngineError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::Io { path, source } => Self::Io { path, source },
            other => Self::Parse {
                path: other.path().to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_log_io_errors_stay_io_errors() {
        let err: EngineError = RunLogError::Io {
            path: "a/equilibration.csv".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(matches!(err, EngineError::Io { ref path, .. } if path == "a/equilibration.csv"));
    }

    #[test]
    fn run_log_content_errors_become_parse_errors_naming_the_file() {
        let err: EngineError = RunLogError::Empty {
            path: "entry-0003/run/equilibration.csv".to_string(),
        }
        .into();
        match err {
            EngineError::Parse { path, reason } => {
                assert_eq!(path, "entry-0003/run/equilibration.csv");
                assert!(reason.contains("no data rows"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn messages_identify_the_offender() {
        let err = EngineError::Validation {
            recipe: 4,
            reason: "mole fractions sum to 0.999".to_string(),
        };
        assert!(err.to_string().contains("recipe 4"));

        let err = EngineError::EntryIndexOutOfRange { index: 12, len: 3 };
        assert!(err.to_string().contains("12"));
    }
}
