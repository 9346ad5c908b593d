use super::collaborators::BoxTarget;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

pub const DEFAULT_N_MOLECULES: u32 = 1000;
pub const DEFAULT_TOLERANCE_ANGSTROM: f64 = 2.0;
pub const DEFAULT_LOG_FILE: &str = "equilibration.csv";
/// Written by the simulation once equilibration is over.
pub const DEFAULT_RUN_MARKER_FILE: &str = "production.csv";
pub const DEFAULT_STEP_COLUMN: &str = "#\"Step\"";
pub const DEFAULT_TIME_COLUMN: &str = "Time (ps)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Target molecule count N of every generated box.
    pub n_molecules: u32,
    /// Whether each recipe component also yields a pure box of N molecules.
    pub pure_component_boxes: bool,
}

impl GenerationConfig {
    pub fn new(n_molecules: u32) -> Result<Self, ConfigError> {
        if n_molecules == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "n_molecules",
                reason: "a box must hold at least one molecule".to_string(),
            });
        }
        Ok(Self {
            n_molecules,
            pure_component_boxes: true,
        })
    }

    pub fn with_pure_component_boxes(mut self, enabled: bool) -> Self {
        self.pure_component_boxes = enabled;
        self
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            n_molecules: DEFAULT_N_MOLECULES,
            pure_component_boxes: true,
        }
    }
}

/// What the orchestrator does when the packer cannot place an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure, then propagate it as an error.
    Abort,
    /// Record the failure and return normally without structure artifacts.
    #[default]
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => Err(ConfigError::InvalidValue {
                parameter: "failure_policy",
                reason: format!("expected 'abort' or 'continue', got '{}'", other),
            }),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::Continue => "continue",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoordinateFormat {
    Bgf,
    Gro,
}

impl CoordinateFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Bgf => "input.bgf",
            Self::Gro => "input.gro",
        }
    }
}

impl FromStr for CoordinateFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bgf" => Ok(Self::Bgf),
            "gro" => Ok(Self::Gro),
            other => Err(ConfigError::InvalidValue {
                parameter: "coordinate_format",
                reason: format!("expected 'bgf' or 'gro', got '{}'", other),
            }),
        }
    }
}

/// Which artifacts a successful packing writes besides the state snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormats {
    pub coordinates: Vec<CoordinateFormat>,
    pub topology: bool,
}

impl Default for OutputFormats {
    fn default() -> Self {
        Self {
            coordinates: vec![CoordinateFormat::Bgf, CoordinateFormat::Gro],
            topology: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackingConfig {
    pub output_root: PathBuf,
    pub box_target: BoxTarget,
    pub tolerance: f64,
    pub center_solute: bool,
    pub failure_policy: FailurePolicy,
    pub skip_existing: bool,
    pub output_formats: OutputFormats,
}

#[derive(Default)]
pub struct PackingConfigBuilder {
    output_root: Option<PathBuf>,
    box_target: Option<BoxTarget>,
    tolerance: Option<f64>,
    center_solute: Option<bool>,
    failure_policy: Option<FailurePolicy>,
    skip_existing: Option<bool>,
    output_formats: Option<OutputFormats>,
}

impl PackingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output_root(mut self, path: PathBuf) -> Self {
        self.output_root = Some(path);
        self
    }
    pub fn box_target(mut self, target: BoxTarget) -> Self {
        self.box_target = Some(target);
        self
    }
    pub fn tolerance(mut self, angstroms: f64) -> Self {
        self.tolerance = Some(angstroms);
        self
    }
    pub fn center_solute(mut self, center: bool) -> Self {
        self.center_solute = Some(center);
        self
    }
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }
    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = Some(skip);
        self
    }
    pub fn output_formats(mut self, formats: OutputFormats) -> Self {
        self.output_formats = Some(formats);
        self
    }

    pub fn build(self) -> Result<PackingConfig, ConfigError> {
        let box_target = self
            .box_target
            .ok_or(ConfigError::MissingParameter("box_target"))?;
        match box_target {
            BoxTarget::Density { grams_per_ml } if !(grams_per_ml > 0.0) => {
                return Err(ConfigError::InvalidValue {
                    parameter: "box_target",
                    reason: format!("density must be positive, got {}", grams_per_ml),
                });
            }
            BoxTarget::Dimensions { angstroms } if angstroms.iter().any(|&l| !(l > 0.0)) => {
                return Err(ConfigError::InvalidValue {
                    parameter: "box_target",
                    reason: format!("box edges must be positive, got {:?}", angstroms),
                });
            }
            _ => {}
        }

        let tolerance = self.tolerance.unwrap_or(DEFAULT_TOLERANCE_ANGSTROM);
        if !(tolerance > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "tolerance",
                reason: format!("must be positive, got {}", tolerance),
            });
        }

        Ok(PackingConfig {
            output_root: self
                .output_root
                .ok_or(ConfigError::MissingParameter("output_root"))?,
            box_target,
            tolerance,
            center_solute: self.center_solute.unwrap_or(true),
            failure_policy: self.failure_policy.unwrap_or_default(),
            skip_existing: self.skip_existing.unwrap_or(false),
            output_formats: self.output_formats.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Run labels analysed for every entry, in order.
    pub runs: Vec<String>,
    /// Log files of a run, concatenated in order before analysis.
    pub log_files: Vec<String>,
    /// Files that must exist in a run directory before its logs are read;
    /// a run still in progress lacks them and is skipped.
    pub required_files: Vec<String>,
    /// Steps between consecutive samples of the log.
    pub sampling_stride: u64,
    /// Integration timestep in femtoseconds.
    pub timestep_fs: f64,
    pub step_column: String,
    pub time_column: String,
    pub excluded_columns: Vec<String>,
    /// Write `combined.csv` with the reconstructed step/time columns next to the logs.
    pub write_combined: bool,
}

impl AnalysisConfig {
    /// Whether a log column is an observable to analyse.
    pub fn is_observable(&self, column: &str) -> bool {
        column != self.step_column
            && column != self.time_column
            && !self.excluded_columns.iter().any(|c| c == column)
    }

    /// Elapsed time in picoseconds of the given step.
    pub fn step_to_ps(&self, step: u64) -> f64 {
        step as f64 * self.timestep_fs / 1000.0
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    runs: Option<Vec<String>>,
    log_files: Option<Vec<String>>,
    required_files: Option<Vec<String>>,
    sampling_stride: Option<u64>,
    timestep_fs: Option<f64>,
    step_column: Option<String>,
    time_column: Option<String>,
    excluded_columns: Option<Vec<String>>,
    write_combined: Option<bool>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn runs(mut self, runs: Vec<String>) -> Self {
        self.runs = Some(runs);
        self
    }
    pub fn log_files(mut self, files: Vec<String>) -> Self {
        self.log_files = Some(files);
        self
    }
    pub fn required_files(mut self, files: Vec<String>) -> Self {
        self.required_files = Some(files);
        self
    }
    pub fn sampling_stride(mut self, steps: u64) -> Self {
        self.sampling_stride = Some(steps);
        self
    }
    pub fn timestep_fs(mut self, fs: f64) -> Self {
        self.timestep_fs = Some(fs);
        self
    }
    pub fn step_column(mut self, name: String) -> Self {
        self.step_column = Some(name);
        self
    }
    pub fn time_column(mut self, name: String) -> Self {
        self.time_column = Some(name);
        self
    }
    pub fn excluded_columns(mut self, names: Vec<String>) -> Self {
        self.excluded_columns = Some(names);
        self
    }
    pub fn write_combined(mut self, write: bool) -> Self {
        self.write_combined = Some(write);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let runs = self.runs.ok_or(ConfigError::MissingParameter("runs"))?;
        if runs.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "runs",
                reason: "at least one run label is required".to_string(),
            });
        }
        let log_files = self
            .log_files
            .unwrap_or_else(|| vec![DEFAULT_LOG_FILE.to_string()]);
        if log_files.is_empty() {
            return Err(ConfigError::InvalidValue {
                parameter: "log_files",
                reason: "at least one log file name is required".to_string(),
            });
        }
        let sampling_stride = self
            .sampling_stride
            .ok_or(ConfigError::MissingParameter("sampling_stride"))?;
        if sampling_stride == 0 {
            return Err(ConfigError::InvalidValue {
                parameter: "sampling_stride",
                reason: "must be at least one step".to_string(),
            });
        }
        let timestep_fs = self
            .timestep_fs
            .ok_or(ConfigError::MissingParameter("timestep_fs"))?;
        if !(timestep_fs > 0.0) {
            return Err(ConfigError::InvalidValue {
                parameter: "timestep_fs",
                reason: format!("must be positive, got {}", timestep_fs),
            });
        }

        Ok(AnalysisConfig {
            runs,
            log_files,
            required_files: self
                .required_files
                .unwrap_or_else(|| vec![DEFAULT_RUN_MARKER_FILE.to_string()]),
            sampling_stride,
            timestep_fs,
            step_column: self
                .step_column
                .unwrap_or_else(|| DEFAULT_STEP_COLUMN.to_string()),
            time_column: self
                .time_column
                .unwrap_or_else(|| DEFAULT_TIME_COLUMN.to_string()),
            excluded_columns: self.excluded_columns.unwrap_or_default(),
            write_combined: self.write_combined.unwrap_or(false),
        })
    }
}

/// Directory label of a simulation run, e.g. `ne-2500000_np-1000000_dt-2.0_nb-25`.
///
/// The timestep always carries at least one decimal so labels match those
/// produced by the simulation scripts.
pub fn run_label(
    n_equilibration_steps: u64,
    n_production_steps: u64,
    timestep_fs: f64,
    n_barostat_steps: u64,
) -> String {
    format!(
        "ne-{}_np-{}_dt-{:?}_nb-{}",
        n_equilibration_steps, n_production_steps, timestep_fs, n_barostat_steps
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_config_rejects_empty_boxes() {
        assert!(matches!(
            GenerationConfig::new(0),
            Err(ConfigError::InvalidValue { .. })
        ));
        let cfg = GenerationConfig::new(10).unwrap();
        assert!(cfg.pure_component_boxes);
        assert!(!cfg.with_pure_component_boxes(false).pure_component_boxes);
    }

    #[test]
    fn packing_builder_requires_target_and_root() {
        let missing_target = PackingConfigBuilder::new()
            .output_root(PathBuf::from("out"))
            .build();
        assert_eq!(
            missing_target,
            Err(ConfigError::MissingParameter("box_target"))
        );

        let missing_root = PackingConfigBuilder::new()
            .box_target(BoxTarget::Density { grams_per_ml: 0.95 })
            .build();
        assert_eq!(missing_root, Err(ConfigError::MissingParameter("output_root")));
    }

    #[test]
    fn packing_builder_applies_defaults() {
        let cfg = PackingConfigBuilder::new()
            .output_root(PathBuf::from("n-1000"))
            .box_target(BoxTarget::Density { grams_per_ml: 0.95 })
            .build()
            .unwrap();
        assert_eq!(cfg.tolerance, DEFAULT_TOLERANCE_ANGSTROM);
        assert_eq!(cfg.failure_policy, FailurePolicy::Continue);
        assert!(cfg.center_solute);
        assert!(!cfg.skip_existing);
        assert_eq!(cfg.output_formats, OutputFormats::default());
    }

    #[test]
    fn packing_builder_rejects_non_positive_geometry() {
        let bad_density = PackingConfigBuilder::new()
            .output_root(PathBuf::from("out"))
            .box_target(BoxTarget::Density { grams_per_ml: 0.0 })
            .build();
        assert!(matches!(bad_density, Err(ConfigError::InvalidValue { .. })));

        let bad_box = PackingConfigBuilder::new()
            .output_root(PathBuf::from("out"))
            .box_target(BoxTarget::Dimensions {
                angstroms: [30.0, -1.0, 30.0],
            })
            .build();
        assert!(matches!(bad_box, Err(ConfigError::InvalidValue { .. })));

        let bad_tolerance = PackingConfigBuilder::new()
            .output_root(PathBuf::from("out"))
            .box_target(BoxTarget::Density { grams_per_ml: 1.0 })
            .tolerance(0.0)
            .build();
        assert!(matches!(bad_tolerance, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn failure_policy_and_format_parse() {
        assert_eq!("abort".parse::<FailurePolicy>(), Ok(FailurePolicy::Abort));
        assert_eq!(" Continue ".parse::<FailurePolicy>(), Ok(FailurePolicy::Continue));
        assert!("retry".parse::<FailurePolicy>().is_err());
        assert_eq!("GRO".parse::<CoordinateFormat>(), Ok(CoordinateFormat::Gro));
        assert_eq!(CoordinateFormat::Bgf.file_name(), "input.bgf");
    }

    #[test]
    fn analysis_builder_defaults_and_column_filter() {
        let cfg = AnalysisConfigBuilder::new()
            .runs(vec!["run-a".to_string()])
            .sampling_stride(1000)
            .timestep_fs(2.0)
            .excluded_columns(vec!["Speed (ns/day)".to_string()])
            .build()
            .unwrap();
        assert_eq!(cfg.log_files, vec![DEFAULT_LOG_FILE.to_string()]);
        assert_eq!(cfg.required_files, vec![DEFAULT_RUN_MARKER_FILE.to_string()]);
        assert!(!cfg.is_observable(DEFAULT_STEP_COLUMN));
        assert!(!cfg.is_observable(DEFAULT_TIME_COLUMN));
        assert!(!cfg.is_observable("Speed (ns/day)"));
        assert!(cfg.is_observable("Density (g/mL)"));
        assert_eq!(cfg.step_to_ps(1000), 2.0);
    }

    #[test]
    fn analysis_builder_validates_required_values() {
        assert_eq!(
            AnalysisConfigBuilder::new()
                .sampling_stride(1)
                .timestep_fs(1.0)
                .build(),
            Err(ConfigError::MissingParameter("runs"))
        );
        assert!(matches!(
            AnalysisConfigBuilder::new()
                .runs(vec!["r".into()])
                .sampling_stride(0)
                .timestep_fs(1.0)
                .build(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn run_label_matches_simulation_directory_names() {
        assert_eq!(
            run_label(2_500_000, 1_000_000, 2.0, 25),
            "ne-2500000_np-1000000_dt-2.0_nb-25"
        );
        assert_eq!(run_label(1, 2, 4.5, 3), "ne-1_np-2_dt-4.5_nb-3");
    }
}
