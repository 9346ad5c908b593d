use liquidbox::engine::config::{
    CoordinateFormat, DEFAULT_LOG_FILE, DEFAULT_N_MOLECULES, DEFAULT_RUN_MARKER_FILE,
    DEFAULT_STEP_COLUMN,
    DEFAULT_TIME_COLUMN, DEFAULT_TOLERANCE_ANGSTROM, FailurePolicy, run_label,
};

pub struct DefaultsConfig {
    pub n_molecules: u32,
    pub component_boxes: bool,
    pub density: f64,
    pub tolerance: f64,
    pub center_solute: bool,
    pub on_failure: FailurePolicy,
    pub formats: Vec<CoordinateFormat>,
    pub topology: bool,
    pub packmol: String,
    pub run: String,
    pub log: String,
    pub run_marker: String,
    pub stride: u64,
    pub timestep_fs: f64,
    pub step_column: String,
    pub time_column: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            n_molecules: DEFAULT_N_MOLECULES,
            component_boxes: true,
            density: 0.95,
            tolerance: DEFAULT_TOLERANCE_ANGSTROM,
            center_solute: true,
            on_failure: FailurePolicy::Continue,
            formats: vec![CoordinateFormat::Bgf, CoordinateFormat::Gro],
            topology: true,
            packmol: "packmol".to_string(),
            run: run_label(2_500_000, 1_000_000, 2.0, 25),
            log: DEFAULT_LOG_FILE.to_string(),
            run_marker: DEFAULT_RUN_MARKER_FILE.to_string(),
            stride: 1000,
            timestep_fs: 2.0,
            step_column: DEFAULT_STEP_COLUMN.to_string(),
            time_column: DEFAULT_TIME_COLUMN.to_string(),
        }
    }
}
