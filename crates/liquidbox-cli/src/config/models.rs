use liquidbox::engine::config as core_config;
use std::path::PathBuf;

pub struct GenerateJob {
    pub recipes: PathBuf,
    pub solvation_table: Option<PathBuf>,
    pub output: PathBuf,
    pub core_config: core_config::GenerationConfig,
}

pub struct PackJob {
    pub box_specs: PathBuf,
    pub index: usize,
    pub force_field: PathBuf,
    pub templates: PathBuf,
    pub packmol: PathBuf,
    pub seed: Option<i64>,
    pub core_config: core_config::PackingConfig,
}

pub struct AnalyzeJob {
    pub root: PathBuf,
    pub output: PathBuf,
    pub core_config: core_config::AnalysisConfig,
}
