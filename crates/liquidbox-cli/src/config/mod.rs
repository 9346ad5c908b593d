mod builder;
mod defaults;
mod file;
mod models;

pub use builder::{apply_set_values, build_analyze_job, build_generate_job, build_pack_job};
pub use file::FileConfig;
pub use models::{AnalyzeJob, GenerateJob, PackJob};
