use crate::cli::AnalyzeArgs;
use crate::config::{FileConfig, build_analyze_job};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use liquidbox::{
    core::stats::timeseries::AutocorrelationDetector,
    engine::progress::ProgressReporter,
    workflows::equilibration::EquilibrationAnalyzer,
};
use tracing::{info, warn};

pub fn run(args: AnalyzeArgs, file_config: &FileConfig, quiet: bool) -> Result<()> {
    let job = build_analyze_job(&args, file_config)?;

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Scanning {} for {} run(s)...",
        job.root.display(),
        job.core_config.runs.len()
    );
    let detector = AutocorrelationDetector::default();
    let analyzer = EquilibrationAnalyzer::new(&detector, &job.core_config);
    let table = analyzer.run(&job.root, &reporter)?;

    if table.is_empty() {
        warn!("No run logs were found under {:?}", &job.root);
        println!("Warning: no run logs were found; writing an empty table.");
    }

    table.write_csv(&job.output)?;
    info!("Wrote {} record(s) to {:?}", table.len(), &job.output);
    println!(
        "✓ {} equilibration record(s) written to: {}",
        table.len(),
        job.output.display()
    );

    Ok(())
}
