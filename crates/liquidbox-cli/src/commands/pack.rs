use crate::cli::PackArgs;
use crate::config::{FileConfig, build_pack_job};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use liquidbox::{
    core::forcefield::{parameterization::ForcefieldParameterizer, params::Forcefield},
    core::io::boxspec,
    core::packing::packmol::PackmolPacker,
    core::templates::registry::TemplateRegistry,
    engine::{error::EngineError, progress::ProgressReporter},
    workflows::pack::{PackingOrchestrator, PackingOutcome},
};
use tracing::{info, warn};

pub fn run(args: PackArgs, file_config: &FileConfig, quiet: bool) -> Result<()> {
    let job = build_pack_job(&args, file_config)?;

    info!("Reading box specs from {:?}", &job.box_specs);
    let entries = boxspec::read_box_entries(&job.box_specs).map_err(EngineError::from)?;

    info!("Loading template registry from {:?}", &job.templates);
    let registry =
        TemplateRegistry::load(&job.templates).map_err(|e| CliError::FileParsing {
            path: job.templates.clone(),
            source: e.into(),
        })?;

    info!("Loading force field from {:?}", &job.force_field);
    let forcefield = Forcefield::load(&job.force_field).map_err(|e| CliError::FileParsing {
        path: job.force_field.clone(),
        source: e.into(),
    })?;
    let parameterizer = ForcefieldParameterizer::new(forcefield);

    let mut packer = PackmolPacker::new(&job.packmol);
    if let Some(seed) = job.seed {
        packer = packer.with_seed(seed);
    }

    let progress_handler = if quiet {
        CliProgressHandler::hidden()
    } else {
        CliProgressHandler::new()
    };
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Packing entry {} of {}...", job.index, entries.len());
    let orchestrator =
        PackingOrchestrator::new(&registry, &packer, &parameterizer, &job.core_config);
    let attempt = orchestrator.run(&entries, job.index, &reporter)?;

    match &attempt.outcome {
        PackingOutcome::Packed(artifacts) => {
            info!(
                "Packed {} molecule(s), {} atom(s) in {:.2}s",
                artifacts.molecule_count,
                artifacts.atom_count,
                attempt.elapsed.as_secs_f64()
            );
            println!(
                "✓ Entry {} packed ({} molecules, {} atoms) into: {}",
                attempt.index,
                artifacts.molecule_count,
                artifacts.atom_count,
                attempt.directory.display()
            );
        }
        PackingOutcome::Failed(failure) => {
            warn!("Entry {} could not be packed: {}", attempt.index, failure.message);
            println!(
                "Warning: entry {} could not be packed; details in {}",
                attempt.index,
                failure.error_file.display()
            );
        }
        PackingOutcome::Skipped { existing } => {
            println!(
                "Entry {} already packed, skipping: {}",
                attempt.index,
                existing.display()
            );
        }
    }

    Ok(())
}
