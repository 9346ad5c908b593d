use crate::cli::GenerateArgs;
use crate::config::{FileConfig, build_generate_job};
use crate::error::Result;
use liquidbox::{
    core::io::{boxspec, inputs},
    engine::error::EngineError,
    workflows,
};
use tracing::info;

pub fn run(args: GenerateArgs, file_config: &FileConfig) -> Result<()> {
    let job = build_generate_job(&args, file_config)?;

    info!("Reading mixture recipes from {:?}", &job.recipes);
    let recipes = inputs::read_recipes(&job.recipes).map_err(EngineError::from)?;

    let table = match &job.solvation_table {
        Some(path) => {
            info!("Reading solvation table from {:?}", path);
            inputs::read_solvation_table(path).map_err(EngineError::from)?
        }
        None => inputs::SolvationTable::default(),
    };

    println!(
        "Expanding {} recipe(s) and {} solute/solvent pair(s) at N = {}...",
        recipes.len(),
        table.pairs.len(),
        job.core_config.n_molecules
    );
    let entries = workflows::generate::generate(
        &recipes,
        &table.pure_solvents,
        &table.pairs,
        &job.core_config,
    )?;

    boxspec::write_box_specs(&job.output, &entries).map_err(EngineError::from)?;
    info!(
        "Wrote {} box spec(s) to {:?}",
        entries.len(),
        &job.output
    );
    println!(
        "✓ {} box spec(s) written to: {}",
        entries.len(),
        job.output.display()
    );

    Ok(())
}
