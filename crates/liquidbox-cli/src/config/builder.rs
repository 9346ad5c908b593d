use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AnalyzeJob, GenerateJob, PackJob};
use crate::cli::{AnalyzeArgs, GenerateArgs, PackArgs};
use crate::error::{CliError, Result};
use liquidbox::engine::collaborators::BoxTarget;
use liquidbox::engine::config as core_config;
use std::path::PathBuf;
use std::str::FromStr;

pub fn build_generate_job(args: &GenerateArgs, file_config: &FileConfig) -> Result<GenerateJob> {
    let defaults = DefaultsConfig::default();
    let file = file_config.generate.clone().unwrap_or_default();

    let n_molecules = args
        .n_molecules
        .or(file.n_molecules)
        .unwrap_or(defaults.n_molecules);
    let component_boxes = if args.no_component_boxes {
        false
    } else {
        file.component_boxes.unwrap_or(defaults.component_boxes)
    };

    let core_config = core_config::GenerationConfig::new(n_molecules)
        .map_err(|e| CliError::Config(e.to_string()))?
        .with_pure_component_boxes(component_boxes);

    Ok(GenerateJob {
        recipes: args.recipes.clone(),
        solvation_table: args.solvation_table.clone(),
        output: args.output.clone(),
        core_config,
    })
}

pub fn build_pack_job(args: &PackArgs, file_config: &FileConfig) -> Result<PackJob> {
    let defaults = DefaultsConfig::default();
    let file = file_config.packing.clone().unwrap_or_default();

    let box_target = resolve_box_target(args, file.density, file.box_size, &defaults)?;
    let force_field = args
        .force_field
        .clone()
        .or(file.force_field)
        .ok_or_else(|| {
            CliError::Config(
                "A force field is required: pass --force-field or set `packing.force-field`"
                    .to_string(),
            )
        })?;
    let templates = args.templates.clone().or(file.templates).ok_or_else(|| {
        CliError::Config(
            "A template registry is required: pass --templates or set `packing.templates`"
                .to_string(),
        )
    })?;

    let output_formats = core_config::OutputFormats {
        coordinates: args
            .format
            .clone()
            .or(file.formats)
            .unwrap_or(defaults.formats),
        topology: file.topology.unwrap_or(defaults.topology),
    };

    let core_config = core_config::PackingConfigBuilder::new()
        .output_root(args.output.clone())
        .box_target(box_target)
        .tolerance(args.tolerance.or(file.tolerance).unwrap_or(defaults.tolerance))
        .center_solute(file.center_solute.unwrap_or(defaults.center_solute))
        .failure_policy(args.on_failure.or(file.on_failure).unwrap_or(defaults.on_failure))
        .skip_existing(args.skip_existing || file.skip_existing.unwrap_or(false))
        .output_formats(output_formats)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(PackJob {
        box_specs: args.input.clone(),
        index: args.index,
        force_field,
        templates,
        packmol: args
            .packmol
            .clone()
            .or(file.packmol)
            .unwrap_or_else(|| PathBuf::from(&defaults.packmol)),
        seed: args.seed.or(file.seed),
        core_config,
    })
}

/// A box size on the command line beats a density on the command line, which
/// beats anything in the file; the file's box size beats the file's density.
fn resolve_box_target(
    args: &PackArgs,
    file_density: Option<f64>,
    file_box_size: Option<[f64; 3]>,
    defaults: &DefaultsConfig,
) -> Result<BoxTarget> {
    if let Some(edges) = &args.geometry.box_size {
        let angstroms: [f64; 3] = edges.as_slice().try_into().map_err(|_| {
            CliError::Argument(format!(
                "--box-size expects three edge lengths, got {}",
                edges.len()
            ))
        })?;
        return Ok(BoxTarget::Dimensions { angstroms });
    }
    if let Some(grams_per_ml) = args.geometry.density {
        return Ok(BoxTarget::Density { grams_per_ml });
    }
    Ok(match (file_box_size, file_density) {
        (Some(angstroms), _) => BoxTarget::Dimensions { angstroms },
        (None, Some(grams_per_ml)) => BoxTarget::Density { grams_per_ml },
        (None, None) => BoxTarget::Density {
            grams_per_ml: defaults.density,
        },
    })
}

pub fn build_analyze_job(args: &AnalyzeArgs, file_config: &FileConfig) -> Result<AnalyzeJob> {
    let defaults = DefaultsConfig::default();
    let file = file_config.analysis.clone().unwrap_or_default();

    let non_empty = |values: &Vec<String>| (!values.is_empty()).then(|| values.clone());
    let runs = non_empty(&args.runs)
        .or(file.runs)
        .unwrap_or_else(|| vec![defaults.run.clone()]);
    let logs = non_empty(&args.logs)
        .or(file.logs)
        .unwrap_or_else(|| vec![defaults.log.clone()]);
    let required_files = non_empty(&args.required_files)
        .or(file.required_files)
        .unwrap_or_else(|| vec![defaults.run_marker.clone()]);
    let mut excluded = file.exclude.unwrap_or_default();
    excluded.extend(args.excluded_columns.iter().cloned());

    let core_config = core_config::AnalysisConfigBuilder::new()
        .runs(runs)
        .log_files(logs)
        .required_files(required_files)
        .sampling_stride(args.stride.or(file.stride).unwrap_or(defaults.stride))
        .timestep_fs(args.timestep.or(file.timestep).unwrap_or(defaults.timestep_fs))
        .step_column(file.step_column.unwrap_or(defaults.step_column))
        .time_column(file.time_column.unwrap_or(defaults.time_column))
        .excluded_columns(excluded)
        .write_combined(args.write_combined || file.write_combined.unwrap_or(false))
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AnalyzeJob {
        root: args.input.clone(),
        output: args.output.clone(),
        core_config,
    })
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

/// Applies `-S key=value` overrides on top of the file configuration.
pub fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };
        let key = key.trim();

        match key {
            "generate.n-molecules" => {
                config.generate.get_or_insert_with(Default::default).n_molecules =
                    Some(parse_value(key, value, "integer")?);
            }
            "generate.component-boxes" => {
                config
                    .generate
                    .get_or_insert_with(Default::default)
                    .component_boxes = Some(parse_value(key, value, "boolean")?);
            }
            "packing.density" => {
                config.packing.get_or_insert_with(Default::default).density =
                    Some(parse_value(key, value, "float")?);
            }
            "packing.tolerance" => {
                config.packing.get_or_insert_with(Default::default).tolerance =
                    Some(parse_value(key, value, "float")?);
            }
            "packing.center-solute" => {
                config.packing.get_or_insert_with(Default::default).center_solute =
                    Some(parse_value(key, value, "boolean")?);
            }
            "packing.on-failure" => {
                config.packing.get_or_insert_with(Default::default).on_failure =
                    Some(value.parse().map_err(|e: core_config::ConfigError| {
                        CliError::Config(e.to_string())
                    })?);
            }
            "packing.skip-existing" => {
                config.packing.get_or_insert_with(Default::default).skip_existing =
                    Some(parse_value(key, value, "boolean")?);
            }
            "packing.topology" => {
                config.packing.get_or_insert_with(Default::default).topology =
                    Some(parse_value(key, value, "boolean")?);
            }
            "packing.seed" => {
                config.packing.get_or_insert_with(Default::default).seed =
                    Some(parse_value(key, value, "integer")?);
            }
            "packing.packmol" => {
                config.packing.get_or_insert_with(Default::default).packmol =
                    Some(PathBuf::from(value.trim()));
            }
            "analysis.stride" => {
                config.analysis.get_or_insert_with(Default::default).stride =
                    Some(parse_value(key, value, "integer")?);
            }
            "analysis.timestep" => {
                config.analysis.get_or_insert_with(Default::default).timestep =
                    Some(parse_value(key, value, "float")?);
            }
            "analysis.write-combined" => {
                config
                    .analysis
                    .get_or_insert_with(Default::default)
                    .write_combined = Some(parse_value(key, value, "boolean")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::BoxGeometry;
    use liquidbox::engine::config::{CoordinateFormat, FailurePolicy};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn generate_args() -> GenerateArgs {
        GenerateArgs {
            recipes: PathBuf::from("recipes.json"),
            solvation_table: None,
            n_molecules: None,
            no_component_boxes: false,
            output: PathBuf::from("liquid-boxes.json"),
        }
    }

    fn pack_args() -> PackArgs {
        PackArgs {
            input: PathBuf::from("liquid-boxes.json"),
            index: 3,
            output: PathBuf::from("n-1000"),
            force_field: Some(PathBuf::from("ff.toml")),
            templates: Some(PathBuf::from("templates.toml")),
            packmol: None,
            seed: None,
            geometry: BoxGeometry::default(),
            tolerance: None,
            on_failure: None,
            skip_existing: false,
            format: None,
        }
    }

    fn analyze_args() -> AnalyzeArgs {
        AnalyzeArgs {
            input: PathBuf::from("n-1000"),
            runs: vec![],
            logs: vec![],
            required_files: vec![],
            stride: None,
            timestep: None,
            excluded_columns: vec![],
            write_combined: false,
            output: PathBuf::from("equilibration.csv"),
        }
    }

    fn file_config(dir: &Path, text: &str) -> FileConfig {
        let path = dir.join("campaign.toml");
        fs::write(&path, text).unwrap();
        FileConfig::from_file(&path).unwrap()
    }

    #[test]
    fn defaults_fill_every_job() {
        let file = FileConfig::default();

        let generate = build_generate_job(&generate_args(), &file).unwrap();
        assert_eq!(generate.core_config.n_molecules, 1000);
        assert!(generate.core_config.pure_component_boxes);

        let pack = build_pack_job(&pack_args(), &file).unwrap();
        assert_eq!(
            pack.core_config.box_target,
            BoxTarget::Density { grams_per_ml: 0.95 }
        );
        assert_eq!(pack.core_config.tolerance, 2.0);
        assert_eq!(pack.core_config.failure_policy, FailurePolicy::Continue);
        assert_eq!(pack.packmol, PathBuf::from("packmol"));
        assert_eq!(pack.core_config.output_root, PathBuf::from("n-1000"));

        let analyze = build_analyze_job(&analyze_args(), &file).unwrap();
        assert_eq!(
            analyze.core_config.runs,
            vec!["ne-2500000_np-1000000_dt-2.0_nb-25".to_string()]
        );
        assert_eq!(analyze.core_config.log_files, vec!["equilibration.csv".to_string()]);
        assert_eq!(analyze.core_config.required_files, vec!["production.csv".to_string()]);
        assert_eq!(analyze.core_config.sampling_stride, 1000);
        assert_eq!(analyze.core_config.timestep_fs, 2.0);
    }

    #[test]
    fn file_values_are_merged() {
        let dir = tempdir().unwrap();
        let file = file_config(
            dir.path(),
            r#"
            [generate]
            n-molecules = 500
            component-boxes = false

            [packing]
            box-size = [30.0, 30.0, 45.0]
            tolerance = 2.5
            on-failure = "abort"
            formats = ["gro"]
            topology = false
            packmol = "/opt/packmol/bin/packmol"

            [analysis]
            runs = ["run-a", "run-b"]
            logs = ["equilibration.csv", "production.csv"]
            required-files = []
            stride = 500
            timestep = 4.0
            exclude = ["Speed (ns/day)"]
            "#,
        );

        let generate = build_generate_job(&generate_args(), &file).unwrap();
        assert_eq!(generate.core_config.n_molecules, 500);
        assert!(!generate.core_config.pure_component_boxes);

        let pack = build_pack_job(&pack_args(), &file).unwrap();
        assert_eq!(
            pack.core_config.box_target,
            BoxTarget::Dimensions {
                angstroms: [30.0, 30.0, 45.0]
            }
        );
        assert_eq!(pack.core_config.tolerance, 2.5);
        assert_eq!(pack.core_config.failure_policy, FailurePolicy::Abort);
        assert_eq!(
            pack.core_config.output_formats.coordinates,
            vec![CoordinateFormat::Gro]
        );
        assert!(!pack.core_config.output_formats.topology);
        assert_eq!(pack.packmol, PathBuf::from("/opt/packmol/bin/packmol"));

        let analyze = build_analyze_job(&analyze_args(), &file).unwrap();
        assert_eq!(analyze.core_config.runs.len(), 2);
        assert_eq!(analyze.core_config.log_files.len(), 2);
        assert!(analyze.core_config.required_files.is_empty());
        assert_eq!(analyze.core_config.sampling_stride, 500);
        assert_eq!(analyze.core_config.timestep_fs, 4.0);
        assert!(!analyze.core_config.is_observable("Speed (ns/day)"));
    }

    #[test]
    fn cli_overrides_file_values() {
        let dir = tempdir().unwrap();
        let file = file_config(
            dir.path(),
            r#"
            [generate]
            n-molecules = 500

            [packing]
            box-size = [30.0, 30.0, 45.0]
            on-failure = "abort"

            [analysis]
            runs = ["run-a"]
            stride = 500
            "#,
        );

        let mut args = generate_args();
        args.n_molecules = Some(200);
        args.no_component_boxes = true;
        let generate = build_generate_job(&args, &file).unwrap();
        assert_eq!(generate.core_config.n_molecules, 200);
        assert!(!generate.core_config.pure_component_boxes);

        let mut args = pack_args();
        args.geometry.density = Some(0.8);
        args.on_failure = Some(FailurePolicy::Continue);
        args.skip_existing = true;
        let pack = build_pack_job(&args, &file).unwrap();
        assert_eq!(
            pack.core_config.box_target,
            BoxTarget::Density { grams_per_ml: 0.8 }
        );
        assert_eq!(pack.core_config.failure_policy, FailurePolicy::Continue);
        assert!(pack.core_config.skip_existing);

        let mut args = analyze_args();
        args.runs = vec!["run-z".to_string()];
        args.stride = Some(10);
        let analyze = build_analyze_job(&args, &file).unwrap();
        assert_eq!(analyze.core_config.runs, vec!["run-z".to_string()]);
        assert_eq!(analyze.core_config.sampling_stride, 10);
    }

    #[test]
    fn set_values_override_file() {
        let dir = tempdir().unwrap();
        let file = file_config(dir.path(), "[packing]\ntolerance = 2.5\n");
        let file = apply_set_values(
            file,
            &[
                "packing.tolerance=3.0".to_string(),
                "packing.on-failure=abort".to_string(),
                "generate.n-molecules=64".to_string(),
                "analysis.timestep = 1.0".to_string(),
            ],
        )
        .unwrap();

        let pack = build_pack_job(&pack_args(), &file).unwrap();
        assert_eq!(pack.core_config.tolerance, 3.0);
        assert_eq!(pack.core_config.failure_policy, FailurePolicy::Abort);
        let generate = build_generate_job(&generate_args(), &file).unwrap();
        assert_eq!(generate.core_config.n_molecules, 64);
        let analyze = build_analyze_job(&analyze_args(), &file).unwrap();
        assert_eq!(analyze.core_config.timestep_fs, 1.0);
    }

    #[test]
    fn bad_set_values_are_rejected() {
        for bad in ["packing.tolerance", "packing.colour=red", "packing.density=dense"] {
            let result = apply_set_values(FileConfig::default(), &[bad.to_string()]);
            assert!(matches!(result, Err(CliError::Config(_))), "{} accepted", bad);
        }
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("campaign.toml");
        fs::write(&path, "[packing]\ndensty = 0.9\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn pack_requires_collaborator_files() {
        let mut args = pack_args();
        args.force_field = None;
        assert!(matches!(
            build_pack_job(&args, &FileConfig::default()),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn invalid_values_surface_as_config_errors() {
        let mut args = pack_args();
        args.geometry.box_size = Some(vec![30.0, 30.0]);
        assert!(matches!(
            build_pack_job(&args, &FileConfig::default()),
            Err(CliError::Argument(_))
        ));

        let mut args = pack_args();
        args.tolerance = Some(-1.0);
        assert!(matches!(
            build_pack_job(&args, &FileConfig::default()),
            Err(CliError::Config(_))
        ));

        let mut args = generate_args();
        args.n_molecules = Some(0);
        assert!(matches!(
            build_generate_job(&args, &FileConfig::default()),
            Err(CliError::Config(_))
        ));
    }
}
