use clap::{Args, Parser, Subcommand};
use liquidbox::engine::config::{CoordinateFormat, FailurePolicy};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu, William A. Goddard III, Victor Wai Tak Kam",
    version,
    about = "liquidbox CLI - Enumerate, pack and analyze the simulation boxes of a liquid-mixture campaign.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a campaign configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S packing.tolerance=2.5
    #[arg(short = 'S', long = "set", global = true, value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Expand mixture recipes and solvation pairs into a box-spec list.
    Generate(GenerateArgs),
    /// Pack, parameterize and write out one entry of a box-spec list.
    Pack(PackArgs),
    /// Aggregate equilibration statistics over every entry's run logs.
    Analyze(AnalyzeArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Mixture recipes in JSON format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub recipes: PathBuf,

    /// Solvation table (CSV with `Solute` and `Solvent` columns).
    #[arg(short = 't', long, value_name = "PATH")]
    pub solvation_table: Option<PathBuf>,

    /// Override the target number of molecules per box.
    #[arg(short, long, value_name = "INT")]
    pub n_molecules: Option<u32>,

    /// Do not add a pure box for every recipe component.
    #[arg(long)]
    pub no_component_boxes: bool,

    /// Path for the box-spec JSON file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arguments for the `pack` subcommand.
#[derive(Args, Debug)]
pub struct PackArgs {
    // --- Core Arguments ---
    /// Box-spec JSON file written by `generate`.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Zero-based index of the entry to pack.
    #[arg(long, required = true, value_name = "INT")]
    pub index: usize,

    /// Output root; the entry is written to `<ROOT>/entry-<INDEX>/`.
    #[arg(short, long, required = true, value_name = "ROOT")]
    pub output: PathBuf,

    // --- Collaborator Overrides ---
    /// Force-field parameter file (TOML).
    #[arg(long, value_name = "PATH")]
    pub force_field: Option<PathBuf>,

    /// Template registry mapping species to structure files (TOML).
    #[arg(long, value_name = "PATH")]
    pub templates: Option<PathBuf>,

    /// Path to the packmol executable.
    #[arg(long, value_name = "PATH")]
    pub packmol: Option<PathBuf>,

    /// Random seed handed to packmol.
    #[arg(long, value_name = "INT")]
    pub seed: Option<i64>,

    // --- Box Overrides ---
    #[command(flatten)]
    pub geometry: BoxGeometry,

    /// Override the minimum distance between molecules, in Angstroms.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    // --- Behavior Overrides ---
    /// What to do when the box cannot be packed.
    #[arg(long, value_name = "POLICY")]
    pub on_failure: Option<FailurePolicy>,

    /// Return immediately if the entry already has a snapshot.
    #[arg(long)]
    pub skip_existing: bool,

    /// Coordinate formats to write, comma separated (bgf, gro).
    #[arg(long, value_name = "FORMATS", value_delimiter = ',')]
    pub format: Option<Vec<CoordinateFormat>>,
}

/// Mutually exclusive ways of sizing the box.
#[derive(Args, Debug, Clone, Default)]
#[group(required = false, multiple = false)]
pub struct BoxGeometry {
    /// Target mass density in g/mL; the box is cubic.
    #[arg(long, value_name = "G_PER_ML")]
    pub density: Option<f64>,

    /// Fixed box edges in Angstroms.
    #[arg(long, value_name = "X,Y,Z", value_delimiter = ',')]
    pub box_size: Option<Vec<f64>>,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Output root holding the `entry-*` directories.
    #[arg(short, long, required = true, value_name = "ROOT")]
    pub input: PathBuf,

    /// Run label to analyze; can be used multiple times.
    #[arg(short, long = "run", value_name = "LABEL")]
    pub runs: Vec<String>,

    /// Log file name inside each run directory; multiple logs are concatenated in order.
    #[arg(long = "log", value_name = "NAME")]
    pub logs: Vec<String>,

    /// File that must exist in a run directory before it is analyzed; can be used multiple times.
    #[arg(long = "require", value_name = "NAME")]
    pub required_files: Vec<String>,

    /// Override the number of steps between logged samples.
    #[arg(long, value_name = "INT")]
    pub stride: Option<u64>,

    /// Override the integration timestep in femtoseconds.
    #[arg(long, value_name = "FS")]
    pub timestep: Option<f64>,

    /// Additional log column to leave out; can be used multiple times.
    #[arg(long = "exclude", value_name = "COLUMN")]
    pub excluded_columns: Vec<String>,

    /// Write `combined.csv` with rebuilt step and time columns into every run directory.
    #[arg(long)]
    pub write_combined: bool,

    /// Path for the aggregate CSV table.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn pack_arguments_parse() {
        let cli = Cli::try_parse_from([
            "lbox",
            "-vv",
            "pack",
            "-i",
            "liquid-boxes.json",
            "--index",
            "12",
            "-o",
            "n-1000",
            "--box-size",
            "30,30,40",
            "--on-failure",
            "abort",
            "--format",
            "gro",
            "-S",
            "packing.tolerance=2.5",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.set_values, vec!["packing.tolerance=2.5".to_string()]);
        let Commands::Pack(args) = cli.command else {
            panic!("expected pack");
        };
        assert_eq!(args.index, 12);
        assert_eq!(args.geometry.box_size, Some(vec![30.0, 30.0, 40.0]));
        assert_eq!(args.on_failure, Some(FailurePolicy::Abort));
        assert_eq!(args.format, Some(vec![CoordinateFormat::Gro]));
    }

    #[test]
    fn density_and_box_size_are_exclusive() {
        let result = Cli::try_parse_from([
            "lbox", "pack", "-i", "a.json", "--index", "0", "-o", "out", "--density", "0.9",
            "--box-size", "1,2,3",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn analyze_collects_repeated_flags() {
        let cli = Cli::try_parse_from([
            "lbox", "analyze", "-i", "n-1000", "-r", "run-a", "-r", "run-b", "--log",
            "equilibration.csv", "--log", "production.csv", "-o", "eq.csv",
        ])
        .unwrap();
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.runs, vec!["run-a", "run-b"]);
        assert_eq!(args.logs, vec!["equilibration.csv", "production.csv"]);
    }
}
