use crate::core::io::runlog::RunLog;
use crate::core::models::ids::EntryId;
use crate::engine::collaborators::EquilibrationDetector;
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub const COMBINED_LOG_FILE: &str = "combined.csv";

/// Equilibration statistics of one observable of one run of one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquilibrationRecord {
    pub entry: EntryId,
    pub run: String,
    pub property: String,
    pub t0: usize,
    pub g: f64,
    #[serde(rename = "Neff_max")]
    pub neff_max: f64,
}

/// Aggregated records in discovery order: sorted entries, then runs in
/// configuration order, then columns in log order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EquilibrationTable {
    records: Vec<EquilibrationRecord>,
}

impl EquilibrationTable {
    pub fn records(&self) -> &[EquilibrationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Writes the table with the header `entry,run,property,t0,g,Neff_max`.
    pub fn write_csv(&self, path: &Path) -> Result<(), EngineError> {
        let csv_err = |e: csv::Error| EngineError::io(path, std::io::Error::other(e));
        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        if self.records.is_empty() {
            writer
                .write_record(["entry", "run", "property", "t0", "g", "Neff_max"])
                .map_err(csv_err)?;
        }
        for record in &self.records {
            writer.serialize(record).map_err(csv_err)?;
        }
        writer.flush().map_err(|e| EngineError::io(path, e))
    }

    pub fn read_csv(path: &Path) -> Result<Self, EngineError> {
        let mut reader = csv::Reader::from_path(path)
            .map_err(|e| EngineError::parse(path, e.to_string()))?;
        let records = reader
            .deserialize()
            .collect::<Result<Vec<EquilibrationRecord>, _>>()
            .map_err(|e| EngineError::parse(path, e.to_string()))?;
        Ok(Self { records })
    }
}

impl IntoIterator for EquilibrationTable {
    type Item = EquilibrationRecord;
    type IntoIter = std::vec::IntoIter<EquilibrationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Runs equilibration detection over every run log below an output root.
///
/// The expected layout is `<root>/entry-<index>/<run>/<log>`.
pub struct EquilibrationAnalyzer<'a, D> {
    detector: &'a D,
    config: &'a AnalysisConfig,
}

impl<'a, D: EquilibrationDetector> EquilibrationAnalyzer<'a, D> {
    pub fn new(detector: &'a D, config: &'a AnalysisConfig) -> Self {
        Self { detector, config }
    }

    #[instrument(skip_all, name = "equilibration_workflow", fields(root = %root.display()))]
    pub fn run(
        &self,
        root: &Path,
        reporter: &ProgressReporter,
    ) -> Result<EquilibrationTable, EngineError> {
        // === Phase 1: Discover entries ===
        reporter.report(Progress::PhaseStart {
            name: "Discovering Entries",
        });
        let entries = discover_entries(root)?;
        info!(
            entries = entries.len(),
            runs = self.config.runs.len(),
            "Discovered entry directories."
        );
        reporter.report(Progress::PhaseFinish);

        // === Phase 2: Analyze run logs ===
        reporter.report(Progress::PhaseStart {
            name: "Equilibration Detection",
        });
        reporter.report(Progress::TaskStart {
            total_steps: (entries.len() * self.config.runs.len()) as u64,
        });
        let mut table = EquilibrationTable::default();
        let mut analyzed = 0usize;
        for (id, directory) in &entries {
            for run in &self.config.runs {
                if self.analyze_run(*id, run, &directory.join(run), &mut table)? {
                    analyzed += 1;
                }
                reporter.report(Progress::TaskIncrement);
            }
        }
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        info!(
            runs_analyzed = analyzed,
            records = table.len(),
            "Equilibration analysis complete."
        );
        Ok(table)
    }

    /// Appends the records of one run. Returns `false` if the run is not
    /// finished yet or one of its logs is missing.
    fn analyze_run(
        &self,
        id: EntryId,
        run: &str,
        run_dir: &Path,
        table: &mut EquilibrationTable,
    ) -> Result<bool, EngineError> {
        if let Some(marker) = self
            .config
            .required_files
            .iter()
            .map(|name| run_dir.join(name))
            .find(|p| !p.is_file())
        {
            debug!(entry = %id, run, path = %marker.display(), "Run is not finished, skipping.");
            return Ok(false);
        }

        let paths: Vec<PathBuf> = self
            .config
            .log_files
            .iter()
            .map(|name| run_dir.join(name))
            .collect();
        if let Some(missing) = paths.iter().find(|p| !p.is_file()) {
            debug!(entry = %id, run, path = %missing.display(), "Run log is missing, skipping.");
            return Ok(false);
        }

        let log = RunLog::read_concatenated(&paths)?;
        debug!(entry = %id, run, samples = log.len(), "Read run log.");

        if self.config.write_combined {
            let combined = run_dir.join(COMBINED_LOG_FILE);
            self.combined_log(&log).write_path(&combined)?;
        }

        for (property, samples) in log.iter().filter(|(name, _)| self.config.is_observable(name)) {
            let estimate = self.detector.detect(samples);
            debug!(
                entry = %id,
                run,
                property,
                t0 = estimate.t0,
                g = estimate.g,
                neff_max = estimate.neff_max,
                "Detected equilibration."
            );
            table.records.push(EquilibrationRecord {
                entry: id,
                run: run.to_string(),
                property: property.to_string(),
                t0: estimate.t0,
                g: estimate.g,
                neff_max: estimate.neff_max,
            });
        }
        Ok(true)
    }

    /// The log with its step and time columns rebuilt from the sampling stride.
    fn combined_log(&self, log: &RunLog) -> RunLog {
        let steps: Vec<u64> = (1..=log.len() as u64)
            .map(|k| k * self.config.sampling_stride)
            .collect();
        let mut columns = vec![
            (
                self.config.step_column.clone(),
                steps.iter().map(|&s| s as f64).collect(),
            ),
            (
                self.config.time_column.clone(),
                steps.iter().map(|&s| self.config.step_to_ps(s)).collect(),
            ),
        ];
        columns.extend(
            log.iter()
                .filter(|(name, _)| self.config.is_observable(name))
                .map(|(name, values)| (name.to_string(), values.to_vec())),
        );
        RunLog::from_columns(columns)
    }
}

/// Entry directories directly below `root`, sorted by index.
fn discover_entries(root: &Path) -> Result<Vec<(EntryId, PathBuf)>, EngineError> {
    let mut entries = Vec::new();
    for item in fs::read_dir(root).map_err(|e| EngineError::io(root, e))? {
        let item = item.map_err(|e| EngineError::io(root, e))?;
        let path = item.path();
        if !path.is_dir() {
            continue;
        }
        match item.file_name().to_str().map(str::parse::<EntryId>) {
            Some(Ok(id)) => entries.push((id, path)),
            _ => debug!(path = %path.display(), "Ignoring non-entry directory."),
        }
    }
    entries.sort();
    if let Some(pair) = entries.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(EngineError::parse(
            &pair[1].1,
            format!(
                "directory holds {} which is already stored in '{}'",
                pair[1].0,
                pair[0].1.display()
            ),
        ));
    }
    Ok(entries)
}
