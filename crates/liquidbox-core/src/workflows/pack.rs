use crate::core::io::bgf::BgfFile;
use crate::core::io::gro::{GroFile, GroMetadata};
use crate::core::io::topfile::write_topology_path;
use crate::core::io::traits::MolecularFile;
use crate::core::models::box_entry::BoxEntry;
use crate::core::models::ids::EntryId;
use crate::core::models::molecule::MoleculeTemplate;
use crate::core::models::system::MolecularSystem;
use crate::engine::collaborators::{Packer, PackingRequest, Parameterizer, StructureResolver};
use crate::engine::config::{CoordinateFormat, FailurePolicy, PackingConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

pub const SNAPSHOT_FILE: &str = "system.json";
pub const TOPOLOGY_FILE: &str = "system.top";
pub const TIMING_FILE: &str = "time.json";
pub const ERROR_FILE: &str = "error.txt";

/// The elapsed-time provenance record, `{"time": <seconds>}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    pub time: f64,
}

/// Files written by a successful packing.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingArtifacts {
    pub snapshot: PathBuf,
    pub coordinates: Vec<PathBuf>,
    pub topology: Option<PathBuf>,
    pub timing: PathBuf,
    pub atom_count: usize,
    pub molecule_count: usize,
}

/// A captured packing failure and the error file it was written to.
#[derive(Debug, Clone, PartialEq)]
pub struct PackingFailureRecord {
    pub message: String,
    pub error_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PackingOutcome {
    Packed(PackingArtifacts),
    Failed(PackingFailureRecord),
    /// The entry already had a snapshot and nothing was recomputed.
    Skipped { existing: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackingAttempt {
    pub index: usize,
    pub directory: PathBuf,
    /// Wall-clock time of the packer call; zero when it was not invoked.
    pub elapsed: Duration,
    pub outcome: PackingOutcome,
}

impl PackingAttempt {
    pub fn is_packed(&self) -> bool {
        matches!(self.outcome, PackingOutcome::Packed(_))
    }
}

/// Packs, parameterizes and writes out one entry of a box-spec list.
///
/// Every invocation touches only `<output_root>/entry-<index>/`, so several
/// processes may run over distinct indices of the same list at once.
pub struct PackingOrchestrator<'a, R, P, Z> {
    resolver: &'a R,
    packer: &'a P,
    parameterizer: &'a Z,
    config: &'a PackingConfig,
}

struct ResolvedEntry {
    solute: Option<MoleculeTemplate>,
    bulk: Vec<(MoleculeTemplate, u32)>,
}

impl<'a, R, P, Z> PackingOrchestrator<'a, R, P, Z>
where
    R: StructureResolver,
    P: Packer,
    Z: Parameterizer,
{
    pub fn new(
        resolver: &'a R,
        packer: &'a P,
        parameterizer: &'a Z,
        config: &'a PackingConfig,
    ) -> Self {
        Self {
            resolver,
            packer,
            parameterizer,
            config,
        }
    }

    pub fn entry_directory(&self, index: usize) -> PathBuf {
        self.config
            .output_root
            .join(EntryId(index).directory_name())
    }

    #[instrument(skip_all, name = "packing_workflow", fields(index = index))]
    pub fn run(
        &self,
        entries: &[BoxEntry],
        index: usize,
        reporter: &ProgressReporter,
    ) -> Result<PackingAttempt, EngineError> {
        let entry = entries
            .get(index)
            .ok_or(EngineError::EntryIndexOutOfRange {
                index,
                len: entries.len(),
            })?;
        let directory = self.entry_directory(index);
        info!(entry = %entry, directory = %directory.display(), "Packing entry.");

        if self.config.skip_existing {
            let existing = directory.join(SNAPSHOT_FILE);
            if existing.is_file() {
                info!(path = %existing.display(), "Snapshot already exists, skipping entry.");
                return Ok(PackingAttempt {
                    index,
                    directory,
                    elapsed: Duration::ZERO,
                    outcome: PackingOutcome::Skipped { existing },
                });
            }
        }

        // === Phase 1: Resolve molecular structures ===
        reporter.report(Progress::PhaseStart {
            name: "Resolving Structures",
        });
        let resolved = self.resolve(entry, index)?;
        reporter.report(Progress::PhaseFinish);

        fs::create_dir_all(&directory).map_err(|e| EngineError::io(&directory, e))?;

        // === Phase 2: Pack ===
        reporter.report(Progress::PhaseStart { name: "Packing" });
        let bulk: Vec<(&MoleculeTemplate, u32)> =
            resolved.bulk.iter().map(|(t, n)| (t, *n)).collect();
        let request = PackingRequest {
            species: bulk.clone(),
            solute: resolved.solute.as_ref(),
            center_solute: self.config.center_solute,
            tolerance: self.config.tolerance,
            target: self.config.box_target,
            working_directory: &directory,
        };
        let start = Instant::now();
        let packed = self.packer.pack(&request);
        let elapsed = start.elapsed();
        let timing = write_timing(&directory, elapsed)?;
        reporter.report(Progress::PhaseFinish);

        let assembled = packed.map_err(|e| e.to_string()).and_then(|coords| {
            MolecularSystem::assemble(
                resolved.solute.as_ref(),
                &bulk,
                &coords.positions,
                coords.box_vectors,
            )
            .map_err(|e| e.to_string())
        });
        let mut system = match assembled {
            Ok(system) => system,
            Err(message) => return self.record_failure(index, directory, elapsed, message),
        };
        info!(
            atoms = system.atom_count(),
            molecules = system.molecule_count(),
            seconds = elapsed.as_secs_f64(),
            "Packing succeeded."
        );

        // === Phase 3: Parameterize ===
        reporter.report(Progress::PhaseStart {
            name: "Parameterization",
        });
        self.parameterizer
            .parameterize(&mut system)
            .map_err(|source| EngineError::Parameterization { index, source })?;
        reporter.report(Progress::PhaseFinish);

        // === Phase 4: Write artifacts ===
        reporter.report(Progress::PhaseStart {
            name: "Writing Artifacts",
        });
        let artifacts = self.write_artifacts(entry, &system, &directory, timing)?;
        let stale_error = directory.join(ERROR_FILE);
        if stale_error.exists() {
            debug!(path = %stale_error.display(), "Removing error file of an earlier attempt.");
            fs::remove_file(&stale_error).map_err(|e| EngineError::io(&stale_error, e))?;
        }
        reporter.report(Progress::PhaseFinish);

        Ok(PackingAttempt {
            index,
            directory,
            elapsed,
            outcome: PackingOutcome::Packed(artifacts),
        })
    }

    /// Resolves every species, detaching a leading count-one species as the solute.
    fn resolve(&self, entry: &BoxEntry, index: usize) -> Result<ResolvedEntry, EngineError> {
        let resolve = |species: &str| {
            self.resolver
                .resolve(species)
                .map_err(|source| EngineError::StructureResolution {
                    index,
                    species: species.to_string(),
                    source,
                })
        };

        let mut components = entry.components().iter();
        let solute = if entry.has_embedded_solute() {
            components
                .next()
                .map(|(species, _)| resolve(species))
                .transpose()?
        } else {
            None
        };
        let bulk = components
            .map(|(species, count)| resolve(species).map(|template| (template, *count)))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            solute = solute.as_ref().map(|t| t.species.as_str()),
            bulk_species = bulk.len(),
            "Resolved entry structures."
        );
        Ok(ResolvedEntry { solute, bulk })
    }

    fn record_failure(
        &self,
        index: usize,
        directory: PathBuf,
        elapsed: Duration,
        message: String,
    ) -> Result<PackingAttempt, EngineError> {
        remove_success_artifacts(&directory)?;
        let error_file = directory.join(ERROR_FILE);
        fs::write(&error_file, format!("{}\n", message))
            .map_err(|e| EngineError::io(&error_file, e))?;
        warn!(
            policy = %self.config.failure_policy,
            error_file = %error_file.display(),
            "Packing failed: {}",
            message
        );

        match self.config.failure_policy {
            FailurePolicy::Abort => Err(EngineError::Packing { index, message }),
            FailurePolicy::Continue => Ok(PackingAttempt {
                index,
                directory,
                elapsed,
                outcome: PackingOutcome::Failed(PackingFailureRecord {
                    message,
                    error_file,
                }),
            }),
        }
    }

    fn write_artifacts(
        &self,
        entry: &BoxEntry,
        system: &MolecularSystem,
        directory: &Path,
        timing: PathBuf,
    ) -> Result<PackingArtifacts, EngineError> {
        let snapshot = directory.join(SNAPSHOT_FILE);
        write_snapshot(system, &snapshot)?;

        let mut coordinates = Vec::new();
        for format in &self.config.output_formats.coordinates {
            let path = directory.join(format.file_name());
            let written = match format {
                CoordinateFormat::Bgf => {
                    BgfFile::write_system_to_path(system, &path).map_err(|e| e.to_string())
                }
                CoordinateFormat::Gro => {
                    let metadata = GroMetadata {
                        title: entry.to_string(),
                    };
                    GroFile::write_to_path(system, &metadata, &path).map_err(|e| e.to_string())
                }
            };
            written.map_err(|reason| EngineError::io(&path, io::Error::other(reason)))?;
            coordinates.push(path);
        }

        let topology = if self.config.output_formats.topology {
            let path = directory.join(TOPOLOGY_FILE);
            write_topology_path(system, &entry.to_string(), &path)
                .map_err(|e| EngineError::io(&path, io::Error::other(e.to_string())))?;
            Some(path)
        } else {
            None
        };

        debug!(
            coordinates = coordinates.len(),
            topology = topology.is_some(),
            "Wrote entry artifacts."
        );
        Ok(PackingArtifacts {
            snapshot,
            coordinates,
            topology,
            timing,
            atom_count: system.atom_count(),
            molecule_count: system.molecule_count(),
        })
    }
}

/// Clears the outputs of an earlier successful attempt so a failed entry
/// never carries a snapshot or structure files next to its `error.txt`.
fn remove_success_artifacts(directory: &Path) -> Result<(), EngineError> {
    let coordinates = [CoordinateFormat::Bgf, CoordinateFormat::Gro].map(|f| f.file_name());
    for name in [SNAPSHOT_FILE, TOPOLOGY_FILE].into_iter().chain(coordinates) {
        let path = directory.join(name);
        if path.exists() {
            debug!(path = %path.display(), "Removing output of an earlier successful attempt.");
            fs::remove_file(&path).map_err(|e| EngineError::io(&path, e))?;
        }
    }
    Ok(())
}

fn write_timing(directory: &Path, elapsed: Duration) -> Result<PathBuf, EngineError> {
    let path = directory.join(TIMING_FILE);
    let record = TimingRecord {
        time: elapsed.as_secs_f64(),
    };
    let text = serde_json::to_string(&record)
        .map_err(|e| EngineError::io(&path, io::Error::other(e)))?;
    fs::write(&path, text).map_err(|e| EngineError::io(&path, e))?;
    Ok(path)
}

fn write_snapshot(system: &MolecularSystem, path: &Path) -> Result<(), EngineError> {
    let file = File::create(path).map_err(|e| EngineError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, system)
        .map_err(|e| EngineError::io(path, io::Error::other(e)))?;
    writer.flush().map_err(|e| EngineError::io(path, e))
}

/// Reads back a snapshot written by a successful packing.
pub fn read_snapshot(path: &Path) -> Result<MolecularSystem, EngineError> {
    let text = fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
    serde_json::from_str(&text).map_err(|e| EngineError::parse(path, e.to_string()))
}
