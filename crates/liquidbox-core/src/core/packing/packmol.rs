use crate::core::io::traits::MolecularFile;
use crate::core::io::xyz::XyzFile;
use crate::core::models::molecule::MoleculeTemplate;
use crate::core::models::system::{MolecularSystem, orthorhombic_box};
use crate::engine::collaborators::{PackedCoordinates, Packer, PackingError, PackingRequest};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

pub const INPUT_FILE: &str = "packmol.inp";
pub const OUTPUT_FILE: &str = "packed.xyz";
const SOLUTE_FILE: &str = "solute.xyz";
const SUCCESS_MARKER: &str = "Success!";
const REPORTED_OUTPUT_LINES: usize = 20;

/// Packs boxes by running the packmol program.
#[derive(Debug, Clone)]
pub struct PackmolPacker {
    executable: PathBuf,
    args: Vec<String>,
    seed: Option<i64>,
}

impl PackmolPacker {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
            seed: None,
        }
    }

    /// Arguments passed before the input script is fed on stdin.
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The packmol input for `request` in a box of the given edges.
    ///
    /// Molecules are kept `tolerance / 2` away from the box faces so that
    /// periodic images respect the tolerance too. A centered solute is fixed at
    /// the box center; otherwise it is placed like any bulk molecule.
    pub fn input_script(&self, request: &PackingRequest<'_>, edges: [f64; 3]) -> String {
        let margin = request.tolerance / 2.0;
        let inside_box = format!(
            "  inside box {:.3} {:.3} {:.3} {:.3} {:.3} {:.3}",
            margin,
            margin,
            margin,
            edges[0] - margin,
            edges[1] - margin,
            edges[2] - margin
        );

        let mut script = String::new();
        let _ = writeln!(script, "tolerance {:.3}", request.tolerance);
        let _ = writeln!(script, "filetype xyz");
        let _ = writeln!(script, "output {}", OUTPUT_FILE);
        if let Some(seed) = self.seed {
            let _ = writeln!(script, "seed {}", seed);
        }

        if request.solute.is_some() {
            let _ = writeln!(script);
            let _ = writeln!(script, "structure {}", SOLUTE_FILE);
            let _ = writeln!(script, "  number 1");
            if request.center_solute {
                let _ = writeln!(script, "  center");
                let _ = writeln!(
                    script,
                    "  fixed {:.3} {:.3} {:.3} 0. 0. 0.",
                    edges[0] / 2.0,
                    edges[1] / 2.0,
                    edges[2] / 2.0
                );
            } else {
                let _ = writeln!(script, "{}", inside_box);
            }
            let _ = writeln!(script, "end structure");
        }

        for (k, (_, count)) in request.species.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let _ = writeln!(script);
            let _ = writeln!(script, "structure {}", species_file(k));
            let _ = writeln!(script, "  number {}", count);
            let _ = writeln!(script, "{}", inside_box);
            let _ = writeln!(script, "end structure");
        }
        script
    }

    fn write_template(template: &MoleculeTemplate, path: &Path) -> Result<(), PackingError> {
        let system = MolecularSystem {
            atoms: template.atoms.clone(),
            ..Default::default()
        };
        XyzFile::write_system_to_path(&system, path).map_err(|e| {
            PackingError::Output(format!("cannot write template {}: {}", path.display(), e))
        })
    }
}

fn species_file(k: usize) -> String {
    format!("species-{}.xyz", k)
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

impl Packer for PackmolPacker {
    fn pack(&self, request: &PackingRequest<'_>) -> Result<PackedCoordinates, PackingError> {
        let dir = request.working_directory;
        let edges = request.box_edges();
        info!(
            edges = ?edges,
            mass = request.total_mass(),
            "Packing box with packmol"
        );

        if let Some(solute) = request.solute {
            Self::write_template(solute, &dir.join(SOLUTE_FILE))?;
        }
        for (k, (template, count)) in request.species.iter().enumerate() {
            if *count > 0 {
                Self::write_template(template, &dir.join(species_file(k)))?;
            }
        }
        let input_path = dir.join(INPUT_FILE);
        fs::write(&input_path, self.input_script(request, edges))?;
        let output_path = dir.join(OUTPUT_FILE);
        if output_path.exists() {
            fs::remove_file(&output_path)?;
        }

        let program = self.executable.display().to_string();
        debug!(program = %program, dir = %dir.display(), "Launching packer");
        let output = Command::new(&self.executable)
            .args(&self.args)
            .current_dir(dir)
            .stdin(Stdio::from(File::open(&input_path)?))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| PackingError::Launch { program, source })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() || !stdout.contains(SUCCESS_MARKER) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = ?output.status.code(), "Packer did not report success");
            return Err(PackingError::Unsatisfied(format!(
                "exit status {:?}\n{}\n{}",
                output.status.code(),
                tail(&stdout, REPORTED_OUTPUT_LINES),
                tail(&stderr, REPORTED_OUTPUT_LINES)
            )));
        }

        let (packed, _) = XyzFile::read_from_path(&output_path).map_err(|e| {
            PackingError::Output(format!("{}: {}", output_path.display(), e))
        })?;
        Ok(PackedCoordinates {
            positions: packed.atoms.iter().map(|a| a.position).collect(),
            box_vectors: orthorhombic_box(edges),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::element::Element;
    use crate::engine::collaborators::BoxTarget;
    use nalgebra::Point3;
    use tempfile::tempdir;

    fn water() -> MoleculeTemplate {
        let mut t = MoleculeTemplate::new("O", "HOH");
        t.atoms.push(Atom::new("OW", Element::O, Point3::new(0.0, 0.0, 0.1)));
        t.atoms.push(Atom::new("HW1", Element::H, Point3::new(0.0, 0.75, -0.47)));
        t.atoms.push(Atom::new("HW2", Element::H, Point3::new(0.0, -0.75, -0.47)));
        t
    }

    fn ion() -> MoleculeTemplate {
        let mut t = MoleculeTemplate::new("[Na+]", "NA");
        t.atoms.push(Atom::new("NA", Element::Na, Point3::origin()));
        t
    }

    fn request<'a>(
        water: &'a MoleculeTemplate,
        ion: &'a MoleculeTemplate,
        dir: &'a Path,
    ) -> PackingRequest<'a> {
        PackingRequest {
            species: vec![(water, 2)],
            solute: Some(ion),
            center_solute: true,
            tolerance: 2.0,
            target: BoxTarget::Dimensions {
                angstroms: [20.0, 20.0, 30.0],
            },
            working_directory: dir,
        }
    }

    #[test]
    fn script_fixes_centered_solute_and_shrinks_box() {
        let (w, i) = (water(), ion());
        let req = request(&w, &i, Path::new("."));
        let script = PackmolPacker::new("packmol")
            .with_seed(7)
            .input_script(&req, req.box_edges());

        assert!(script.starts_with("tolerance 2.000\nfiletype xyz\noutput packed.xyz\nseed 7\n"));
        assert!(script.contains(
            "structure solute.xyz\n  number 1\n  center\n  fixed 10.000 10.000 15.000 0. 0. 0.\nend structure"
        ));
        assert!(script.contains(
            "structure species-0.xyz\n  number 2\n  inside box 1.000 1.000 1.000 19.000 19.000 29.000\nend structure"
        ));
    }

    #[test]
    fn script_skips_zero_count_species_and_places_free_solute_in_box() {
        let (w, i) = (water(), ion());
        let mut req = request(&w, &i, Path::new("."));
        req.center_solute = false;
        req.species = vec![(&i, 0), (&w, 5)];
        let script = PackmolPacker::new("packmol").input_script(&req, [10.0, 10.0, 10.0]);

        assert!(!script.contains("species-0.xyz"));
        assert!(script.contains("structure species-1.xyz\n  number 5"));
        assert!(!script.contains("fixed"));
        assert_eq!(script.matches("inside box").count(), 2);
    }

    #[test]
    fn missing_executable_is_a_launch_error() {
        let dir = tempdir().unwrap();
        let (w, i) = (water(), ion());
        let req = request(&w, &i, dir.path());
        let err = PackmolPacker::new(dir.path().join("no-such-packmol"))
            .pack(&req)
            .unwrap_err();
        assert!(matches!(err, PackingError::Launch { .. }));
        assert!(dir.path().join(INPUT_FILE).exists());
        assert!(dir.path().join("species-0.xyz").exists());
    }

    #[cfg(unix)]
    #[test]
    fn reads_coordinates_written_by_a_successful_run() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("fake-packmol.sh");
        fs::write(
            &fake,
            "cat > /dev/null\ncp expected.xyz packed.xyz\necho 'Success!'\n",
        )
        .unwrap();
        let coords: String = (0..7).map(|k| format!("C {}.0 0.0 0.0\n", k)).collect();
        fs::write(dir.path().join("expected.xyz"), format!("7\npacked\n{}", coords)).unwrap();

        let (w, i) = (water(), ion());
        let req = request(&w, &i, dir.path());
        let packed = PackmolPacker::new("sh")
            .with_args(vec![fake.display().to_string()])
            .pack(&req)
            .unwrap();
        assert_eq!(packed.positions.len(), 7);
        assert_eq!(packed.positions[6], Point3::new(6.0, 0.0, 0.0));
        assert_eq!(packed.box_vectors, orthorhombic_box([20.0, 20.0, 30.0]));
    }

    #[cfg(unix)]
    #[test]
    fn missing_success_marker_is_unsatisfied() {
        let dir = tempdir().unwrap();
        let fake = dir.path().join("fake-packmol.sh");
        fs::write(
            &fake,
            "cat > /dev/null\necho 'ERROR: Could not pack molecules'\nexit 173\n",
        )
        .unwrap();

        let (w, i) = (water(), ion());
        let req = request(&w, &i, dir.path());
        let err = PackmolPacker::new("sh")
            .with_args(vec![fake.display().to_string()])
            .pack(&req)
            .unwrap_err();
        match err {
            PackingError::Unsatisfied(message) => {
                assert!(message.contains("Could not pack molecules"));
                assert!(message.contains("173"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
