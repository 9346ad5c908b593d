use super::element::Element;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Lennard-Jones parameters attached to an atom by force-field parameterization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LennardJones {
    /// Collision diameter in Angstroms.
    pub sigma: f64,
    /// Well depth in kcal/mol.
    pub epsilon: f64,
}

/// An atom of a molecular template or of a packed system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// The name of the atom (e.g., "C1", "OW").
    pub name: String,
    pub element: Element,
    /// The force field atom type (e.g., "C_3", "O_3").
    pub force_field_type: String,
    /// The partial atomic charge in elementary charge units.
    pub partial_charge: f64,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// Interaction parameters, present once the atom has been parameterized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lj: Option<LennardJones>,
}

impl Atom {
    /// Creates a new `Atom` with no charge, no force-field type and no parameters.
    pub fn new(name: &str, element: Element, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element,
            force_field_type: String::new(),
            partial_charge: 0.0,
            position,
            lj: None,
        }
    }

    pub fn mass(&self) -> f64 {
        self.element.atomic_mass()
    }

    pub fn is_parameterized(&self) -> bool {
        self.lj.is_some()
    }
}
