use serde::{Deserialize, Serialize};

/// A single chemical species of a mixture together with its mole fraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Structure-encoding identifier of the species (typically SMILES).
    pub smiles: String,
    /// Proportion of the mixture's molecules contributed by this species.
    pub mole_fraction: f64,
}

impl Component {
    pub fn new(smiles: impl Into<String>, mole_fraction: f64) -> Self {
        Self {
            smiles: smiles.into(),
            mole_fraction,
        }
    }
}

/// A mixture recipe: the components whose mole fractions must sum to one.
///
/// Extra keys present in upstream data sets (property type, reference values,
/// and so on) are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MixtureRecipe {
    pub components: Vec<Component>,
}

impl MixtureRecipe {
    pub fn new(components: Vec<Component>) -> Self {
        Self { components }
    }

    pub fn mole_fraction_sum(&self) -> f64 {
        self.components.iter().map(|c| c.mole_fraction).sum()
    }
}

/// A solute embedded as a single molecule in a bulk solvent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SolutePair {
    #[serde(rename = "Solute")]
    pub solute: String,
    #[serde(rename = "Solvent")]
    pub solvent: String,
}

impl SolutePair {
    pub fn new(solute: impl Into<String>, solvent: impl Into<String>) -> Self {
        Self {
            solute: solute.into(),
            solvent: solvent.into(),
        }
    }
}
