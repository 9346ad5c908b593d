use crate::core::models::box_entry::{BoxEntry, BoxSpecRecord, BoxSpecSet};
use crate::core::models::species::{MixtureRecipe, SolutePair};
use crate::engine::config::{ConfigError, GenerationConfig};
use crate::engine::error::EngineError;
use tracing::{debug, info, instrument};

/// Absolute tolerance on the sum of a recipe's mole fractions.
pub const MOLE_FRACTION_TOLERANCE: f64 = 1e-9;

fn validate_recipe(index: usize, recipe: &MixtureRecipe) -> Result<(), EngineError> {
    let invalid = |reason: String| EngineError::Validation {
        recipe: index,
        reason,
    };
    if recipe.components.is_empty() {
        return Err(invalid("recipe has no components".to_string()));
    }
    for component in &recipe.components {
        let x = component.mole_fraction;
        if !x.is_finite() || !(0.0..=1.0).contains(&x) {
            return Err(invalid(format!(
                "mole fraction of '{}' is {}, expected a value in [0, 1]",
                component.smiles, x
            )));
        }
    }
    let sum = recipe.mole_fraction_sum();
    if (sum - 1.0).abs() > MOLE_FRACTION_TOLERANCE {
        return Err(invalid(format!("mole fractions sum to {}, expected 1", sum)));
    }
    Ok(())
}

/// Integer molecule count of a component, rounding half to even.
///
/// Counts are not renormalized, so a recipe's counts may not add up to `n_molecules`.
pub fn molecule_count(mole_fraction: f64, n_molecules: u32) -> u32 {
    (mole_fraction * f64::from(n_molecules)).round_ties_even() as u32
}

/// Expands recipes, pure solvents and solute/solvent pairs into the
/// deduplicated, deterministically ordered list of boxes to simulate.
///
/// Every recipe is validated before anything is produced; one malformed
/// recipe fails the whole batch. The output order only depends on the set of
/// entries, so indices into the list are stable across runs.
#[instrument(skip_all, name = "generate_workflow", fields(n_molecules = config.n_molecules))]
pub fn generate(
    recipes: &[MixtureRecipe],
    pure_solvents: &[String],
    pairs: &[SolutePair],
    config: &GenerationConfig,
) -> Result<Vec<BoxEntry>, EngineError> {
    let n = config.n_molecules;
    if n == 0 {
        return Err(ConfigError::InvalidValue {
            parameter: "n_molecules",
            reason: "a box must hold at least one molecule".to_string(),
        }
        .into());
    }
    for (index, recipe) in recipes.iter().enumerate() {
        validate_recipe(index, recipe)?;
    }

    let mut set = BoxSpecSet::new();
    for recipe in recipes {
        let mixed = BoxEntry::canonical(
            recipe
                .components
                .iter()
                .map(|c| (c.smiles.clone(), molecule_count(c.mole_fraction, n)))
                .collect(),
        );
        debug!(entry = %mixed, "Mixture box");
        set.insert(mixed);

        if config.pure_component_boxes {
            set.extend(
                recipe
                    .components
                    .iter()
                    .map(|c| BoxEntry::pure(c.smiles.clone(), n)),
            );
        }
    }
    set.extend(pure_solvents.iter().map(|s| BoxEntry::pure(s.clone(), n)));
    set.extend(
        pairs
            .iter()
            .map(|p| BoxEntry::solvated(p.solute.clone(), p.solvent.clone(), n)),
    );

    let entries = set.into_sorted();
    info!(
        recipes = recipes.len(),
        pure_solvents = pure_solvents.len(),
        pairs = pairs.len(),
        entries = entries.len(),
        "Generated box specifications"
    );
    Ok(entries)
}

pub fn to_records(entries: &[BoxEntry]) -> Vec<BoxSpecRecord> {
    entries.iter().map(BoxEntry::to_record).collect()
}
