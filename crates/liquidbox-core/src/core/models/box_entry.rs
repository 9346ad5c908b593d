use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// A concrete, integer-count composition of one simulation box.
///
/// The entry is an ordered sequence of `(species, count)` pairs. Equality,
/// ordering and hashing are all structural over that sequence, which makes
/// the entry itself the canonical deduplication key: two entries are the same
/// box exactly when their ordered pair sequences are equal.
///
/// The derived ordering is lexicographic over the pairs (species first, then
/// count), with a shorter sequence sorting before any longer sequence it is a
/// prefix of.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BoxEntry {
    components: Vec<(String, u32)>,
}

impl BoxEntry {
    /// Creates an entry from pairs in exactly the given order.
    pub fn new(components: Vec<(String, u32)>) -> Self {
        Self { components }
    }

    /// Creates an entry whose pairs are sorted by `(count, species)` ascending.
    ///
    /// This is the canonical form of a mixed box built from a recipe.
    pub fn canonical(mut components: Vec<(String, u32)>) -> Self {
        components.sort_by(|(sa, na), (sb, nb)| na.cmp(nb).then_with(|| sa.cmp(sb)));
        Self { components }
    }

    /// A box holding `n_molecules` copies of a single species.
    pub fn pure(species: impl Into<String>, n_molecules: u32) -> Self {
        Self {
            components: vec![(species.into(), n_molecules)],
        }
    }

    /// A box holding one solute molecule in `n_molecules - 1` solvent molecules.
    ///
    /// The solute always comes first with a count of one; consumers rely on
    /// that position to recognise the embedded solute.
    pub fn solvated(
        solute: impl Into<String>,
        solvent: impl Into<String>,
        n_molecules: u32,
    ) -> Self {
        Self {
            components: vec![
                (solute.into(), 1),
                (solvent.into(), n_molecules.saturating_sub(1)),
            ],
        }
    }

    pub fn components(&self) -> &[(String, u32)] {
        &self.components
    }

    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|(s, _)| s.as_str())
    }

    pub fn counts(&self) -> impl Iterator<Item = u32> + '_ {
        self.components.iter().map(|(_, n)| *n)
    }

    /// Number of `(species, count)` pairs in the entry.
    pub fn species_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn first_count(&self) -> u32 {
        self.components.first().map_or(0, |(_, n)| *n)
    }

    pub fn total_molecules(&self) -> u64 {
        self.components.iter().map(|(_, n)| u64::from(*n)).sum()
    }

    /// Whether the first element is a single embedded solute molecule.
    pub fn has_embedded_solute(&self) -> bool {
        self.components.first().is_some_and(|(_, n)| *n == 1)
    }

    /// Key used for the deterministic output order of a box-spec list.
    pub fn sort_key(&self) -> (usize, u32, &Self) {
        (self.species_count(), self.first_count(), self)
    }

    pub fn to_record(&self) -> BoxSpecRecord {
        BoxSpecRecord {
            smiles: self.species().map(str::to_string).collect(),
            n_molecules: self.counts().collect(),
        }
    }
}

impl fmt::Display for BoxEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (species, count)) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "({}, {})", species, count)?;
        }
        write!(f, "]")
    }
}

/// The persisted form of a [`BoxEntry`]: two index-aligned arrays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSpecRecord {
    pub smiles: Vec<String>,
    pub n_molecules: Vec<u32>,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Box-spec record has {species} species but {counts} molecule counts")]
pub struct MismatchedRecordError {
    pub species: usize,
    pub counts: usize,
}

impl TryFrom<BoxSpecRecord> for BoxEntry {
    type Error = MismatchedRecordError;

    fn try_from(record: BoxSpecRecord) -> Result<Self, Self::Error> {
        if record.smiles.len() != record.n_molecules.len() {
            return Err(MismatchedRecordError {
                species: record.smiles.len(),
                counts: record.n_molecules.len(),
            });
        }
        Ok(Self::new(
            record.smiles.into_iter().zip(record.n_molecules).collect(),
        ))
    }
}

/// A deduplicated collection of box entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxSpecSet {
    entries: BTreeSet<BoxEntry>,
}

impl BoxSpecSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry, returning `false` if a structurally equal one was present.
    pub fn insert(&mut self, entry: BoxEntry) -> bool {
        self.entries.insert(entry)
    }

    pub fn contains(&self, entry: &BoxEntry) -> bool {
        self.entries.contains(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoxEntry> {
        self.entries.iter()
    }

    /// Consumes the set and returns its entries in deterministic output order.
    pub fn into_sorted(self) -> Vec<BoxEntry> {
        let mut entries: Vec<BoxEntry> = self.entries.into_iter().collect();
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        entries
    }
}

impl Extend<BoxEntry> for BoxSpecSet {
    fn extend<T: IntoIterator<Item = BoxEntry>>(&mut self, iter: T) {
        self.entries.extend(iter);
    }
}
