//! Per-sequence feature extraction and the typed feature table.
//!
//! Every feature column is keyed by a [`FeatureId`]. Identifiers form a closed
//! set derived from the canonical alphabet; their textual names are only used at
//! the configuration boundary.

pub mod assemble;
pub mod composition;
pub mod descriptors;
pub mod ngram;
pub mod normalize;
pub mod physicochemical;

use crate::bio::alphabet::{AminoAcid, N_AMINO_ACIDS};
use crate::error::{ProtlocError, ProtlocResult};
use indexmap::IndexMap;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

pub use assemble::{assemble, column_names};
pub use normalize::{normalize, normalize_features, normalize_pooled, NormalizationMode};

/// Which part of a sequence a feature was computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Scope {
    Global,
    LocalFirst,
    LocalLast,
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Global, Scope::LocalFirst, Scope::LocalLast];
    pub const LOCAL: [Scope; 2] = [Scope::LocalFirst, Scope::LocalLast];

    /// Name suffix used by most features
    pub fn suffix(self) -> &'static str {
        match self {
            Scope::Global => "",
            Scope::LocalFirst => "_localfirst",
            Scope::LocalLast => "_locallast",
        }
    }

    /// Window tag used by the composition vectors
    pub fn tag(self) -> &'static str {
        match self {
            Scope::Global => "global",
            Scope::LocalFirst => "localfirst",
            Scope::LocalLast => "locallast",
        }
    }
}

/// Number of secondary structure fractions (helix, turn, sheet)
pub const SECONDARY_STRUCTURE_WIDTH: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureId {
    SequenceLength,
    /// Sum of in-chain residue masses
    ResidueMass,
    /// Relative residue frequencies, one column per canonical residue
    Composition(Scope),
    Hydrophobicity(Scope),
    Hydrophilicity(Scope),
    MolecularWeight(Scope),
    IsoelectricPoint(Scope),
    Aromaticity(Scope),
    InstabilityIndex(Scope),
    Flexibility(Scope),
    SecondaryStructure(Scope),
    /// One component of the secondary structure fraction
    SecondaryStructureComponent(Scope, usize),
    /// Dipeptide count for an ordered residue pair
    Pair(Scope, AminoAcid, AminoAcid),
}

impl FeatureId {
    /// Number of matrix columns the feature occupies
    pub fn width(self) -> usize {
        match self {
            FeatureId::Composition(_) => N_AMINO_ACIDS,
            FeatureId::SecondaryStructure(_) => SECONDARY_STRUCTURE_WIDTH,
            _ => 1,
        }
    }

    /// Every identifier the crate can produce
    pub fn universe() -> &'static [FeatureId] {
        static UNIVERSE: OnceLock<Vec<FeatureId>> = OnceLock::new();
        UNIVERSE.get_or_init(|| {
            let mut ids = vec![FeatureId::SequenceLength, FeatureId::ResidueMass];
            for scope in Scope::ALL {
                ids.extend([
                    FeatureId::Composition(scope),
                    FeatureId::Hydrophobicity(scope),
                    FeatureId::Hydrophilicity(scope),
                    FeatureId::MolecularWeight(scope),
                    FeatureId::IsoelectricPoint(scope),
                    FeatureId::Aromaticity(scope),
                    FeatureId::InstabilityIndex(scope),
                    FeatureId::Flexibility(scope),
                    FeatureId::SecondaryStructure(scope),
                ]);
                ids.extend(
                    (0..SECONDARY_STRUCTURE_WIDTH)
                        .map(|i| FeatureId::SecondaryStructureComponent(scope, i)),
                );
                for a in AminoAcid::ALL {
                    ids.extend(AminoAcid::ALL.iter().map(|&b| FeatureId::Pair(scope, a, b)));
                }
            }
            ids
        })
    }

    /// Dipeptide identifiers for `pairs` over `scopes`, pair-major
    pub fn pairs(pairs: &[(AminoAcid, AminoAcid)], scopes: &[Scope]) -> Vec<FeatureId> {
        pairs
            .iter()
            .flat_map(|&(a, b)| scopes.iter().map(move |&s| FeatureId::Pair(s, a, b)))
            .collect()
    }

    fn by_name() -> &'static HashMap<String, FeatureId> {
        static BY_NAME: OnceLock<HashMap<String, FeatureId>> = OnceLock::new();
        BY_NAME.get_or_init(|| {
            FeatureId::universe()
                .iter()
                .map(|&id| (id.to_string(), id))
                .collect()
        })
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FeatureId::SequenceLength => write!(f, "seq_len"),
            FeatureId::ResidueMass => write!(f, "residue_mass"),
            FeatureId::Composition(s) => write!(f, "counts_{}", s.tag()),
            FeatureId::Hydrophobicity(s) => write!(f, "hydrophobicity{}", s.suffix()),
            FeatureId::Hydrophilicity(s) => write!(f, "hydrophilicity{}", s.suffix()),
            FeatureId::MolecularWeight(s) => write!(f, "molecular_weight{}", s.suffix()),
            FeatureId::IsoelectricPoint(s) => write!(f, "iso_point{}", s.suffix()),
            FeatureId::Aromaticity(s) => write!(f, "aromaticity{}", s.suffix()),
            FeatureId::InstabilityIndex(s) => write!(f, "instability_index{}", s.suffix()),
            FeatureId::Flexibility(s) => write!(f, "flexibility{}", s.suffix()),
            FeatureId::SecondaryStructure(s) => {
                write!(f, "secondary_structure_fraction{}", s.suffix())
            }
            FeatureId::SecondaryStructureComponent(s, i) => {
                write!(f, "secondary_structure_fraction{}_{}", s.suffix(), i)
            }
            FeatureId::Pair(s, a, b) => write!(f, "pair_{}_{}{}", a, b, s.suffix()),
        }
    }
}

impl FromStr for FeatureId {
    type Err = ProtlocError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeatureId::by_name()
            .get(s.trim())
            .copied()
            .ok_or_else(|| ProtlocError::Configuration(format!("Unknown feature name: {}", s)))
    }
}

/// Feature columns of one population, each `rows x width`
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    rows: usize,
    columns: IndexMap<FeatureId, Array2<f64>>,
}

impl FeatureTable {
    pub fn new(rows: usize) -> Self {
        Self {
            rows,
            columns: IndexMap::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, id: FeatureId) -> bool {
        self.columns.contains_key(&id)
    }

    pub fn get(&self, id: FeatureId) -> Option<&Array2<f64>> {
        self.columns.get(&id)
    }

    pub fn get_mut(&mut self, id: FeatureId) -> Option<&mut Array2<f64>> {
        self.columns.get_mut(&id)
    }

    /// Scalar column as a 1-d view
    pub fn scalars(&self, id: FeatureId) -> Option<ArrayView1<'_, f64>> {
        self.columns
            .get(&id)
            .filter(|c| c.ncols() == 1)
            .map(|c| c.column(0))
    }

    pub fn ids(&self) -> impl Iterator<Item = FeatureId> + '_ {
        self.columns.keys().copied()
    }

    /// Insert or replace a column. Row count and width must match.
    pub fn insert(&mut self, id: FeatureId, values: Array2<f64>) -> ProtlocResult<()> {
        if values.nrows() != self.rows {
            return Err(ProtlocError::InvariantViolation(format!(
                "feature {} has {} rows, dataset has {}",
                id,
                values.nrows(),
                self.rows
            )));
        }
        if values.ncols() != id.width() {
            return Err(ProtlocError::InvariantViolation(format!(
                "feature {} has width {}, expected {}",
                id,
                values.ncols(),
                id.width()
            )));
        }
        self.columns.insert(id, values);
        Ok(())
    }

    pub fn insert_scalars(&mut self, id: FeatureId, values: Vec<f64>) -> ProtlocResult<()> {
        let n = values.len();
        let column = Array2::from_shape_vec((n, 1), values)
            .map_err(|e| ProtlocError::InvariantViolation(e.to_string()))?;
        self.insert(id, column)
    }

    pub fn insert_vectors<const N: usize>(
        &mut self,
        id: FeatureId,
        values: &[[f64; N]],
    ) -> ProtlocResult<()> {
        let flat: Vec<f64> = values.iter().flat_map(|v| v.iter().copied()).collect();
        let column = Array2::from_shape_vec((values.len(), N), flat)
            .map_err(|e| ProtlocError::InvariantViolation(e.to_string()))?;
        self.insert(id, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_names_round_trip() {
        for &id in FeatureId::universe() {
            let name = id.to_string();
            assert_eq!(name.parse::<FeatureId>().unwrap(), id, "{}", name);
        }
    }

    #[test]
    fn test_known_names() {
        assert_eq!(FeatureId::SequenceLength.to_string(), "seq_len");
        assert_eq!(
            FeatureId::Composition(Scope::LocalFirst).to_string(),
            "counts_localfirst"
        );
        assert_eq!(
            FeatureId::Hydrophobicity(Scope::LocalLast).to_string(),
            "hydrophobicity_locallast"
        );
        assert_eq!(
            FeatureId::Pair(Scope::LocalFirst, AminoAcid::Lys, AminoAcid::Arg).to_string(),
            "pair_K_R_localfirst"
        );
        assert_eq!(
            FeatureId::SecondaryStructureComponent(Scope::Global, 2).to_string(),
            "secondary_structure_fraction_2"
        );
        assert!("pair_K_X".parse::<FeatureId>().is_err());
    }

    #[test]
    fn test_universe_has_no_duplicate_names() {
        let universe = FeatureId::universe();
        assert_eq!(FeatureId::by_name().len(), universe.len());
        // 2 globals + 3 scopes * (9 descriptors + 3 components + 400 pairs)
        assert_eq!(universe.len(), 2 + 3 * (9 + 3 + 400));
    }

    #[test]
    fn test_insert_checks_rows_and_width() {
        let mut table = FeatureTable::new(2);
        table
            .insert_scalars(FeatureId::SequenceLength, vec![3.0, 4.0])
            .unwrap();
        assert_eq!(
            table.scalars(FeatureId::SequenceLength).unwrap().to_vec(),
            vec![3.0, 4.0]
        );

        let err = table.insert_scalars(FeatureId::ResidueMass, vec![1.0]);
        assert!(matches!(err, Err(ProtlocError::InvariantViolation(_))));

        let err = table.insert(FeatureId::SecondaryStructure(Scope::Global), array![[1.0], [2.0]]);
        assert!(matches!(err, Err(ProtlocError::InvariantViolation(_))));

        table
            .insert_vectors(
                FeatureId::SecondaryStructure(Scope::Global),
                &[[0.1, 0.2, 0.3], [0.3, 0.2, 0.1]],
            )
            .unwrap();
        assert_eq!(table.len(), 2);
    }
}
