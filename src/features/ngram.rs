//! Dipeptide (2-gram) counts.

use crate::bio::alphabet::{AminoAcid, N_AMINO_ACIDS};
use crate::bio::sequence::{window_first, window_last, Dataset};
use crate::error::ProtlocResult;
use crate::features::{FeatureId, Scope};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_WINDOW: usize = 70;

/// Pairs known to carry localization signal
pub const CURATED_PAIRS: [(AminoAcid, AminoAcid); 7] = [
    (AminoAcid::Lys, AminoAcid::Arg),
    (AminoAcid::Lys, AminoAcid::Lys),
    (AminoAcid::Arg, AminoAcid::Arg),
    (AminoAcid::Ser, AminoAcid::Ser),
    (AminoAcid::Glu, AminoAcid::Glu),
    (AminoAcid::Leu, AminoAcid::Leu),
    (AminoAcid::Leu, AminoAcid::Arg),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `ab` and `ba` share one count
    Symmetric,
    /// `m[a][b]` counts `a` followed by `b`
    Directional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DipeptideSelection {
    #[default]
    Curated,
    All,
}

impl DipeptideSelection {
    pub fn pairs(self) -> Vec<(AminoAcid, AminoAcid)> {
        match self {
            DipeptideSelection::Curated => CURATED_PAIRS.to_vec(),
            DipeptideSelection::All => AminoAcid::ALL
                .iter()
                .flat_map(|&a| AminoAcid::ALL.iter().map(move |&b| (a, b)))
                .collect(),
        }
    }
}

/// 20x20 count matrix in alphabet order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DipeptideMatrix {
    counts: [[u32; N_AMINO_ACIDS]; N_AMINO_ACIDS],
}

impl Default for DipeptideMatrix {
    fn default() -> Self {
        Self {
            counts: [[0; N_AMINO_ACIDS]; N_AMINO_ACIDS],
        }
    }
}

impl DipeptideMatrix {
    pub fn get(&self, a: AminoAcid, b: AminoAcid) -> u32 {
        self.counts[a.index()][b.index()]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().map(|&c| c as u64).sum()
    }
}

/// Count adjacent residue pairs in `window`.
///
/// Pairs touching a residue outside the canonical alphabet are skipped.
pub fn count_dipeptides(window: &[u8], direction: Direction) -> DipeptideMatrix {
    let mut matrix = DipeptideMatrix::default();
    for pair in window.windows(2) {
        let (Some(a), Some(b)) = (AminoAcid::from_byte(pair[0]), AminoAcid::from_byte(pair[1]))
        else {
            continue;
        };
        let (i, j) = match direction {
            Direction::Directional => (a.index(), b.index()),
            Direction::Symmetric => (a.index().min(b.index()), a.index().max(b.index())),
        };
        matrix.counts[i][j] += 1;
    }

    if direction == Direction::Symmetric {
        for i in 0..N_AMINO_ACIDS {
            for j in (i + 1)..N_AMINO_ACIDS {
                matrix.counts[j][i] = matrix.counts[i][j];
            }
        }
    }
    matrix
}

#[derive(Debug, Clone)]
pub struct DipeptideExtractor {
    /// `None` disables the windowed counts
    pub window: Option<usize>,
    pub selection: DipeptideSelection,
}

impl Default for DipeptideExtractor {
    fn default() -> Self {
        Self {
            window: Some(DEFAULT_WINDOW),
            selection: DipeptideSelection::Curated,
        }
    }
}

impl DipeptideExtractor {
    pub fn new(window: Option<usize>, selection: DipeptideSelection) -> Self {
        Self { window, selection }
    }

    /// Scopes this extractor produces
    pub fn scopes(&self) -> Vec<Scope> {
        if self.window.is_some() {
            Scope::ALL.to_vec()
        } else {
            vec![Scope::Global]
        }
    }

    /// Identifiers written by [`extract`](Self::extract), pair-major
    pub fn feature_ids(&self) -> Vec<FeatureId> {
        FeatureId::pairs(&self.selection.pairs(), &self.scopes())
    }

    pub fn extract_record(&self, seq: &[u8]) -> Vec<(Scope, DipeptideMatrix)> {
        let mut matrices = vec![(Scope::Global, count_dipeptides(seq, Direction::Symmetric))];
        if let Some(window) = self.window {
            matrices.push((
                Scope::LocalFirst,
                count_dipeptides(window_first(seq, window), Direction::Directional),
            ));
            matrices.push((
                Scope::LocalLast,
                count_dipeptides(window_last(seq, window), Direction::Directional),
            ));
        }
        matrices
    }

    pub fn extract(&self, dataset: &mut Dataset) -> ProtlocResult<()> {
        let rows: Vec<_> = dataset
            .records
            .par_iter()
            .map(|r| self.extract_record(r.residues()))
            .collect();

        let ids = self.feature_ids();
        for &id in &ids {
            if let FeatureId::Pair(scope, a, b) = id {
                let values = rows
                    .iter()
                    .map(|matrices| {
                        matrices
                            .iter()
                            .find(|(s, _)| *s == scope)
                            .map_or(0.0, |(_, m)| m.get(a, b) as f64)
                    })
                    .collect();
                dataset.features.insert_scalars(id, values)?;
            }
        }

        debug!(
            "Dipeptide features for {} records ({} columns, window {:?})",
            rows.len(),
            ids.len(),
            self.window
        );
        Ok(())
    }
}
