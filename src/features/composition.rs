//! Residue composition over the full sequence and its terminal windows.

use crate::bio::alphabet::{classify, ResidueClass, N_AMINO_ACIDS};
use crate::bio::sequence::{window_first, window_last, Dataset};
use crate::error::{ProtlocError, ProtlocResult};
use crate::features::descriptors::{AMINO_ACID_WEIGHTS, WATER_WEIGHT};
use crate::features::{FeatureId, Scope};
use rayon::prelude::*;
use tracing::debug;

pub const DEFAULT_WINDOW: usize = 20;
pub const FREQUENCY_TOLERANCE: f64 = 1e-7;

/// In-chain mass of each canonical residue (free amino acid minus water)
fn residue_masses() -> [f64; N_AMINO_ACIDS] {
    AMINO_ACID_WEIGHTS.map(|w| w - WATER_WEIGHT)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// Occurrences of each canonical residue, alphabet order
    pub counts: [usize; N_AMINO_ACIDS],
    /// `X` and ambiguous codes
    pub unknown: usize,
    pub length: usize,
    pub residue_mass: f64,
}

impl Composition {
    /// Counts divided by the window length; all zero for an empty window
    pub fn frequencies(&self) -> [f64; N_AMINO_ACIDS] {
        if self.length == 0 {
            return [0.0; N_AMINO_ACIDS];
        }
        let len = self.length as f64;
        self.counts.map(|c| c as f64 / len)
    }

    pub fn unknown_fraction(&self) -> f64 {
        if self.length == 0 {
            0.0
        } else {
            self.unknown as f64 / self.length as f64
        }
    }

    /// Relative frequencies plus the unknown fraction of a non-empty window must
    /// add up to one
    pub fn check_frequencies(&self, eps: f64) -> ProtlocResult<()> {
        if self.length == 0 {
            return Ok(());
        }
        let total: f64 = self.frequencies().iter().sum::<f64>() + self.unknown_fraction();
        if (1.0 - total).abs() >= eps {
            return Err(ProtlocError::InvariantViolation(format!(
                "relative frequencies sum to {} over a window of {} residues",
                total, self.length
            )));
        }
        Ok(())
    }
}

/// Count residues in `window`.
///
/// Stop and gap symbols, and bytes that are not residue codes, are rejected.
pub fn composition(window: &[u8]) -> ProtlocResult<Composition> {
    let masses = residue_masses();
    let mean_mass = masses.iter().sum::<f64>() / N_AMINO_ACIDS as f64;

    let mut counts = [0usize; N_AMINO_ACIDS];
    let mut unknown = 0;
    let mut residue_mass = 0.0;
    for (position, &b) in window.iter().enumerate() {
        match classify(b) {
            ResidueClass::Canonical(aa) => {
                counts[aa.index()] += 1;
                residue_mass += masses[aa.index()];
            }
            ResidueClass::Unknown | ResidueClass::Ambiguous => {
                unknown += 1;
                residue_mass += mean_mass;
            }
            ResidueClass::Forbidden | ResidueClass::Invalid => {
                return Err(ProtlocError::alphabet(b, position, "composition"));
            }
        }
    }

    Ok(Composition {
        counts,
        unknown,
        length: window.len(),
        residue_mass,
    })
}

/// Compositions of one record: whole sequence, first and last window
#[derive(Debug, Clone)]
pub struct CompositionRow {
    pub global: Composition,
    pub first: Composition,
    pub last: Composition,
}

impl CompositionRow {
    pub fn get(&self, scope: Scope) -> &Composition {
        match scope {
            Scope::Global => &self.global,
            Scope::LocalFirst => &self.first,
            Scope::LocalLast => &self.last,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompositionExtractor {
    pub window: usize,
    pub check_invariants: bool,
    pub tolerance: f64,
}

impl Default for CompositionExtractor {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            check_invariants: true,
            tolerance: FREQUENCY_TOLERANCE,
        }
    }
}

impl CompositionExtractor {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            ..Self::default()
        }
    }

    pub fn extract_record(&self, seq: &[u8]) -> ProtlocResult<CompositionRow> {
        let row = CompositionRow {
            global: composition(seq)?,
            first: composition(window_first(seq, self.window))?,
            last: composition(window_last(seq, self.window))?,
        };
        if self.check_invariants {
            for scope in Scope::ALL {
                row.get(scope).check_frequencies(self.tolerance)?;
            }
        }
        Ok(row)
    }

    /// Write `seq_len`, `residue_mass` and the three `counts_*` columns
    pub fn extract(&self, dataset: &mut Dataset) -> ProtlocResult<()> {
        let rows = dataset
            .records
            .par_iter()
            .map(|r| {
                self.extract_record(r.residues())
                    .map_err(|e| e.in_record(&r.id))
            })
            .collect::<ProtlocResult<Vec<_>>>()?;

        let table = &mut dataset.features;
        table.insert_scalars(
            FeatureId::SequenceLength,
            rows.iter().map(|r| r.global.length as f64).collect(),
        )?;
        table.insert_scalars(
            FeatureId::ResidueMass,
            rows.iter().map(|r| r.global.residue_mass).collect(),
        )?;
        for scope in Scope::ALL {
            let freqs: Vec<_> = rows.iter().map(|r| r.get(scope).frequencies()).collect();
            table.insert_vectors(FeatureId::Composition(scope), &freqs)?;
        }

        debug!(
            "Composition features for {} records (window {})",
            rows.len(),
            self.window
        );
        Ok(())
    }
}
