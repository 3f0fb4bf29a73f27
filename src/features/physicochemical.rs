//! Hydropathy scales and descriptor-provider features, global and windowed.

use crate::bio::alphabet::{AminoAcid, N_AMINO_ACIDS, UNKNOWN};
use crate::bio::sequence::{window_first, window_last, Dataset};
use crate::error::{ProtlocError, ProtlocResult};
use crate::features::composition::DEFAULT_WINDOW;
use crate::features::descriptors::{DescriptorProvider, Descriptors, ProtParam};
use crate::features::{FeatureId, Scope, SECONDARY_STRUCTURE_WIDTH};
use rayon::prelude::*;
use tracing::debug;

/// Kyte & Doolittle (1982) hydropathy, alphabet order
#[rustfmt::skip]
const KYTE_DOOLITTLE: [f64; N_AMINO_ACIDS] = [
     1.8,  2.5, -3.5, -3.5,  2.8, // A C D E F
    -0.4, -3.2,  4.5, -3.9,  3.8, // G H I K L
     1.9, -3.5, -1.6, -3.5, -4.5, // M N P Q R
    -0.8, -0.7,  4.2, -0.9, -1.3, // S T V W Y
];

/// Hopp & Woods (1981) hydrophilicity, alphabet order
#[rustfmt::skip]
const HOPP_WOODS: [f64; N_AMINO_ACIDS] = [
    -0.5, -1.0,  3.0,  3.0, -2.5, // A C D E F
     0.0, -0.5, -1.8,  3.0, -1.8, // G H I K L
    -1.3,  0.2,  0.0,  0.2,  3.0, // M N P Q R
     0.3, -0.4, -1.5, -3.4, -2.3, // S T V W Y
];

/// Mean scale value over the canonical residues of `seq`; 0.0 when there are none
fn scale_mean(seq: &[u8], scale: &[f64; N_AMINO_ACIDS]) -> f64 {
    let (sum, n) = seq
        .iter()
        .filter_map(|&b| AminoAcid::from_byte(b))
        .fold((0.0, 0usize), |(sum, n), aa| (sum + scale[aa.index()], n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

pub fn hydrophobicity(seq: &[u8]) -> f64 {
    scale_mean(seq, &KYTE_DOOLITTLE)
}

pub fn hydrophilicity(seq: &[u8]) -> f64 {
    scale_mean(seq, &HOPP_WOODS)
}

/// Prepare a sequence for the descriptor provider.
///
/// A leading `X` is read as the initiator methionine and selenocysteine `U` as
/// cysteine. Any other non-canonical residue is rejected.
pub fn sanitize(seq: &[u8]) -> ProtlocResult<Vec<u8>> {
    let mut out = seq.to_vec();
    if out.first() == Some(&UNKNOWN) {
        out[0] = b'M';
    }
    for b in out.iter_mut().filter(|b| **b == b'U') {
        *b = b'C';
    }
    if let Some(position) = out.iter().position(|&b| AminoAcid::from_byte(b).is_none()) {
        return Err(ProtlocError::alphabet(
            seq[position],
            position,
            "descriptor sanitization",
        ));
    }
    Ok(out)
}

/// Values of one record for one scope
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicochemicalValues {
    pub hydrophobicity: f64,
    pub hydrophilicity: f64,
    pub descriptors: Descriptors,
}

pub struct PhysicochemicalExtractor<P = ProtParam> {
    provider: P,
    pub window: usize,
    /// Also store each secondary structure fraction as its own scalar
    pub expand_vectors: bool,
}

impl Default for PhysicochemicalExtractor<ProtParam> {
    fn default() -> Self {
        Self::new(ProtParam, DEFAULT_WINDOW)
    }
}

impl<P: DescriptorProvider> PhysicochemicalExtractor<P> {
    pub fn new(provider: P, window: usize) -> Self {
        Self {
            provider,
            window,
            expand_vectors: false,
        }
    }

    pub fn with_expanded_vectors(mut self, expand: bool) -> Self {
        self.expand_vectors = expand;
        self
    }

    fn values(&self, raw: &[u8], sanitized: &[u8]) -> ProtlocResult<PhysicochemicalValues> {
        Ok(PhysicochemicalValues {
            hydrophobicity: hydrophobicity(raw),
            hydrophilicity: hydrophilicity(raw),
            descriptors: self.provider.compute(sanitized)?,
        })
    }

    /// Global, first-window and last-window values of one sequence
    pub fn extract_record(&self, seq: &[u8]) -> ProtlocResult<[PhysicochemicalValues; 3]> {
        let clean = sanitize(seq)?;
        Ok([
            self.values(seq, &clean)?,
            self.values(
                window_first(seq, self.window),
                window_first(&clean, self.window),
            )?,
            self.values(
                window_last(seq, self.window),
                window_last(&clean, self.window),
            )?,
        ])
    }

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
        for (i, scope) in Scope::ALL.into_iter().enumerate() {
            let column = |f: fn(&PhysicochemicalValues) -> f64| -> Vec<f64> {
                rows.iter().map(|r| f(&r[i])).collect()
            };
            table.insert_scalars(FeatureId::Hydrophobicity(scope), column(|v| v.hydrophobicity))?;
            table.insert_scalars(FeatureId::Hydrophilicity(scope), column(|v| v.hydrophilicity))?;
            table.insert_scalars(
                FeatureId::MolecularWeight(scope),
                column(|v| v.descriptors.molecular_weight),
            )?;
            table.insert_scalars(
                FeatureId::IsoelectricPoint(scope),
                column(|v| v.descriptors.isoelectric_point),
            )?;
            table.insert_scalars(
                FeatureId::Aromaticity(scope),
                column(|v| v.descriptors.aromaticity),
            )?;
            table.insert_scalars(
                FeatureId::InstabilityIndex(scope),
                column(|v| v.descriptors.instability_index),
            )?;
            table.insert_scalars(
                FeatureId::Flexibility(scope),
                column(|v| v.descriptors.flexibility()),
            )?;

            let fractions: Vec<[f64; SECONDARY_STRUCTURE_WIDTH]> = rows
                .iter()
                .map(|r| r[i].descriptors.secondary_structure_fraction)
                .collect();
            if self.expand_vectors {
                for component in 0..SECONDARY_STRUCTURE_WIDTH {
                    table.insert_scalars(
                        FeatureId::SecondaryStructureComponent(scope, component),
                        fractions.iter().map(|f| f[component]).collect(),
                    )?;
                }
            }
            table.insert_vectors(FeatureId::SecondaryStructure(scope), &fractions)?;
        }

        debug!(
            "Physicochemical features for {} records (window {}, expanded {})",
            rows.len(),
            self.window,
            self.expand_vectors
        );
        Ok(())
    }
}
