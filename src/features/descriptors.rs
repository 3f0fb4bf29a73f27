//! Protein descriptor capability.
//!
//! The pipeline treats descriptor computation as an opaque provider behind
//! [`DescriptorProvider`]. [`ProtParam`] is the built-in implementation. Its
//! constants follow Biopython's `ProteinAnalysis`: average amino-acid weights,
//! Bjellqvist pK values with terminal pK of 7.5 and 3.55 plus residue-specific
//! terminal overrides, Guruprasad dipeptide instability weights, Vihinen
//! flexibility and the helix/turn/sheet residue groups.

use crate::bio::alphabet::{AminoAcid, N_AMINO_ACIDS};
use crate::error::{ProtlocError, ProtlocResult};
use serde::{Deserialize, Serialize};

/// Average mass of water lost per peptide bond
pub const WATER_WEIGHT: f64 = 18.01528;

/// Average free amino-acid weights, alphabet order
#[rustfmt::skip]
pub const AMINO_ACID_WEIGHTS: [f64; N_AMINO_ACIDS] = [
    89.0932,  121.1582, 133.1027, 147.1293, 165.1891, // A C D E F
    75.0666,  155.1546, 131.1729, 146.1876, 131.1729, // G H I K L
    149.2113, 132.1179, 115.1305, 146.1445, 174.201,  // M N P Q R
    105.0926, 119.1192, 117.1463, 204.2252, 181.1885, // S T V W Y
];

/// Vihinen (1994) normalized B-values, alphabet order
#[rustfmt::skip]
const FLEXIBILITY: [f64; N_AMINO_ACIDS] = [
    0.984, 0.906, 1.068, 1.094, 0.915, // A C D E F
    1.031, 0.950, 0.927, 1.102, 0.935, // G H I K L
    0.952, 1.048, 1.049, 1.037, 1.008, // M N P Q R
    1.046, 0.997, 0.931, 0.904, 0.929, // S T V W Y
];

const FLEXIBILITY_WINDOW: usize = 9;
const FLEXIBILITY_WEIGHTS: [f64; 4] = [0.25, 0.4375, 0.625, 0.8125];
// Scored residue sits one past the window centre
const FLEXIBILITY_MIDDLE: usize = FLEXIBILITY_WINDOW / 2 + 1;
const FLEXIBILITY_NORM: f64 = 5.25;

/// Guruprasad (1990) dipeptide instability weight values, `DIWV[first][second]`
#[rustfmt::skip]
const DIWV: [[f64; N_AMINO_ACIDS]; N_AMINO_ACIDS] = [
    [  1.00,  44.94,  -7.49,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,   1.00,   1.00,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00], // A
    [  1.00,   1.00,  20.26,   1.00,   1.00,   1.00,  33.60,   1.00,   1.00,  20.26,  33.60,   1.00,  20.26,  -6.54,   1.00,   1.00,  33.60,  -6.54,  24.68,   1.00], // C
    [  1.00,   1.00,   1.00,   1.00,  -6.54,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,   1.00,   1.00,  -6.54,  20.26, -14.03,   1.00,   1.00,   1.00], // D
    [  1.00,  44.94,  20.26,  33.60,   1.00,   1.00,  -6.54,  20.26,   1.00,   1.00,   1.00,   1.00,  20.26,  20.26,   1.00,  20.26,   1.00,   1.00, -14.03,   1.00], // E
    [  1.00,   1.00,  13.34,   1.00,   1.00,   1.00,   1.00,   1.00, -14.03,   1.00,   1.00,   1.00,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00, 33.601], // F
    [ -7.49,   1.00,   1.00,  -6.54,   1.00,  13.34,   1.00,  -7.49,  -7.49,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,  13.34,  -7.49], // G
    [  1.00,   1.00,   1.00,   1.00,  -9.37,  -9.37,   1.00,  44.94,  24.68,   1.00,   1.00,  24.68,  -1.88,   1.00,   1.00,   1.00,  -6.54,   1.00,  -1.88,  44.94], // H
    [  1.00,   1.00,   1.00,  44.94,   1.00,   1.00,  13.34,   1.00,  -7.49,  20.26,   1.00,   1.00,  -1.88,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00], // I
    [  1.00,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,  -7.49,   1.00,  -7.49,  33.60,   1.00,  -6.54,  24.64,  33.60,   1.00,   1.00,  -7.49,   1.00,   1.00], // K
    [  1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,   1.00,  20.26,  33.60,  20.26,   1.00,   1.00,   1.00,  24.68,   1.00], // L
    [ 13.34,   1.00,   1.00,   1.00,   1.00,   1.00,  58.28,   1.00,   1.00,   1.00,  -1.88,   1.00,  44.94,  -6.54,  -6.54,  44.94,  -1.88,   1.00,   1.00,  24.68], // M
    [  1.00,  -1.88,   1.00,   1.00, -14.03, -14.03,   1.00,  44.94,  24.68,   1.00,   1.00,   1.00,  -1.88,  -6.54,   1.00,   1.00,  -7.49,   1.00,  -9.37,   1.00], // N
    [ 20.26,  -6.54,  -6.54,  18.38,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,  -6.54,   1.00,  20.26,  20.26,  -6.54,  20.26,   1.00,  20.26,  -1.88,   1.00], // P
    [  1.00,  -6.54,  20.26,  20.26,  -6.54,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,  20.26,  20.26,   1.00,  44.94,   1.00,  -6.54,   1.00,  -6.54], // Q
    [  1.00,   1.00,   1.00,   1.00,   1.00,  -7.49,  20.26,   1.00,   1.00,   1.00,   1.00,  13.34,  20.26,  20.26,  58.28,  44.94,   1.00,   1.00,  58.28,  -6.54], // R
    [  1.00,  33.60,   1.00,  20.26,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,   1.00,  44.94,  20.26,  20.26,  20.26,   1.00,   1.00,   1.00,   1.00], // S
    [  1.00,   1.00,   1.00,  20.26,  13.34,  -7.49,   1.00,   1.00,   1.00,   1.00,   1.00, -14.03,   1.00,  -6.54,   1.00,   1.00,   1.00,   1.00, -14.03,   1.00], // T
    [  1.00,   1.00, -14.03,   1.00,   1.00,  -7.49,   1.00,   1.00,  -1.88,   1.00,   1.00,   1.00,  20.26,   1.00,   1.00,   1.00,  -7.49,   1.00,   1.00,  -6.54], // V
    [-14.03,   1.00,   1.00,   1.00,   1.00,  -9.37,  24.68,   1.00,   1.00,  13.34,  24.68,  13.34,   1.00,   1.00,   1.00,   1.00, -14.03,  -7.49,   1.00,   1.00], // W
    [ 24.68,   1.00,  24.68,  -6.54,   1.00,  -7.49,  13.34,   1.00,   1.00,   1.00,  44.94,   1.00,  13.34,   1.00, -15.91,   1.00,  -7.49,   1.00,  -9.37,  13.34], // Y
];

const PK_N_TERM: f64 = 7.5;
const PK_C_TERM: f64 = 3.55;
const PK_POSITIVE: [(AminoAcid, f64); 3] = [
    (AminoAcid::Lys, 10.0),
    (AminoAcid::Arg, 12.0),
    (AminoAcid::His, 5.98),
];
const PK_NEGATIVE: [(AminoAcid, f64); 4] = [
    (AminoAcid::Asp, 4.05),
    (AminoAcid::Glu, 4.45),
    (AminoAcid::Cys, 9.0),
    (AminoAcid::Tyr, 10.0),
];
const PI_TOLERANCE: f64 = 1e-4;

fn n_terminal_pk(aa: AminoAcid) -> f64 {
    match aa {
        AminoAcid::Ala => 7.59,
        AminoAcid::Met => 7.0,
        AminoAcid::Ser => 6.93,
        AminoAcid::Pro => 8.36,
        AminoAcid::Thr => 6.82,
        AminoAcid::Val => 7.44,
        AminoAcid::Glu => 7.7,
        _ => PK_N_TERM,
    }
}

fn c_terminal_pk(aa: AminoAcid) -> f64 {
    match aa {
        AminoAcid::Asp => 4.55,
        AminoAcid::Glu => 4.75,
        _ => PK_C_TERM,
    }
}

const HELIX: &[AminoAcid] = &[
    AminoAcid::Val,
    AminoAcid::Ile,
    AminoAcid::Tyr,
    AminoAcid::Phe,
    AminoAcid::Trp,
    AminoAcid::Leu,
];
const TURN: &[AminoAcid] = &[AminoAcid::Asn, AminoAcid::Pro, AminoAcid::Gly, AminoAcid::Ser];
const SHEET: &[AminoAcid] = &[AminoAcid::Glu, AminoAcid::Met, AminoAcid::Ala, AminoAcid::Leu];

/// Named descriptor values for one sequence
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Descriptors {
    pub molecular_weight: f64,
    pub isoelectric_point: f64,
    pub aromaticity: f64,
    pub instability_index: f64,
    pub flexibility_profile: Vec<f64>,
    /// Helix, turn and sheet fractions
    pub secondary_structure_fraction: [f64; 3],
}

impl Descriptors {
    /// Mean of the flexibility profile, 0.0 when the profile is empty
    pub fn flexibility(&self) -> f64 {
        if self.flexibility_profile.is_empty() {
            0.0
        } else {
            self.flexibility_profile.iter().sum::<f64>() / self.flexibility_profile.len() as f64
        }
    }
}

/// Source of physicochemical descriptors for a sanitized sequence
pub trait DescriptorProvider: Send + Sync {
    fn compute(&self, sequence: &[u8]) -> ProtlocResult<Descriptors>;
}

impl<P: DescriptorProvider + ?Sized> DescriptorProvider for &P {
    fn compute(&self, sequence: &[u8]) -> ProtlocResult<Descriptors> {
        (**self).compute(sequence)
    }
}

/// Built-in descriptor provider
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtParam;

impl ProtParam {
    fn residues(sequence: &[u8]) -> ProtlocResult<Vec<AminoAcid>> {
        sequence
            .iter()
            .enumerate()
            .map(|(i, &b)| {
                AminoAcid::from_byte(b)
                    .ok_or_else(|| ProtlocError::alphabet(b, i, "descriptor computation"))
            })
            .collect()
    }

    fn counts(residues: &[AminoAcid]) -> [usize; N_AMINO_ACIDS] {
        let mut counts = [0usize; N_AMINO_ACIDS];
        for aa in residues {
            counts[aa.index()] += 1;
        }
        counts
    }

    pub fn molecular_weight(residues: &[AminoAcid]) -> f64 {
        if residues.is_empty() {
            return 0.0;
        }
        let total: f64 = residues.iter().map(|aa| AMINO_ACID_WEIGHTS[aa.index()]).sum();
        total - (residues.len() - 1) as f64 * WATER_WEIGHT
    }

    pub fn aromaticity(residues: &[AminoAcid]) -> f64 {
        if residues.is_empty() {
            return 0.0;
        }
        let aromatic = residues
            .iter()
            .filter(|aa| matches!(aa, AminoAcid::Phe | AminoAcid::Trp | AminoAcid::Tyr))
            .count();
        aromatic as f64 / residues.len() as f64
    }

    pub fn instability_index(residues: &[AminoAcid]) -> f64 {
        if residues.is_empty() {
            return 0.0;
        }
        let score: f64 = residues
            .windows(2)
            .map(|pair| DIWV[pair[0].index()][pair[1].index()])
            .sum();
        10.0 / residues.len() as f64 * score
    }

    /// One score per window start in `0..len - 9`, so sequences of nine
    /// residues or fewer have an empty profile
    pub fn flexibility_profile(residues: &[AminoAcid]) -> Vec<f64> {
        let starts = residues.len().saturating_sub(FLEXIBILITY_WINDOW);
        residues
            .windows(FLEXIBILITY_WINDOW)
            .take(starts)
            .map(|w| {
                let flanks: f64 = FLEXIBILITY_WEIGHTS
                    .iter()
                    .enumerate()
                    .map(|(j, weight)| {
                        let front = FLEXIBILITY[w[j].index()];
                        let back = FLEXIBILITY[w[FLEXIBILITY_WINDOW - 1 - j].index()];
                        (front + back) * weight
                    })
                    .sum();
                let middle = FLEXIBILITY[w[FLEXIBILITY_MIDDLE].index()];
                (flanks + middle) / FLEXIBILITY_NORM
            })
            .collect()
    }

    pub fn secondary_structure_fraction(residues: &[AminoAcid]) -> [f64; 3] {
        if residues.is_empty() {
            return [0.0; 3];
        }
        let len = residues.len() as f64;
        let fraction = |group: &[AminoAcid]| {
            residues.iter().filter(|aa| group.contains(aa)).count() as f64 / len
        };
        [fraction(HELIX), fraction(TURN), fraction(SHEET)]
    }

    fn charge_at(counts: &[usize; N_AMINO_ACIDS], n_term_pk: f64, c_term_pk: f64, ph: f64) -> f64 {
        let positive = |pk: f64| 1.0 / (10f64.powf(ph - pk) + 1.0);
        let negative = |pk: f64| 1.0 / (10f64.powf(pk - ph) + 1.0);

        let mut charge = positive(n_term_pk) - negative(c_term_pk);
        for (aa, pk) in PK_POSITIVE {
            charge += counts[aa.index()] as f64 * positive(pk);
        }
        for (aa, pk) in PK_NEGATIVE {
            charge -= counts[aa.index()] as f64 * negative(pk);
        }
        charge
    }

    /// pH of zero net charge, by bisection over [0, 14]
    pub fn isoelectric_point(residues: &[AminoAcid]) -> f64 {
        let (Some(&first), Some(&last)) = (residues.first(), residues.last()) else {
            return 0.0;
        };
        let counts = Self::counts(residues);
        let n_term = n_terminal_pk(first);
        let c_term = c_terminal_pk(last);

        let (mut low, mut high) = (0.0f64, 14.0f64);
        let mut ph = (low + high) / 2.0;
        while high - low > PI_TOLERANCE {
            ph = (low + high) / 2.0;
            if Self::charge_at(&counts, n_term, c_term, ph) > 0.0 {
                low = ph;
            } else {
                high = ph;
            }
        }
        ph
    }
}

impl DescriptorProvider for ProtParam {
    fn compute(&self, sequence: &[u8]) -> ProtlocResult<Descriptors> {
        let residues = Self::residues(sequence)?;
        if residues.is_empty() {
            return Ok(Descriptors::default());
        }
        Ok(Descriptors {
            molecular_weight: Self::molecular_weight(&residues),
            isoelectric_point: Self::isoelectric_point(&residues),
            aromaticity: Self::aromaticity(&residues),
            instability_index: Self::instability_index(&residues),
            flexibility_profile: Self::flexibility_profile(&residues),
            secondary_structure_fraction: Self::secondary_structure_fraction(&residues),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_molecular_weight() {
        let d = ProtParam.compute(b"G").unwrap();
        assert!(approx(d.molecular_weight, 75.0666));

        let d = ProtParam.compute(b"GG").unwrap();
        assert!(approx(d.molecular_weight, 2.0 * 75.0666 - WATER_WEIGHT));
    }

    #[test]
    fn test_aromaticity_and_secondary_structure() {
        let d = ProtParam.compute(b"FWY").unwrap();
        assert!(approx(d.aromaticity, 1.0));

        let d = ProtParam.compute(b"VNE").unwrap();
        let [helix, turn, sheet] = d.secondary_structure_fraction;
        assert!(approx(helix, 1.0 / 3.0));
        assert!(approx(turn, 1.0 / 3.0));
        assert!(approx(sheet, 1.0 / 3.0));

        // Leucine counts towards both helix and sheet
        let d = ProtParam.compute(b"LL").unwrap();
        assert_eq!(d.secondary_structure_fraction, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_isoelectric_point() {
        let basic = ProtParam.compute(b"KKKKKKKK").unwrap();
        assert!(basic.isoelectric_point > 7.0 && basic.isoelectric_point < 14.0);

        let acidic = ProtParam.compute(b"DDDDEEEE").unwrap();
        assert!(acidic.isoelectric_point < 7.0 && acidic.isoelectric_point > 0.0);
    }

    #[test]
    fn test_isoelectric_point_reference_values() {
        // Zero charge halfway between the N-terminal pK (7.5) and lysine (10.0)
        let gk = ProtParam.compute(b"GK").unwrap();
        assert!((gk.isoelectric_point - 8.75).abs() < 1e-3, "{}", gk.isoelectric_point);

        // Terminal overrides: alanine N-terminus 7.59, aspartate C-terminus 4.55
        let ad = ProtParam.compute(b"AD").unwrap();
        assert!((ad.isoelectric_point - 4.2995).abs() < 1e-3, "{}", ad.isoelectric_point);
    }

    #[test]
    fn test_instability_index() {
        // A followed by C has weight 44.94
        let d = ProtParam.compute(b"AC").unwrap();
        assert!(approx(d.instability_index, 10.0 / 2.0 * 44.94));

        let d = ProtParam.compute(b"A").unwrap();
        assert!(approx(d.instability_index, 0.0));
    }

    #[test]
    fn test_flexibility_profile() {
        assert!(ProtParam.compute(b"AAAAAAAA").unwrap().flexibility_profile.is_empty());
        assert!(ProtParam.compute(b"AAAAAAAAA").unwrap().flexibility_profile.is_empty());

        let d = ProtParam.compute(b"AAAAAAAAAAAA").unwrap();
        assert_eq!(d.flexibility_profile.len(), 3);
        // Uniform sequence: (2 * sum(weights) + 1) * f / 5.25 == f
        assert!(approx(d.flexibility(), 0.984));
    }

    #[test]
    fn test_flexibility_scores_residue_after_centre() {
        // Glycine at index 5 is both the inner back flank and the middle
        let d = ProtParam.compute(b"AAAAAGAAAA").unwrap();
        assert_eq!(d.flexibility_profile.len(), 1);
        let flanks = 2.0 * 2.125 * 0.984 + 0.8125 * (1.031 - 0.984);
        let expected = (flanks + 1.031) / 5.25;
        assert!(approx(d.flexibility_profile[0], expected));

        // The centre index itself is never scored
        let d = ProtParam.compute(b"AAAAGAAAAA").unwrap();
        assert!(approx(d.flexibility_profile[0], 0.984));
    }

    #[test]
    fn test_empty_and_invalid_input() {
        assert_eq!(ProtParam.compute(b"").unwrap(), Descriptors::default());
        assert!(matches!(
            ProtParam.compute(b"MXK"),
            Err(ProtlocError::AlphabetViolation { symbol: 'X', position: 1, .. })
        ));
    }
}
