//! Amino-acid alphabet shared by the extractors and the encoder.
//!
//! The canonical order is alphabetical by one-letter code and is the row/column
//! order of every composition vector and dipeptide matrix in the crate.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString};

/// Symbol for an unresolved residue
pub const UNKNOWN: u8 = b'X';
/// Translation stop
pub const STOP: u8 = b'*';
/// Gap of indeterminate length
pub const GAP: u8 = b'-';

#[rustfmt::skip]
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
    Serialize, Deserialize, Display, EnumString, EnumIter, EnumCount,
)]
#[repr(u8)]
pub enum AminoAcid {
    #[strum(serialize = "A")] Ala,
    #[strum(serialize = "C")] Cys,
    #[strum(serialize = "D")] Asp,
    #[strum(serialize = "E")] Glu,
    #[strum(serialize = "F")] Phe,
    #[strum(serialize = "G")] Gly,
    #[strum(serialize = "H")] His,
    #[strum(serialize = "I")] Ile,
    #[strum(serialize = "K")] Lys,
    #[strum(serialize = "L")] Leu,
    #[strum(serialize = "M")] Met,
    #[strum(serialize = "N")] Asn,
    #[strum(serialize = "P")] Pro,
    #[strum(serialize = "Q")] Gln,
    #[strum(serialize = "R")] Arg,
    #[strum(serialize = "S")] Ser,
    #[strum(serialize = "T")] Thr,
    #[strum(serialize = "V")] Val,
    #[strum(serialize = "W")] Trp,
    #[strum(serialize = "Y")] Tyr,
}

/// Number of canonical residues
pub const N_AMINO_ACIDS: usize = AminoAcid::COUNT;

impl AminoAcid {
    #[rustfmt::skip]
    pub const ALL: [AminoAcid; N_AMINO_ACIDS] = [
        AminoAcid::Ala, AminoAcid::Cys, AminoAcid::Asp, AminoAcid::Glu,
        AminoAcid::Phe, AminoAcid::Gly, AminoAcid::His, AminoAcid::Ile,
        AminoAcid::Lys, AminoAcid::Leu, AminoAcid::Met, AminoAcid::Asn,
        AminoAcid::Pro, AminoAcid::Gln, AminoAcid::Arg, AminoAcid::Ser,
        AminoAcid::Thr, AminoAcid::Val, AminoAcid::Trp, AminoAcid::Tyr,
    ];

    /// Canonical one-letter codes in alphabet order
    pub const CODES: &'static [u8; N_AMINO_ACIDS] = b"ACDEFGHIKLMNPQRSTVWY";

    /// Position in the canonical ordering
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn code(self) -> u8 {
        Self::CODES[self.index()]
    }

    #[rustfmt::skip]
    pub fn from_byte(b: u8) -> Option<Self> {
        use AminoAcid::*;
        match b {
            b'A' => Some(Ala), b'C' => Some(Cys), b'D' => Some(Asp), b'E' => Some(Glu),
            b'F' => Some(Phe), b'G' => Some(Gly), b'H' => Some(His), b'I' => Some(Ile),
            b'K' => Some(Lys), b'L' => Some(Leu), b'M' => Some(Met), b'N' => Some(Asn),
            b'P' => Some(Pro), b'Q' => Some(Gln), b'R' => Some(Arg), b'S' => Some(Ser),
            b'T' => Some(Thr), b'V' => Some(Val), b'W' => Some(Trp), b'Y' => Some(Tyr),
            _ => None,
        }
    }
}

/// How a single sequence byte relates to the alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResidueClass {
    Canonical(AminoAcid),
    /// `X`
    Unknown,
    /// `B`, `Z`, `J`, `U` (selenocysteine) or `O` (pyrrolysine)
    Ambiguous,
    /// Stop or gap; never valid in this dataset
    Forbidden,
    Invalid,
}

pub fn classify(b: u8) -> ResidueClass {
    if let Some(aa) = AminoAcid::from_byte(b) {
        return ResidueClass::Canonical(aa);
    }
    match b {
        UNKNOWN => ResidueClass::Unknown,
        b'B' | b'Z' | b'J' | b'U' | b'O' => ResidueClass::Ambiguous,
        STOP | GAP => ResidueClass::Forbidden,
        _ => ResidueClass::Invalid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_ordering_matches_codes() {
        for (i, aa) in AminoAcid::iter().enumerate() {
            assert_eq!(aa.index(), i);
            assert_eq!(AminoAcid::ALL[i], aa);
            assert_eq!(AminoAcid::from_byte(aa.code()), Some(aa));
        }
    }

    #[test]
    fn test_display_round_trip() {
        assert_eq!(AminoAcid::Lys.to_string(), "K");
        assert_eq!(AminoAcid::from_str("R").unwrap(), AminoAcid::Arg);
        assert!(AminoAcid::from_str("X").is_err());
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(b'M'), ResidueClass::Canonical(AminoAcid::Met));
        assert_eq!(classify(b'X'), ResidueClass::Unknown);
        assert_eq!(classify(b'U'), ResidueClass::Ambiguous);
        assert_eq!(classify(b'*'), ResidueClass::Forbidden);
        assert_eq!(classify(b'-'), ResidueClass::Forbidden);
        assert_eq!(classify(b'm'), ResidueClass::Invalid);
    }
}
