//! Residue index and one-hot encodings with optional fixed-length padding.

use crate::bio::alphabet::{AminoAcid, UNKNOWN};
use crate::bio::sequence::SequenceRecord;
use crate::error::{ProtlocError, ProtlocResult};
use ndarray::{Array2, Array3};
use rayon::prelude::*;

/// Ordered symbols and their dense indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueVocabulary {
    symbols: Vec<u8>,
    lookup: [Option<u8>; 256],
}

impl Default for ResidueVocabulary {
    /// The canonical residues followed by `X`
    fn default() -> Self {
        let mut symbols = AminoAcid::CODES.to_vec();
        symbols.push(UNKNOWN);
        let mut lookup = [None; 256];
        for (i, &b) in symbols.iter().enumerate() {
            lookup[b as usize] = Some(i as u8);
        }
        Self { symbols, lookup }
    }
}

impl ResidueVocabulary {
    pub fn from_symbols(symbols: &[u8]) -> ProtlocResult<Self> {
        if symbols.is_empty() || symbols.len() > u8::MAX as usize {
            return Err(ProtlocError::Configuration(format!(
                "A residue vocabulary needs 1 to 255 symbols, got {}",
                symbols.len()
            )));
        }
        let mut lookup = [None; 256];
        for (i, &b) in symbols.iter().enumerate() {
            if lookup[b as usize].replace(i as u8).is_some() {
                return Err(ProtlocError::Configuration(format!(
                    "Duplicate vocabulary symbol '{}'",
                    b as char
                )));
            }
        }
        Ok(Self {
            symbols: symbols.to_vec(),
            lookup,
        })
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn get(&self, symbol: u8) -> Option<usize> {
        self.lookup[symbol as usize].map(usize::from)
    }

    /// Index of the residue at `position`
    pub fn index(&self, symbol: u8, position: usize) -> ProtlocResult<usize> {
        self.get(symbol)
            .ok_or_else(|| ProtlocError::alphabet(symbol, position, "sequence encoding"))
    }

    pub fn encode(&self, seq: &[u8]) -> ProtlocResult<Vec<usize>> {
        seq.iter()
            .enumerate()
            .map(|(position, &b)| self.index(b, position))
            .collect()
    }

    pub fn decode(&self, indices: &[usize]) -> ProtlocResult<String> {
        indices
            .iter()
            .map(|&i| {
                self.symbols.get(i).map(|&b| b as char).ok_or_else(|| {
                    ProtlocError::InvariantViolation(format!(
                        "index {} is outside a vocabulary of {} symbols",
                        i,
                        self.len()
                    ))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceEncoding {
    pub one_hot: bool,
    /// Truncate or right-pad every sequence to this length
    pub pad: Option<usize>,
    /// Fill value for padded positions in index form
    pub pad_code: usize,
}

impl Default for SequenceEncoding {
    fn default() -> Self {
        Self {
            one_hot: true,
            pad: Some(2000),
            pad_code: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EncodedSequences {
    Indices(Vec<Vec<usize>>),
    /// One `length x vocabulary` matrix per record; padded rows are all zero
    OneHot(Vec<Array2<f64>>),
}

impl EncodedSequences {
    pub fn len(&self) -> usize {
        match self {
            EncodedSequences::Indices(seqs) => seqs.len(),
            EncodedSequences::OneHot(seqs) => seqs.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-record lengths
    pub fn lengths(&self) -> Vec<usize> {
        match self {
            EncodedSequences::Indices(seqs) => seqs.iter().map(Vec::len).collect(),
            EncodedSequences::OneHot(seqs) => seqs.iter().map(|m| m.nrows()).collect(),
        }
    }

    fn common_length(&self) -> ProtlocResult<usize> {
        let lengths = self.lengths();
        match lengths.split_first() {
            None => Ok(0),
            Some((&first, rest)) if rest.iter().all(|&l| l == first) => Ok(first),
            Some(_) => Err(ProtlocError::InvariantViolation(
                "encoded sequences differ in length; set a pad length to stack them".to_string(),
            )),
        }
    }

    /// Stack index encodings into `records x length`
    pub fn into_index_array(self) -> ProtlocResult<Array2<usize>> {
        let length = self.common_length()?;
        match self {
            EncodedSequences::Indices(seqs) => {
                let rows = seqs.len();
                let flat: Vec<usize> = seqs.into_iter().flatten().collect();
                Array2::from_shape_vec((rows, length), flat)
                    .map_err(|e| ProtlocError::InvariantViolation(e.to_string()))
            }
            EncodedSequences::OneHot(_) => Err(ProtlocError::Configuration(
                "sequences were one-hot encoded".to_string(),
            )),
        }
    }

    /// Stack one-hot encodings into `records x length x vocabulary`
    pub fn into_one_hot_array(self, vocabulary: usize) -> ProtlocResult<Array3<f64>> {
        let length = self.common_length()?;
        match self {
            EncodedSequences::OneHot(seqs) => {
                let mut tensor = Array3::zeros((seqs.len(), length, vocabulary));
                for (mut slot, matrix) in tensor.outer_iter_mut().zip(&seqs) {
                    if matrix.ncols() != vocabulary {
                        return Err(ProtlocError::InvariantViolation(format!(
                            "one-hot width {} does not match vocabulary size {}",
                            matrix.ncols(),
                            vocabulary
                        )));
                    }
                    slot.assign(matrix);
                }
                Ok(tensor)
            }
            EncodedSequences::Indices(_) => Err(ProtlocError::Configuration(
                "sequences were index encoded".to_string(),
            )),
        }
    }
}

fn encode_one(
    seq: &[u8],
    vocab: &ResidueVocabulary,
    encoding: &SequenceEncoding,
) -> ProtlocResult<Vec<usize>> {
    let kept = match encoding.pad {
        Some(pad) => &seq[..seq.len().min(pad)],
        None => seq,
    };
    vocab.encode(kept)
}

fn one_hot(indices: &[usize], length: usize, width: usize) -> Array2<f64> {
    let mut matrix = Array2::zeros((length, width));
    for (row, &i) in indices.iter().enumerate() {
        matrix[[row, i]] = 1.0;
    }
    matrix
}

/// Encode every record with a shared vocabulary.
///
/// Order follows `records`.
pub fn encode_sequences(
    records: &[SequenceRecord],
    vocab: &ResidueVocabulary,
    encoding: &SequenceEncoding,
) -> ProtlocResult<EncodedSequences> {
    let encoded = records
        .par_iter()
        .map(|r| encode_one(r.residues(), vocab, encoding).map_err(|e| e.in_record(&r.id)))
        .collect::<ProtlocResult<Vec<_>>>()?;

    if encoding.one_hot {
        let matrices = encoded
            .par_iter()
            .map(|indices| one_hot(indices, encoding.pad.unwrap_or(indices.len()), vocab.len()))
            .collect();
        return Ok(EncodedSequences::OneHot(matrices));
    }

    let padded = match encoding.pad {
        Some(pad) => encoded
            .into_iter()
            .map(|mut indices| {
                indices.resize(pad, encoding.pad_code);
                indices
            })
            .collect(),
        None => encoded,
    };
    Ok(EncodedSequences::Indices(padded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(seq: &str) -> SequenceRecord {
        SequenceRecord::new(">r", seq)
    }

    fn index_form(pad: Option<usize>) -> SequenceEncoding {
        SequenceEncoding {
            one_hot: false,
            pad,
            pad_code: 0,
        }
    }

    #[test]
    fn test_default_vocabulary() {
        let vocab = ResidueVocabulary::default();
        assert_eq!(vocab.len(), 21);
        assert_eq!(vocab.get(b'A'), Some(0));
        assert_eq!(vocab.get(b'Y'), Some(19));
        assert_eq!(vocab.get(b'X'), Some(20));
        assert_eq!(vocab.get(b'B'), None);
    }

    #[test]
    fn test_index_round_trip() {
        let vocab = ResidueVocabulary::default();
        let seq = "MKVXLAWY";
        let indices = vocab.encode(seq.as_bytes()).unwrap();
        assert_eq!(vocab.decode(&indices).unwrap(), seq);
    }

    #[test]
    fn test_pad_short_sequence() {
        let vocab = ResidueVocabulary::default();
        let encoded = encode_sequences(&[record("MK")], &vocab, &index_form(Some(5))).unwrap();
        let m = vocab.get(b'M').unwrap();
        let k = vocab.get(b'K').unwrap();
        assert_eq!(encoded, EncodedSequences::Indices(vec![vec![m, k, 0, 0, 0]]));
    }

    #[test]
    fn test_truncate_to_pad_length() {
        let vocab = ResidueVocabulary::default();
        let encoded = encode_sequences(
            &[record("MKVVLAW"), record("M")],
            &vocab,
            &index_form(Some(3)),
        )
        .unwrap();
        assert_eq!(encoded.lengths(), vec![3, 3]);
        let array = encoded.into_index_array().unwrap();
        assert_eq!(array.dim(), (2, 3));
        assert_eq!(vocab.decode(&array.row(0).to_vec()).unwrap(), "MKV");
    }

    #[test]
    fn test_unpadded_lengths_are_kept() {
        let vocab = ResidueVocabulary::default();
        let encoded =
            encode_sequences(&[record("MKV"), record("M")], &vocab, &index_form(None)).unwrap();
        assert_eq!(encoded.lengths(), vec![3, 1]);
        assert!(matches!(
            encoded.into_index_array(),
            Err(ProtlocError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_one_hot_rows() {
        let vocab = ResidueVocabulary::default();
        let encoding = SequenceEncoding {
            one_hot: true,
            pad: Some(4),
            pad_code: 0,
        };
        let encoded = encode_sequences(&[record("MK")], &vocab, &encoding).unwrap();
        let tensor = encoded.into_one_hot_array(vocab.len()).unwrap();
        assert_eq!(tensor.dim(), (1, 4, 21));

        let sums: Vec<f64> = tensor
            .index_axis(ndarray::Axis(0), 0)
            .rows()
            .into_iter()
            .map(|r| r.sum())
            .collect();
        assert_eq!(sums, vec![1.0, 1.0, 0.0, 0.0]);
        assert_eq!(tensor[[0, 0, vocab.get(b'M').unwrap()]], 1.0);
    }

    #[test]
    fn test_out_of_vocabulary_symbol() {
        let vocab = ResidueVocabulary::from_symbols(b"MK").unwrap();
        match encode_sequences(&[record("MKV")], &vocab, &index_form(None)) {
            Err(ProtlocError::AlphabetViolation {
                symbol, position, ..
            }) => {
                assert_eq!(symbol, 'V');
                assert_eq!(position, 2);
            }
            other => panic!("Expected AlphabetViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_custom_vocabulary_rejects_duplicates() {
        assert!(ResidueVocabulary::from_symbols(b"MKM").is_err());
        assert!(ResidueVocabulary::from_symbols(b"").is_err());
    }
}
