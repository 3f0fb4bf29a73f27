//! Label and residue encodings for downstream models.

pub mod labels;
pub mod sequence;

pub use labels::{encode_labels, ClassDictionary, LabelEncoding};
pub use sequence::{encode_sequences, EncodedSequences, ResidueVocabulary, SequenceEncoding};
