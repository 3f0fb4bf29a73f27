pub mod alphabet;
pub mod fasta;
pub mod sequence;

pub use alphabet::AminoAcid;
pub use sequence::{Dataset, SequenceRecord};
