//! Gather feature columns into a row-major matrix.

use crate::bio::alphabet::AminoAcid;
use crate::error::{ProtlocError, ProtlocResult};
use crate::features::{FeatureId, FeatureTable, Scope};
use ndarray::{s, Array2};

/// Column layout of the handcrafted matrix
pub fn default_features() -> Vec<FeatureId> {
    use AminoAcid::{Arg, Lys};

    let mut features = vec![FeatureId::SequenceLength];
    features.extend(Scope::ALL.map(FeatureId::Composition));
    features.extend([
        FeatureId::MolecularWeight(Scope::Global),
        FeatureId::IsoelectricPoint(Scope::Global),
        FeatureId::Aromaticity(Scope::Global),
        FeatureId::InstabilityIndex(Scope::Global),
        FeatureId::SecondaryStructure(Scope::Global),
        FeatureId::Flexibility(Scope::Global),
        FeatureId::MolecularWeight(Scope::LocalFirst),
        FeatureId::MolecularWeight(Scope::LocalLast),
    ]);
    features.extend(Scope::ALL.map(FeatureId::Hydrophobicity));
    features.extend(Scope::ALL.map(FeatureId::Hydrophilicity));
    features.extend([
        FeatureId::Pair(Scope::Global, Lys, Arg),
        FeatureId::Pair(Scope::Global, Arg, Arg),
        FeatureId::Pair(Scope::Global, Lys, Lys),
    ]);
    features
}

/// Total number of matrix columns for `features`
pub fn total_width(features: &[FeatureId]) -> usize {
    features.iter().map(|f| f.width()).sum()
}

/// One label per matrix column, e.g. `counts_global[A]` or `secondary_structure_fraction[1]`
pub fn column_names(features: &[FeatureId]) -> Vec<String> {
    let mut names = Vec::with_capacity(total_width(features));
    for &feature in features {
        match feature {
            FeatureId::Composition(_) => {
                names.extend(AminoAcid::ALL.iter().map(|aa| format!("{}[{}]", feature, aa)))
            }
            _ if feature.width() > 1 => {
                names.extend((0..feature.width()).map(|i| format!("{}[{}]", feature, i)))
            }
            _ => names.push(feature.to_string()),
        }
    }
    names
}

/// Build a `rows x total_width` matrix in the order of `features`.
///
/// Reads the table only.
pub fn assemble(
    table: &FeatureTable,
    rows: usize,
    features: &[FeatureId],
) -> ProtlocResult<Array2<f64>> {
    let mut matrix = Array2::zeros((rows, total_width(features)));
    let mut offset = 0;
    for &feature in features {
        let column = table.get(feature).ok_or_else(|| {
            ProtlocError::Configuration(format!("Feature {} was never computed", feature))
        })?;
        let width = feature.width();
        if column.ncols() != width || column.nrows() != rows {
            return Err(ProtlocError::InvariantViolation(format!(
                "feature {} is {}x{}, expected {}x{}",
                feature,
                column.nrows(),
                column.ncols(),
                rows,
                width
            )));
        }
        matrix
            .slice_mut(s![.., offset..offset + width])
            .assign(column);
        offset += width;
    }
    Ok(matrix)
}
