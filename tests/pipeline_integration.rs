/// End-to-end tests over a small data directory
mod common;

use common::{TestData, BLIND, CYTO, MITO};
use ndarray::Axis;
use pretty_assertions::assert_eq;
use protloc::bio::alphabet::AminoAcid::{Arg, Lys};
use protloc::encoding::{EncodedSequences, LabelEncoding};
use protloc::features::descriptors::{DescriptorProvider, Descriptors};
use protloc::features::{FeatureId, NormalizationMode, Scope};
use protloc::pipeline::{self, handcrafted_with};
use protloc::{ProtlocError, ProtlocResult};

fn column(columns: &[String], name: &str) -> usize {
    columns
        .iter()
        .position(|c| c == name)
        .unwrap_or_else(|| panic!("no column {}", name))
}

#[test]
fn test_load_data_orders_populations() {
    let data = TestData::new();
    let loaded = pipeline::load_data(&data.config()).unwrap();

    assert_eq!(loaded.train.len(), 4);
    assert_eq!(loaded.test.len(), 2);
    assert_eq!(loaded.max_len, 163);
    assert_eq!(
        loaded.train.labels(),
        vec![Some("cyto"), Some("cyto"), Some("mito"), Some("mito")]
    );
    assert_eq!(loaded.test.ids(), vec![">SEQ677", ">SEQ231"]);
}

#[test]
fn test_handcrafted_matrices() {
    let data = TestData::new();
    let result = pipeline::handcrafted(&data.config()).unwrap();

    assert_eq!(result.x_train.dim(), (4, 80));
    assert_eq!(result.x_test.dim(), (2, 80));
    assert_eq!(result.columns.len(), 80);
    assert_eq!(result.columns[0], "seq_len");
    assert_eq!(result.columns[1], "counts_global[A]");
    assert_eq!(result.test_ids, vec![">SEQ677", ">SEQ231"]);
    assert_eq!(result.class_dict.classes(), &["cyto", "mito"]);

    match &result.y_train {
        LabelEncoding::Indices(codes) => assert_eq!(codes.to_vec(), vec![0, 0, 1, 1]),
        other => panic!("Expected label indices, got {:?}", other),
    }
    assert!(result.x_train.iter().all(|v| v.is_finite()));
    assert!(result.x_test.iter().all(|v| v.is_finite()));
}

#[test]
fn test_normalized_columns_are_pooled() {
    let data = TestData::new();
    let result = pipeline::handcrafted(&data.config()).unwrap();

    let mut pooled = result.x_train.clone();
    pooled.append(Axis(0), result.x_test.view()).unwrap();

    for name in ["seq_len", "molecular_weight", "iso_point", "pair_K_R"] {
        let values = pooled.column(column(&result.columns, name));
        let mean = values.sum() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
        assert!(mean.abs() < 1e-9, "{} has mean {}", name, mean);
        assert!((var - 1.0).abs() < 1e-9, "{} has variance {}", name, var);
    }
}

#[test]
fn test_composition_rows_sum_to_one() {
    let data = TestData::new();
    let result = pipeline::handcrafted(&data.config()).unwrap();
    let start = column(&result.columns, "counts_global[A]");

    for row in result.x_train.rows() {
        let total: f64 = row.slice(ndarray::s![start..start + 20]).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
    // One of 81 residues in SEQ231 is X
    let blind = result.x_test.row(1);
    let total: f64 = blind.slice(ndarray::s![start..start + 20]).sum();
    assert!((total - 80.0 / 81.0).abs() < 1e-9);
}

#[test]
fn test_one_hot_labels() {
    let data = TestData::new();
    let mut config = data.config();
    config.encoding.one_hot_labels = true;

    let result = pipeline::handcrafted(&config).unwrap();
    match result.y_train {
        LabelEncoding::OneHot(matrix) => {
            assert_eq!(matrix.dim(), (4, 2));
            assert_eq!(matrix.row(0).to_vec(), vec![1.0, 0.0]);
            assert_eq!(matrix.row(3).to_vec(), vec![0.0, 1.0]);
        }
        other => panic!("Expected one-hot labels, got {:?}", other),
    }
}

#[test]
fn test_raw_tables_keep_counts() {
    let data = TestData::new();
    let raw = pipeline::handcrafted_raw(&data.config()).unwrap();

    let table = &raw.train.features;
    assert_eq!(
        table.scalars(FeatureId::SequenceLength).unwrap().to_vec(),
        vec![43.0, 67.0, 163.0, 4.0]
    );

    // Global counts fold both orders, windowed counts keep them apart
    let kr = table.scalars(FeatureId::Pair(Scope::Global, Lys, Arg)).unwrap();
    let rk = table.scalars(FeatureId::Pair(Scope::Global, Arg, Lys)).unwrap();
    assert_eq!(kr[1], 3.0);
    assert_eq!(rk[1], 3.0);
    let kr_first = table.scalars(FeatureId::Pair(Scope::LocalFirst, Lys, Arg)).unwrap();
    let rk_first = table.scalars(FeatureId::Pair(Scope::LocalFirst, Arg, Lys)).unwrap();
    assert_eq!(kr_first[1], 1.0);
    assert_eq!(rk_first[1], 2.0);

    assert!(table.contains(FeatureId::SecondaryStructureComponent(Scope::LocalLast, 2)));
    assert_eq!(raw.test.features.len(), table.len());
}

#[test]
fn test_disabled_dipeptide_window() {
    let data = TestData::new();
    let mut config = data.config();
    config.features.dipeptide_window = 0;

    let raw = pipeline::handcrafted_raw(&config).unwrap();
    let table = &raw.train.features;
    assert!(table.contains(FeatureId::Pair(Scope::Global, Lys, Lys)));
    assert!(!table.contains(FeatureId::Pair(Scope::LocalFirst, Lys, Lys)));
    assert!(!table.contains(FeatureId::Pair(Scope::LocalLast, Lys, Lys)));

    // The default normalization list names local pairs; they are skipped
    let result = pipeline::handcrafted(&config).unwrap();
    assert_eq!(result.x_train.ncols(), 80);
}

#[test]
fn test_unknown_assembly_feature_is_rejected() {
    let data = TestData::new();
    let mut config = data.config();
    config.assembly.features.push("pair_K_B".to_string());

    let err = pipeline::handcrafted(&config).unwrap_err();
    assert!(matches!(err, ProtlocError::Configuration(_)), "got {:?}", err);
}

#[test]
fn test_normalizing_absent_feature_is_rejected() {
    let data = TestData::new();
    let mut config = data.config();
    config
        .normalization
        .features
        .insert("secondary_structure_fraction_0".to_string(), NormalizationMode::MinMax);

    let err = pipeline::handcrafted(&config).unwrap_err();
    assert!(matches!(err, ProtlocError::Configuration(_)), "got {:?}", err);
}

#[test]
fn test_stop_symbol_in_blind_set() {
    let data = TestData::with_files(&[
        ("cyto", CYTO),
        ("mito", MITO),
        ("blind", ">bad\nMKV*LA\n"),
    ]);

    let err = pipeline::handcrafted(&data.config()).unwrap_err();
    match err {
        ProtlocError::AlphabetViolation {
            symbol,
            position,
            context,
        } => {
            assert_eq!(symbol, '*');
            assert_eq!(position, 3);
            assert!(context.contains(">bad"), "{}", context);
        }
        other => panic!("Expected alphabet violation, got {:?}", other),
    }
}

#[test]
fn test_missing_class_file() {
    let data = TestData::with_files(&[("cyto", CYTO), ("blind", BLIND)]);
    let err = pipeline::handcrafted(&data.config()).unwrap_err();
    assert!(matches!(err, ProtlocError::Io(_)), "got {:?}", err);
}

#[test]
fn test_duplicate_class_fails_before_reading() {
    let data = TestData::with_files(&[]);
    let mut config = data.config();
    config.data.classes = vec!["cyto".to_string(), "cyto".to_string()];

    let err = pipeline::handcrafted(&config).unwrap_err();
    assert!(matches!(err, ProtlocError::Configuration(_)), "got {:?}", err);
}

#[test]
fn test_empty_blind_set() {
    let data = TestData::with_files(&[("cyto", CYTO), ("mito", MITO), ("blind", "")]);
    let result = pipeline::handcrafted(&data.config()).unwrap();

    assert_eq!(result.x_test.dim(), (0, 80));
    assert_eq!(result.x_train.nrows(), 4);
    let seq_len = result.x_train.column(0);
    assert!((seq_len.sum() / 4.0).abs() < 1e-9);
}

/// Every sequence gets the same descriptor values
struct ConstantProvider;

impl DescriptorProvider for ConstantProvider {
    fn compute(&self, _seq: &[u8]) -> ProtlocResult<Descriptors> {
        Ok(Descriptors {
            molecular_weight: 1000.0,
            isoelectric_point: 7.0,
            ..Default::default()
        })
    }
}

#[test]
fn test_constant_descriptor_columns_are_centered() {
    let data = TestData::new();
    let result = handcrafted_with(&data.config(), &ConstantProvider).unwrap();

    for name in ["molecular_weight", "iso_point", "molecular_weight_localfirst"] {
        let i = column(&result.columns, name);
        assert!(result.x_train.column(i).iter().all(|&v| v == 0.0), "{}", name);
        assert!(result.x_test.column(i).iter().all(|&v| v == 0.0), "{}", name);
    }
}

#[test]
fn test_sequence_encoding_with_padding() {
    let data = TestData::new();
    let mut config = data.config();
    config.encoding.one_hot_sequences = false;

    let result = pipeline::sequences(&config).unwrap();
    assert_eq!(result.max_len, 163);
    assert_eq!(result.vocabulary.len(), 21);
    assert_eq!(result.x_train.lengths(), vec![100; 4]);

    let train = result.x_train.into_index_array().unwrap();
    assert_eq!(train.dim(), (4, 100));
    let m = result.vocabulary.get(b'M').unwrap();
    assert_eq!(train[[0, 0]], m);
    // mito2 is MKWV followed by padding
    assert!(train.row(3).iter().skip(4).all(|&i| i == config.encoding.pad_code));

    let test = result.x_test.into_index_array().unwrap();
    assert_eq!(test[[1, 0]], result.vocabulary.get(b'X').unwrap());
}

#[test]
fn test_one_hot_sequences() {
    let data = TestData::new();
    let result = pipeline::sequences(&data.config()).unwrap();
    let width = result.vocabulary.len();

    let test = match &result.x_test {
        EncodedSequences::OneHot(matrices) => matrices,
        other => panic!("Expected one-hot sequences, got {:?}", other),
    };
    assert_eq!(test.len(), 2);
    assert_eq!(test[0].dim(), (100, width));
    // SEQ677 has 34 residues; later rows are padding
    assert_eq!(test[0].sum(), 34.0);

    let tensor = result.x_train.into_one_hot_array(width).unwrap();
    assert_eq!(tensor.dim(), (4, 100, width));
}

#[test]
fn test_unpadded_sequences_keep_lengths() {
    let data = TestData::new();
    let mut config = data.config();
    config.encoding.pad_length = 0;
    config.encoding.one_hot_sequences = false;

    let result = pipeline::sequences(&config).unwrap();
    assert_eq!(result.x_train.lengths(), vec![43, 67, 163, 4]);
    assert_eq!(result.x_test.lengths(), vec![34, 81]);
    assert!(result.x_train.into_index_array().is_err());
}
